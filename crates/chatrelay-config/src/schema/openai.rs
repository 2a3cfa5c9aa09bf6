use serde::{Deserialize, Serialize};

/// Chat-completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_base: String,
    /// Identifier of the model the session starts on.
    pub default_model: String,
    /// `max_tokens` sent with every completion request.
    pub max_output_tokens: u32,
    /// Whole-request timeout in seconds; expiry is a retryable error.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".into(),
            default_model: "gpt-4o".into(),
            max_output_tokens: 2000,
            timeout_secs: 120,
        }
    }
}
