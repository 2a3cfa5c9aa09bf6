//! OpenAI client struct, request building, and response parsing.

use std::time::Duration;

use crate::model::ModelVariant;
use crate::{Completion, ProviderError, TokenUsage, Turn, TurnContent};

use super::config::OpenAiClientConfig;

pub struct OpenAiClient {
    pub(crate) config: OpenAiClientConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// Build the JSON request body for the chat-completions endpoint.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Turn],
        model: ModelVariant,
        max_output_tokens: u32,
    ) -> serde_json::Value {
        let msgs: Vec<serde_json::Value> = messages
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "content": content_json(&turn.content),
                })
            })
            .collect();

        serde_json::json!({
            "model": model.identifier(),
            "messages": msgs,
            "max_tokens": max_output_tokens,
        })
    }

    /// Parse a non-streaming response.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<Completion, ProviderError> {
        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ProviderError::Parse("response has no message content".into()))?
            .to_string();

        let usage = &json["usage"];
        let input_tokens = usage["prompt_tokens"].as_u64().unwrap_or(0);
        let output_tokens = usage["completion_tokens"].as_u64().unwrap_or(0);
        let mut usage = TokenUsage::new(input_tokens, output_tokens);
        if let Some(total) = json["usage"]["total_tokens"].as_u64() {
            usage.total_tokens = total;
        }

        Ok(Completion { text, usage })
    }
}

fn content_json(content: &TurnContent) -> serde_json::Value {
    match content {
        TurnContent::Text(text) => serde_json::json!(text),
        TurnContent::TextWithImage { text, image } => serde_json::json!([
            { "type": "text", "text": text },
            { "type": "image_url", "image_url": { "url": image.data_url() } },
        ]),
    }
}
