use serde::{Deserialize, Serialize};

/// Chat session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Text file holding the default system role. Missing file = empty role.
    pub system_role_file: String,
    /// Running token total above which one old turn is evicted per exchange.
    pub token_budget: u64,
    /// Attempts made for retryable provider errors.
    pub max_retries: u32,
    /// Maximum characters per outbound message.
    pub chunk_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_role_file: "systemrole.txt".into(),
            token_budget: 4096 - 256,
            max_retries: 3,
            chunk_limit: 2000,
        }
    }
}
