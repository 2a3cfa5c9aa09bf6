//! Credentials pulled from the process environment.

use std::fmt;

use chatrelay_common::ConfigError;

pub const DISCORD_TOKEN_VAR: &str = "DISCORD_BOT_TOKEN_GPT";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const CHANNEL_ID_VAR: &str = "CHANNEL_ID_GPT";

/// Bot token, API key and the optional channel override.
#[derive(Clone)]
pub struct Secrets {
    pub discord_token: String,
    pub openai_api_key: String,
    pub channel_id: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("discord_token", &"[REDACTED]")
            .field("openai_api_key", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve secrets through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token =
            get(DISCORD_TOKEN_VAR).ok_or_else(|| ConfigError::MissingSecret(DISCORD_TOKEN_VAR.into()))?;
        let openai_api_key =
            get(OPENAI_KEY_VAR).ok_or_else(|| ConfigError::MissingSecret(OPENAI_KEY_VAR.into()))?;

        Ok(Self {
            discord_token,
            openai_api_key,
            channel_id: get(CHANNEL_ID_VAR),
        })
    }
}
