use serde::{Deserialize, Serialize};

/// Discord connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// The only channel the bot answers in. `CHANNEL_ID_GPT` overrides it.
    pub channel_id: String,
    /// REST API base URL.
    pub api_base: String,
    /// Gateway WebSocket URL (JSON encoding).
    pub gateway_url: String,
    /// Register the slash commands globally once the gateway is ready.
    pub register_commands: bool,
    /// Initial reconnect delay in seconds, doubled after each failure.
    pub reconnect_delay_secs: u64,
    pub max_reconnect_delay_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            api_base: "https://discord.com/api/v10".into(),
            gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".into(),
            register_commands: true,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 60,
        }
    }
}
