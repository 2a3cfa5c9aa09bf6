//! Configuration schema types for chatrelay.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults the bot runs with.

mod discord;
mod openai;
mod pricing;
mod session;
mod system;

pub use discord::*;
pub use openai::*;
pub use pricing::*;
pub use session::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for chatrelay.
///
/// Secrets (bot token, API key) are never part of this file; see
/// [`crate::secrets::Secrets`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatRelayConfig {
    pub discord: DiscordConfig,
    pub openai: OpenAiConfig,
    pub session: SessionConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}
