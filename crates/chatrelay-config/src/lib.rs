//! chatrelay configuration system.
//!
//! TOML configuration with serde defaults for every section, validation
//! that reports all problems at once, environment secrets, `.env` loading
//! and the external system-role file.
//!
//! ```rust,no_run
//! use chatrelay_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config.openai.default_model);
//! ```

pub mod dotenv;
pub mod schema;
pub mod secrets;
pub mod system_role;
pub mod toml_loader;
pub mod validation;

pub use schema::{ChatRelayConfig, CONFIG_SCHEMA_VERSION};
pub use secrets::Secrets;
pub use system_role::read_system_role;

use std::path::Path;

use chatrelay_common::ConfigError;

/// Load config from `path`, or from the platform default location.
///
/// The file is created from the commented template when missing. Unlike
/// the loader functions, this fails on validation errors.
pub fn load_config(path: Option<&Path>) -> Result<ChatRelayConfig, ConfigError> {
    let config = match path {
        Some(p) => toml_loader::load_or_create(p)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ChatRelayConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
