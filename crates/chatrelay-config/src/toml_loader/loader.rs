//! Reading and parsing the TOML config file.

use std::io::ErrorKind;
use std::path::Path;

use chatrelay_common::ConfigError;
use tracing::{info, warn};

use crate::schema::ChatRelayConfig;
use crate::validation;

use super::paths::{create_default_config, default_config_path};
use super::template::default_config_toml;

/// Parse config TOML. Absent sections and keys take their defaults.
pub fn parse_config(content: &str) -> Result<ChatRelayConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load config from `path`.
///
/// Invalid values only produce a warning here; [`crate::load_config`]
/// is the entry point that rejects them.
pub fn load_from_path(path: &Path) -> Result<ChatRelayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let config = parse_config(&content)?;
    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "Config has invalid values");
    }

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Load config from `path`, writing the starter template there first if
/// nothing exists yet.
pub fn load_or_create(path: &Path) -> Result<ChatRelayConfig, ConfigError> {
    match load_from_path(path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(path)?;
            parse_config(&default_config_toml())
        }
        other => other,
    }
}

/// [`load_or_create`] at [`default_config_path`].
pub fn load_default() -> Result<ChatRelayConfig, ConfigError> {
    load_or_create(&default_config_path()?)
}
