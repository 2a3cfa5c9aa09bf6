//! Where the config file lives, and writing the starter file there.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chatrelay_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// Environment variable that points at the config file.
pub const CONFIG_PATH_VAR: &str = "CHATRELAY_CONFIG";

const APP_DIR: &str = "chatrelay";
const FILE_NAME: &str = "config.toml";

/// `$CHATRELAY_CONFIG` when set, else `<config dir>/chatrelay/config.toml`.
///
/// The config dir is `~/.config` on Linux and
/// `~/Library/Application Support` on macOS.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(
        std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from),
        dirs::config_dir(),
    )
}

fn resolve_config_path(
    explicit: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    config_dir
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or_else(|| {
            ConfigError::NoLocation(format!(
                "platform has no config directory; set {CONFIG_PATH_VAR} or pass --config"
            ))
        })
}

/// Write the commented template to `path`, creating parent directories.
///
/// An existing file is left untouched. Returns whether a file was written.
pub fn create_default_config(path: &Path) -> Result<bool, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(io_err(e)),
    };
    file.write_all(default_config_toml().as_bytes()).map_err(io_err)?;

    info!(path = %path.display(), "Wrote default config");
    Ok(true)
}
