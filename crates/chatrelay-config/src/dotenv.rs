//! `.env` file support (KEY=VALUE lines).

use std::path::{Path, PathBuf};

use tracing::debug;

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped; surrounding quotes on values
/// are stripped.
pub fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim().trim_start_matches("export ").trim();
            if key.is_empty() {
                return None;
            }
            let value = value.trim().trim_matches('"').trim_matches('\'');
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Load the first readable `.env` among `candidates` into the process
/// environment. Variables that are already set win over the file.
///
/// Returns the path that was loaded, if any.
pub fn load_dotenv(candidates: &[PathBuf]) -> Option<PathBuf> {
    for path in candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var(&key).is_err() {
                    std::env::set_var(&key, value);
                }
            }
            debug!(path = %path.display(), "loaded .env");
            return Some(path.clone());
        }
    }
    None
}

/// `.env` next to the config file, then the current directory.
pub fn default_candidates(config_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = config_path.and_then(Path::parent) {
        candidates.push(dir.join(".env"));
    }
    candidates.push(PathBuf::from(".env"));
    candidates
}
