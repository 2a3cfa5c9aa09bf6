//! Default system-role text loaded from an external file.

use std::path::Path;

use tracing::{info, warn};

/// Read the system-role prompt from `path`.
///
/// A missing or unreadable file is not an error: the bot runs with an
/// empty role.
pub fn read_system_role(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            info!(path = %path.display(), chars = content.chars().count(), "loaded system role");
            content
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "system role file unavailable, using empty role");
            String::new()
        }
    }
}
