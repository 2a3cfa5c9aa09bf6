//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use chatrelay_config::schema::LoggingConfig;
use tracing_subscriber::EnvFilter;

const CRATES: [&str; 4] = ["chatrelay", "chatrelay_ai", "chatrelay_config", "chatrelay_common"];

/// Filter directive for `level` on this workspace's crates; others stay at `warn`.
pub fn default_directive(level: &str) -> String {
    let mut directive = String::from("warn");
    for krate in CRATES {
        directive.push_str(&format!(",{krate}={level}"));
    }
    directive
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `override_level`, which wins over the config level.
/// A non-empty `config.file` appends to that file instead of stderr.
pub fn init(config: &LoggingConfig, override_level: Option<&str>) -> std::io::Result<()> {
    let level = override_level.unwrap_or_else(|| config.level.as_directive());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    if config.file.trim().is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.file.trim())?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}
