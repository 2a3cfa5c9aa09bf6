//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use chatrelay_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_chatrelay_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[discord]
channel_id = "123456789"

[session]
max_retries = 5
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.discord.channel_id, "123456789");
    assert_eq!(config.session.max_retries, 5);
    // Defaults preserved
    assert_eq!(config.session.chunk_limit, 2000);
    assert_eq!(config.session.token_budget, 3840);
    assert_eq!(config.openai.default_model, "gpt-4o");
    assert_eq!(config.pricing.models.len(), 3);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn load_config_with_invalid_values_keeps_parsed_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session]\nmax_retries = 99\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.session.max_retries, 99);
}

#[test]
fn pricing_models_table_replaces_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[pricing.models."my-model"]
input_per_1k = 0.5
output_per_1k = 1.5
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.pricing.models.len(), 1);
    let rate = config.pricing.models["my-model"];
    assert_eq!(rate.input_per_1k, 0.5);
    assert_eq!(rate.output_per_1k, 1.5);
    assert_eq!(config.pricing.fallback.input_per_1k, 0.01);
}

#[test]
fn log_level_parses_uppercase() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"WARNING\"\nfile = \"bot.log\"\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.logging.level, crate::schema::LogLevel::Warning);
    assert_eq!(config.logging.level.as_directive(), "warn");
    assert_eq!(config.logging.file, "bot.log");
}

#[test]
fn load_or_create_writes_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.openai.max_output_tokens, 2000);

    // The written template must itself parse back to the defaults.
    let reloaded = load_from_path(&path).unwrap();
    assert_eq!(reloaded.session.max_retries, 3);
    assert_eq!(reloaded.pricing.models.len(), 3);
}

#[test]
fn default_config_path_ends_with_chatrelay() {
    if std::env::var_os(CONFIG_PATH_VAR).is_some() {
        return;
    }
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("chatrelay/config.toml"));
    }
}

#[test]
fn unreadable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_from_path(dir.path());
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn parse_config_of_empty_text_is_default() {
    let config = parse_config("").unwrap();
    assert_eq!(config.session.chunk_limit, 2000);
    assert_eq!(config.openai.default_model, "gpt-4o");
}
