//! Full configuration validation.
//!
//! Each check pushes a message into a shared list; all problems are
//! reported together in a single `ConfigError`.

mod helpers;


use crate::schema::ChatRelayConfig;
use chatrelay_common::ConfigError;

use helpers::{validate_non_empty, validate_range, validate_range_u64, validate_rate};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ChatRelayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_discord(&mut errors, config);
    validate_openai(&mut errors, config);
    validate_session(&mut errors, config);
    validate_pricing(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_discord(errors: &mut Vec<String>, config: &ChatRelayConfig) {
    let d = &config.discord;
    validate_non_empty(errors, "discord.api_base", &d.api_base);
    if !(d.gateway_url.starts_with("wss://") || d.gateway_url.starts_with("ws://")) {
        errors.push(format!(
            "discord.gateway_url = {:?} must be a ws:// or wss:// URL",
            d.gateway_url
        ));
    }
    validate_range_u64(
        errors,
        "discord.reconnect_delay_secs",
        d.reconnect_delay_secs,
        1,
        300,
    );
    if d.max_reconnect_delay_secs < d.reconnect_delay_secs {
        errors.push(format!(
            "discord.max_reconnect_delay_secs = {} is below reconnect_delay_secs = {}",
            d.max_reconnect_delay_secs, d.reconnect_delay_secs
        ));
    }
}

fn validate_openai(errors: &mut Vec<String>, config: &ChatRelayConfig) {
    let o = &config.openai;
    validate_non_empty(errors, "openai.api_base", &o.api_base);
    validate_non_empty(errors, "openai.default_model", &o.default_model);
    validate_range(
        errors,
        "openai.max_output_tokens",
        o.max_output_tokens,
        1,
        128_000,
    );
    validate_range_u64(errors, "openai.timeout_secs", o.timeout_secs, 1, 600);
}

fn validate_session(errors: &mut Vec<String>, config: &ChatRelayConfig) {
    let s = &config.session;
    validate_range(errors, "session.max_retries", s.max_retries, 1, 10);
    validate_range_u64(
        errors,
        "session.chunk_limit",
        s.chunk_limit as u64,
        100,
        2000,
    );
    if s.token_budget == 0 {
        errors.push("session.token_budget must be at least 1".into());
    }
}

fn validate_pricing(errors: &mut Vec<String>, config: &ChatRelayConfig) {
    validate_rate(errors, "pricing.fallback", &config.pricing.fallback);
    for (model, rate) in &config.pricing.models {
        validate_rate(errors, &format!("pricing.models.{model}"), rate);
    }
}
