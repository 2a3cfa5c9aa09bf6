//! Per-model token pricing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// USD price per 1000 tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            input_per_1k: 0.01,
            output_per_1k: 0.03,
        }
    }
}

impl RateConfig {
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }
}

/// Pricing table keyed by model identifier.
///
/// A `[pricing.models]` table in the config file replaces the built-in
/// entries wholesale; `fallback` applies to any model without an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub fallback: RateConfig,
    pub models: BTreeMap<String, RateConfig>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut models = BTreeMap::new();
        models.insert("gpt-4-turbo".to_string(), RateConfig::new(0.01, 0.03));
        models.insert(
            "gpt-4-vision-preview".to_string(),
            RateConfig::new(0.01, 0.03),
        );
        models.insert("gpt-4o".to_string(), RateConfig::new(0.005, 0.015));
        Self {
            fallback: RateConfig::default(),
            models,
        }
    }
}
