//! Approximate USD cost of a completion.

use std::collections::HashMap;

use crate::model::ModelVariant;

/// Costs are reported with this many significant digits.
pub const SIGNIFICANT_DIGITS: i32 = 3;

/// USD per 1000 tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Rates {
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }
}

/// Rates keyed by model identifier, with a fallback for anything unlisted.
#[derive(Debug, Clone)]
pub struct PricingTable {
    rates: HashMap<String, Rates>,
    fallback: Rates,
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut table = Self::new(Rates::new(0.01, 0.03));
        table.insert(ModelVariant::Gpt4Turbo.identifier(), Rates::new(0.01, 0.03));
        table.insert(
            ModelVariant::Gpt4VisionPreview.identifier(),
            Rates::new(0.01, 0.03),
        );
        table.insert(ModelVariant::Gpt4Omni.identifier(), Rates::new(0.005, 0.015));
        table
    }
}

impl PricingTable {
    /// An empty table where every model uses `fallback`.
    pub fn new(fallback: Rates) -> Self {
        Self {
            rates: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, identifier: impl Into<String>, rates: Rates) {
        self.rates.insert(identifier.into(), rates);
    }

    pub fn rates_for(&self, identifier: &str) -> Rates {
        self.rates.get(identifier).copied().unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Rates {
        self.fallback
    }
}

#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    table: PricingTable,
}

impl CostEstimator {
    pub fn new(table: PricingTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    /// Cost in USD, rounded to [`SIGNIFICANT_DIGITS`] significant digits.
    ///
    /// Usage lines print this with `{}`, which never switches to exponent
    /// notation: a cost of 2e-5 reads `0.00002`.
    pub fn estimate(&self, input_tokens: u64, output_tokens: u64, variant: ModelVariant) -> f64 {
        let rates = self.table.rates_for(variant.identifier());
        let raw = input_tokens as f64 * rates.input_per_1k / 1000.0
            + output_tokens as f64 * rates.output_per_1k / 1000.0;
        round_to_significant(raw, SIGNIFICANT_DIGITS)
    }
}

/// Round `value` to `digits` significant digits. Zero stays zero.
pub fn round_to_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    round_to_places(value, -(magnitude + (1 - digits)))
}

/// Round half away from zero at `places` decimal places. Negative `places`
/// round to tens, hundreds, and so on.
fn round_to_places(value: f64, places: i32) -> f64 {
    if places >= 0 {
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-places);
        (value / factor).round() * factor
    }
}
