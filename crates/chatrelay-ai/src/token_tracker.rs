//! Cumulative usage and spend across the lifetime of the bot.

use std::collections::HashMap;

use crate::model::ModelVariant;
use crate::TokenUsage;

/// Tracks token usage and estimated spend per model.
///
/// Unlike the session's running token total this is never cleared by a
/// history reset; it exists for logging.
#[derive(Debug, Default)]
pub struct TokenTracker {
    total: TokenUsage,
    by_model: HashMap<ModelVariant, TokenUsage>,
    spend_usd: f64,
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful completion.
    pub fn record(&mut self, model: ModelVariant, usage: &TokenUsage, cost_usd: f64) {
        add_usage(&mut self.total, usage);
        add_usage(self.by_model.entry(model).or_default(), usage);
        self.spend_usd += cost_usd;
        self.call_count += 1;
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn for_model(&self, model: ModelVariant) -> Option<&TokenUsage> {
        self.by_model.get(&model)
    }

    pub fn spend_usd(&self) -> f64 {
        self.spend_usd
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}

fn add_usage(into: &mut TokenUsage, usage: &TokenUsage) {
    into.input_tokens += usage.input_tokens;
    into.output_tokens += usage.output_tokens;
    into.total_tokens += usage.total_tokens;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_totals_and_per_model() {
        let mut tracker = TokenTracker::new();
        tracker.record(ModelVariant::Gpt4Omni, &TokenUsage::new(100, 50), 0.00125);
        tracker.record(ModelVariant::Gpt4Turbo, &TokenUsage::new(10, 5), 0.00025);
        tracker.record(ModelVariant::Gpt4Omni, &TokenUsage::new(1, 1), 0.0);

        assert_eq!(tracker.call_count(), 3);
        assert_eq!(tracker.total().total_tokens, 167);
        assert_eq!(
            tracker.for_model(ModelVariant::Gpt4Omni).unwrap().input_tokens,
            101
        );
        assert!(tracker.for_model(ModelVariant::Gpt4VisionPreview).is_none());
        assert!((tracker.spend_usd() - 0.0015).abs() < 1e-12);
    }
}
