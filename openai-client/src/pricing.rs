//! Static per-model price table and cost computation.

use std::collections::HashMap;

/// Per-million-token rates for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

const FREE: ModelRate = ModelRate {
    input_per_million: 0.0,
    output_per_million: 0.0,
};

/// Model → rate mapping. Built once at startup and passed down; unknown models cost zero.
#[derive(Debug, Clone)]
pub struct PriceTable {
    rates: HashMap<String, ModelRate>,
}

impl PriceTable {
    /// The models this bot is allowed to run, with their current list prices.
    pub fn builtin() -> Self {
        let mut rates = HashMap::new();
        rates.insert(
            "o4-mini".to_string(),
            ModelRate {
                input_per_million: 1.10,
                output_per_million: 4.40,
            },
        );
        rates.insert(
            "gpt-4.1-mini".to_string(),
            ModelRate {
                input_per_million: 0.40,
                output_per_million: 1.60,
            },
        );
        rates.insert(
            "gpt-4.1-nano".to_string(),
            ModelRate {
                input_per_million: 0.10,
                output_per_million: 0.40,
            },
        );
        Self { rates }
    }

    pub fn rate(&self, model: &str) -> ModelRate {
        self.rates.get(model).copied().unwrap_or(FREE)
    }

    /// Cost of `tokens` input tokens for `model`: tokens / 1M × input rate.
    pub fn input_cost(&self, model: &str, tokens: u32) -> f64 {
        tokens as f64 / 1_000_000.0 * self.rate(model).input_per_million
    }

    /// Cost of `tokens` output tokens for `model`: tokens / 1M × output rate.
    pub fn output_cost(&self, model: &str, tokens: u32) -> f64 {
        tokens as f64 / 1_000_000.0 * self.rate(model).output_per_million
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1000 input tokens at 1.10/1M → 0.00110; 500 output tokens at 4.40/1M → 0.00220.
    #[test]
    fn test_cost_per_million_tokens() {
        let table = PriceTable::builtin();
        assert!((table.input_cost("o4-mini", 1000) - 0.00110).abs() < 1e-12);
        assert!((table.output_cost("o4-mini", 500) - 0.00220).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_model_costs_zero() {
        let table = PriceTable::builtin();
        assert_eq!(table.input_cost("mystery-model", 123_456), 0.0);
        assert_eq!(table.output_cost("mystery-model", 123_456), 0.0);
    }

    #[test]
    fn test_builtin_has_all_allowed_models() {
        let table = PriceTable::builtin();
        assert_eq!(table.rate("gpt-4.1-mini").input_per_million, 0.40);
        assert_eq!(table.rate("gpt-4.1-nano").output_per_million, 0.40);
    }
}
