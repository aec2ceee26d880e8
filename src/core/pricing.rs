//! Token cost estimation from catalog pricing.
//!
//! Cached-token discounts apply to input only: `cached_ratio` of the input
//! tokens are billed at the cached input rate and the rest at the standard
//! input rate, while output tokens are always billed at the standard output
//! rate.

use serde::{Deserialize, Serialize};

use crate::core::catalog::{CatalogEntry, Model, Provider};
use crate::core::lookup::find_model;
use crate::error::{McatError, Result};

const PER_MILLION: f64 = 1_000_000.0;

/// Per-million token pricing for a model (USD).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
    /// Zero when cached input is not discounted separately.
    pub cached_input_per_million: f64,
}

impl From<&Model> for ModelPricing {
    fn from(model: &Model) -> Self {
        Self {
            input_per_million: model.cost_per_1m_in,
            output_per_million: model.cost_per_1m_out,
            cached_input_per_million: model.cost_per_1m_in_cached,
        }
    }
}

/// Cost breakdown for one scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenCostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl ModelPricing {
    /// Cost of `input_tokens`/`output_tokens` with the given cached share of input.
    ///
    /// `cached_ratio` is expected to be validated to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, input_tokens: u64, output_tokens: u64, cached_ratio: f64) -> TokenCostBreakdown {
        let input = input_tokens as f64;
        let cached = input * cached_ratio;
        let uncached = input * (1.0 - cached_ratio);

        let input_cost = uncached * self.input_per_million / PER_MILLION
            + cached * self.cached_input_per_million / PER_MILLION;
        let output_cost = output_tokens as f64 * self.output_per_million / PER_MILLION;

        TokenCostBreakdown {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    /// Cost of a chat turn from reported usage, billed at uncached rates.
    #[must_use]
    pub fn turn_cost(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        self.estimate(prompt_tokens, completion_tokens, 0.0).total_cost
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// One cost question: which model, how many tokens, how much cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostScenario {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default)]
    pub cached_ratio: f64,
}

impl CostScenario {
    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidScenario` for an empty model or a cached ratio that
    /// is not a finite number in `[0, 1]`.
    pub fn validate(&self, index: Option<usize>) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(McatError::InvalidScenario {
                index,
                reason: "model must not be empty".to_string(),
            });
        }
        validate_cached_ratio(self.cached_ratio).map_err(|reason| McatError::InvalidScenario {
            index,
            reason,
        })
    }
}

/// Reject cached ratios outside `[0, 1]` instead of clamping them.
///
/// # Errors
///
/// Returns a description of the problem.
pub fn validate_cached_ratio(ratio: f64) -> std::result::Result<(), String> {
    if ratio.is_finite() && (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(format!("cached_ratio must be between 0 and 1, got {ratio}"))
    }
}

/// Parse and validate a batch file body (a JSON array of scenarios).
///
/// # Errors
///
/// Returns `InvalidScenario` if the body is not an array or any record is
/// malformed or out of range. One bad record rejects the whole batch.
pub fn parse_batch(json: &str) -> Result<Vec<CostScenario>> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| McatError::InvalidScenario {
            index: None,
            reason: format!("batch file must be a JSON array of scenarios: {e}"),
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let scenario: CostScenario =
                serde_json::from_value(record).map_err(|e| McatError::InvalidScenario {
                    index: Some(i),
                    reason: e.to_string(),
                })?;
            scenario.validate(Some(i))?;
            Ok(scenario)
        })
        .collect()
}

// =============================================================================
// Results
// =============================================================================

/// Cost of one scenario against a resolved model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResult {
    pub model: String,
    pub model_id: String,
    pub provider: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_ratio: f64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostResult {
    fn new(entry: CatalogEntry<'_>, input_tokens: u64, output_tokens: u64, cached_ratio: f64) -> Self {
        let breakdown =
            ModelPricing::from(entry.model).estimate(input_tokens, output_tokens, cached_ratio);
        Self {
            model: entry.model.name.clone(),
            model_id: entry.model.id.clone(),
            provider: entry.provider.name.clone(),
            input_tokens,
            output_tokens,
            cached_ratio,
            input_cost: breakdown.input_cost,
            output_cost: breakdown.output_cost,
            total_cost: breakdown.total_cost,
        }
    }
}

/// A batch entry that did not resolve to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub index: usize,
    pub model: String,
}

/// Results of a batch or comparison, plus what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    pub results: Vec<CostResult>,
    pub skipped: Vec<SkippedEntry>,
}

/// Estimate one scenario.
///
/// # Errors
///
/// Returns `ModelNotFound` if the model does not resolve, or
/// `InvalidScenario` if the scenario fails validation.
pub fn estimate(providers: &[Provider], scenario: &CostScenario) -> Result<CostResult> {
    scenario.validate(None)?;
    let entry = find_model(providers, &scenario.model)?;
    Ok(CostResult::new(
        entry,
        scenario.input_tokens,
        scenario.output_tokens,
        scenario.cached_ratio,
    ))
}

/// Estimate each scenario independently, in order.
///
/// Unknown models are skipped and recorded; they never abort the batch.
#[must_use]
pub fn estimate_batch(providers: &[Provider], scenarios: &[CostScenario]) -> CostReport {
    let mut report = CostReport::default();
    for (index, scenario) in scenarios.iter().enumerate() {
        match find_model(providers, &scenario.model) {
            Ok(entry) => report.results.push(CostResult::new(
                entry,
                scenario.input_tokens,
                scenario.output_tokens,
                scenario.cached_ratio,
            )),
            Err(_) => {
                tracing::debug!(index, model = %scenario.model, "Skipping scenario with unknown model");
                report.skipped.push(SkippedEntry {
                    index,
                    model: scenario.model.clone(),
                });
            }
        }
    }
    report
}

/// Apply one token profile to several models, cheapest first.
///
/// Equal totals keep the order the models were named in.
#[must_use]
pub fn compare(
    providers: &[Provider],
    models: &[String],
    input_tokens: u64,
    output_tokens: u64,
    cached_ratio: f64,
) -> CostReport {
    let scenarios: Vec<CostScenario> = models
        .iter()
        .map(|m| CostScenario {
            model: m.trim().to_string(),
            input_tokens,
            output_tokens,
            cached_ratio,
        })
        .collect();
    let mut report = estimate_batch(providers, &scenarios);
    report
        .results
        .sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_float_eq;
    use crate::test_utils::{make_test_model, make_test_provider};

    fn model_a() -> Model {
        let mut m = make_test_model("model-a", 2.5, 10.0, 128_000);
        m.cost_per_1m_in_cached = 1.25;
        m
    }

    fn catalog() -> Vec<Provider> {
        vec![make_test_provider(
            "acme",
            vec![
                model_a(),
                make_test_model("model-b", 0.5, 1.5, 64_000),
                make_test_model("model-c", 15.0, 60.0, 200_000),
            ],
        )]
    }

    #[test]
    fn worked_example() {
        let cost = ModelPricing::from(&model_a()).estimate(1000, 500, 0.5);
        assert_float_eq!(cost.input_cost, 0.001_875);
        assert_float_eq!(cost.output_cost, 0.005);
        assert_float_eq!(cost.total_cost, 0.006_875);
    }

    #[test]
    fn cached_ratio_boundaries() {
        let pricing = ModelPricing::from(&model_a());
        let uncached = pricing.estimate(10_000, 0, 0.0);
        assert_float_eq!(uncached.input_cost, 10_000.0 * 2.5 / 1e6);
        let cached = pricing.estimate(10_000, 0, 1.0);
        assert_float_eq!(cached.input_cost, 10_000.0 * 1.25 / 1e6);
    }

    #[test]
    fn output_never_discounted() {
        let pricing = ModelPricing::from(&model_a());
        let a = pricing.estimate(0, 1_000, 0.0);
        let b = pricing.estimate(0, 1_000, 1.0);
        assert_float_eq!(a.output_cost, b.output_cost);
    }

    #[test]
    fn cost_is_linear_in_tokens() {
        let pricing = ModelPricing::from(&model_a());
        let base = pricing.estimate(1_000, 400, 0.3);
        let doubled_input = pricing.estimate(2_000, 400, 0.3);
        let doubled_output = pricing.estimate(1_000, 800, 0.3);
        assert_float_eq!(doubled_input.input_cost, 2.0 * base.input_cost, 1e-12);
        assert_float_eq!(doubled_input.output_cost, base.output_cost, 1e-12);
        assert_float_eq!(doubled_output.output_cost, 2.0 * base.output_cost, 1e-12);
        assert_float_eq!(doubled_output.input_cost, base.input_cost, 1e-12);
    }

    #[test]
    fn turn_cost_uses_uncached_rates() {
        let pricing = ModelPricing::from(&model_a());
        assert_float_eq!(pricing.turn_cost(1_000, 500), 0.0075);
    }

    #[test]
    fn single_estimate_resolves_model() {
        let scenario = CostScenario {
            model: "MODEL-A".to_string(),
            input_tokens: 1000,
            output_tokens: 500,
            cached_ratio: 0.5,
        };
        let result = estimate(&catalog(), &scenario).unwrap();
        assert_eq!(result.model_id, "model-a");
        assert_eq!(result.provider, "Acme");
        assert_float_eq!(result.total_cost, 0.006_875);

        let missing = CostScenario {
            model: "nope".to_string(),
            ..scenario
        };
        assert!(estimate(&catalog(), &missing).unwrap_err().is_not_found());
    }

    #[test]
    fn batch_skips_unknown_models() {
        let scenarios = vec![
            CostScenario {
                model: "unknown-model".to_string(),
                input_tokens: 10,
                output_tokens: 10,
                cached_ratio: 0.0,
            },
            CostScenario {
                model: "model-b".to_string(),
                input_tokens: 1_000_000,
                output_tokens: 0,
                cached_ratio: 0.0,
            },
        ];
        let report = estimate_batch(&catalog(), &scenarios);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].model_id, "model-b");
        assert_float_eq!(report.results[0].total_cost, 0.5);
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                index: 0,
                model: "unknown-model".to_string()
            }]
        );
    }

    #[test]
    fn batch_keeps_scenario_order() {
        let scenarios: Vec<_> = ["model-c", "model-a", "model-b"]
            .iter()
            .map(|m| CostScenario {
                model: (*m).to_string(),
                input_tokens: 1000,
                output_tokens: 1000,
                cached_ratio: 0.0,
            })
            .collect();
        let ids: Vec<_> = estimate_batch(&catalog(), &scenarios)
            .results
            .into_iter()
            .map(|r| r.model_id)
            .collect();
        assert_eq!(ids, vec!["model-c", "model-a", "model-b"]);
    }

    #[test]
    fn compare_sorts_ascending_by_total() {
        let models = vec![
            "model-c".to_string(),
            " model-a ".to_string(),
            "ghost".to_string(),
            "model-b".to_string(),
        ];
        let report = compare(&catalog(), &models, 1000, 1000, 0.0);
        let ids: Vec<_> = report.results.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(ids, vec!["model-b", "model-a", "model-c"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 2);
    }

    #[test]
    fn parse_batch_accepts_optional_ratio() {
        let json = r#"[
            {"model": "model-a", "input_tokens": 1000, "output_tokens": 500, "cached_ratio": 0.5},
            {"model": "model-b", "input_tokens": 10, "output_tokens": 20}
        ]"#;
        let scenarios = parse_batch(json).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_float_eq!(scenarios[1].cached_ratio, 0.0);
    }

    #[test]
    fn parse_batch_rejects_bad_records() {
        let err = parse_batch(r#"{"model": "x"}"#).unwrap_err();
        assert!(matches!(err, McatError::InvalidScenario { index: None, .. }));

        let err = parse_batch(r#"[{"model": "a", "input_tokens": 1, "output_tokens": 1}, {"model": "b", "input_tokens": -5, "output_tokens": 1}]"#)
            .unwrap_err();
        assert!(matches!(err, McatError::InvalidScenario { index: Some(1), .. }));

        let err = parse_batch(r#"[{"model": "a", "input_tokens": 1, "output_tokens": 1, "cached_ratio": 1.5}]"#)
            .unwrap_err();
        assert!(matches!(err, McatError::InvalidScenario { index: Some(0), ref reason } if reason.contains("1.5")));

        let err = parse_batch(r#"[{"model": " ", "input_tokens": 1, "output_tokens": 1}]"#).unwrap_err();
        assert_eq!(err.error_code(), "MCAT-I001");
    }

    #[test]
    fn ratio_validation() {
        assert!(validate_cached_ratio(0.0).is_ok());
        assert!(validate_cached_ratio(1.0).is_ok());
        assert!(validate_cached_ratio(-0.01).is_err());
        assert!(validate_cached_ratio(f64::NAN).is_err());
    }
}
