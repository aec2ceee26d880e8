//! Output payloads and the robot-mode envelope.
//!
//! These are the serialized shapes of command results. They own their data
//! so that rendering does not depend on catalog lifetimes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::catalog::{CatalogOrigin, Model, Provider};
use crate::core::filter::Requirements;
use crate::core::ranking::MatchCandidate;
use crate::error::McatError;

/// Robot envelope schema identifier.
pub const SCHEMA_VERSION: &str = "mcat.v1";

// =============================================================================
// Catalog views
// =============================================================================

/// One row of `providers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub provider_type: String,
    pub endpoint: String,
    pub model_count: usize,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub default_large_model_id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub default_small_model_id: String,
}

impl From<&Provider> for ProviderSummary {
    fn from(p: &Provider) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            provider_type: p.provider_type.clone(),
            endpoint: p.api_endpoint.clone(),
            model_count: p.models.len(),
            default_large_model_id: p.default_large_model_id.clone(),
            default_small_model_id: p.default_small_model_id.clone(),
        }
    }
}

/// A model with its provider, as shown by `models` and `info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelView {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub provider_id: String,
    pub cost_per_1m_in: f64,
    pub cost_per_1m_out: f64,
    pub cost_per_1m_in_cached: f64,
    pub cost_per_1m_out_cached: f64,
    pub context_window: u64,
    pub default_max_tokens: u64,
    pub can_reason: bool,
    pub supports_vision: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reasoning_effort: Option<String>,
}

impl ModelView {
    #[must_use]
    pub fn new(model: &Model, provider: &Provider) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            provider: provider.name.clone(),
            provider_id: provider.id.clone(),
            cost_per_1m_in: model.cost_per_1m_in,
            cost_per_1m_out: model.cost_per_1m_out,
            cost_per_1m_in_cached: model.cost_per_1m_in_cached,
            cost_per_1m_out_cached: model.cost_per_1m_out_cached,
            context_window: model.context_window,
            default_max_tokens: model.default_max_tokens,
            can_reason: model.can_reason,
            supports_vision: model.supports_vision,
            reasoning_levels: model.reasoning_levels.clone(),
            default_reasoning_effort: model.default_reasoning_effort.clone(),
        }
    }
}

/// Connection details for a model, written by `info --export`.
///
/// Keys follow the catalog's own snake_case field names so the document can
/// be fed back into catalog-aware tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelExport {
    pub model: Model,
    pub provider: String,
    pub api_config: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default)]
    pub headers: std::collections::BTreeMap<String, String>,
}

impl ModelExport {
    #[must_use]
    pub fn new(model: &Model, provider: &Provider) -> Self {
        Self {
            model: model.clone(),
            provider: provider.name.clone(),
            api_config: ApiConfig {
                endpoint: provider.api_endpoint.clone(),
                api_key: provider.api_key.clone(),
                headers: provider.default_headers.clone(),
            },
        }
    }
}

// =============================================================================
// Ranked results
// =============================================================================

/// A ranked candidate: identity, score, cost summary, capabilities, reasons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedModel {
    pub rank: usize,
    pub model_id: String,
    pub model: String,
    pub provider: String,
    pub provider_id: String,
    pub score: f64,
    pub cost_per_1m_in: f64,
    pub cost_per_1m_out: f64,
    pub context_window: u64,
    pub can_reason: bool,
    pub supports_vision: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl RankedModel {
    /// Build payload rows from ranked candidates, numbering from 1.
    #[must_use]
    pub fn from_candidates(candidates: &[MatchCandidate<'_>]) -> Vec<Self> {
        candidates
            .iter()
            .enumerate()
            .map(|(i, c)| Self {
                rank: i + 1,
                model_id: c.model.id.clone(),
                model: c.model.name.clone(),
                provider: c.provider.name.clone(),
                provider_id: c.provider.id.clone(),
                score: c.score,
                cost_per_1m_in: c.model.cost_per_1m_in,
                cost_per_1m_out: c.model.cost_per_1m_out,
                context_window: c.model.context_window,
                can_reason: c.model.can_reason,
                supports_vision: c.model.supports_vision,
                reasons: c.reasons.clone(),
            })
            .collect()
    }
}

/// Result of `find` and of a finished wizard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchPayload {
    pub requirements: Requirements,
    /// Candidates that passed filtering, before the display limit.
    pub total_matches: usize,
    pub results: Vec<RankedModel>,
}

/// Side-by-side view for `find --compare`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparePayload {
    pub models: Vec<ModelView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Serializable fix suggestion for robot output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FixSuggestionReport {
    pub commands: Vec<String>,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,
}

/// Structured description of a fatal error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: String,
    pub category: String,
    pub message: String,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<FixSuggestionReport>,
}

impl From<&McatError> for ErrorReport {
    fn from(e: &McatError) -> Self {
        Self {
            code: e.error_code().to_string(),
            category: e.category().description().to_string(),
            message: e.to_string(),
            retryable: e.is_retryable(),
            suggestions: e
                .fix_suggestions()
                .into_iter()
                .map(|s| FixSuggestionReport {
                    commands: s.commands,
                    context: s.context,
                    prevention: s.prevention,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Top-level JSON envelope for robot mode output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
    /// Non-fatal problems (skipped batch entries and the like).
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<ErrorReport>,
    pub meta: RobotMeta,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotMeta {
    pub format: String,
    pub runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogMeta>,
}

/// Where the catalog behind a result came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    pub location: String,
    pub origin: CatalogOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl<T> RobotOutput<T> {
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors: Vec::new(),
            error_details: None,
            meta: RobotMeta {
                format: "json".to_string(),
                runtime: "cli".to_string(),
                catalog: None,
            },
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Option<CatalogMeta>) -> Self {
        self.meta.catalog = catalog;
        self
    }
}

impl RobotOutput<Option<()>> {
    /// Envelope for a command that failed outright.
    pub fn failure(command: impl Into<String>, error: &McatError) -> Self {
        let mut out = Self::new(command, None);
        out.errors = vec![error.to_string()];
        out.error_details = Some(ErrorReport::from(error));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::entries;
    use crate::core::ranking::RankedList;
    use crate::core::scoring::ScoringPolicy;
    use crate::test_utils::{make_test_model, make_test_provider};
    use crate::{assert_contains, assert_json_valid};

    #[test]
    fn envelope_is_camel_case() {
        let out = RobotOutput::new("providers", vec![1, 2]).with_errors(vec!["warn".into()]);
        let json = serde_json::to_string(&out).unwrap();
        assert_json_valid!(&json);
        assert_contains!(&json, "\"schemaVersion\":\"mcat.v1\"");
        assert_contains!(&json, "\"generatedAt\"");
        assert_contains!(&json, "\"errors\":[\"warn\"]");
        assert!(!json.contains("errorDetails"));
    }

    #[test]
    fn failure_envelope_carries_details() {
        let err = McatError::ProviderNotFound("nope".into());
        let out = RobotOutput::failure("models", &err);
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["errorDetails"]["code"], "MCAT-L002");
        assert!(value["errorDetails"]["suggestions"].is_array());
    }

    #[test]
    fn ranked_rows_are_numbered() {
        let providers = vec![make_test_provider(
            "acme",
            vec![
                make_test_model("a", 1.0, 2.0, 8_000),
                make_test_model("b", 0.5, 1.0, 300_000),
            ],
        )];
        let all = entries(&providers);
        let ranked = RankedList::rank(&all, ScoringPolicy::Simple, &Requirements::default());
        let rows = RankedModel::from_candidates(ranked.all());
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].model_id, "b");
        assert_eq!(rows[1].provider_id, "acme");
    }

    #[test]
    fn export_uses_catalog_field_names() {
        let mut provider = make_test_provider("acme", vec![make_test_model("a", 1.0, 2.0, 8_000)]);
        provider.api_key = "$ACME_API_KEY".into();
        provider
            .default_headers
            .insert("X-Title".into(), "mcat".into());
        let export = ModelExport::new(&provider.models[0], &provider);
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["api_config"]["api_key"], "$ACME_API_KEY");
        assert_eq!(value["api_config"]["headers"]["X-Title"], "mcat");
        assert_eq!(value["model"]["cost_per_1m_in"], 1.0);
    }
}
