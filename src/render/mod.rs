//! Output rendering for human and robot modes.
//!
//! Each command has one entry point that picks the encoding from
//! [`RenderOptions::format`]. Formats a command cannot express return
//! `UnsupportedOutputMode`.

pub mod error;
pub mod human;
pub mod robot;

use crate::cli::args::OutputFormat;
use crate::core::models::{
    CatalogMeta, ComparePayload, MatchPayload, ModelExport, ModelView, ProviderSummary,
};
use crate::core::pricing::CostReport;
use crate::error::{McatError, Result};
use crate::storage::config::ConfigReport;
use robot::{csv_table, markdown_section, markdown_table, render_json};

/// Rendering settings shared by every command.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
    /// Catalog provenance for the robot envelope.
    pub catalog: Option<CatalogMeta>,
}

impl RenderOptions {
    fn unsupported(&self, command: &str) -> McatError {
        McatError::UnsupportedOutputMode {
            command: command.to_string(),
            mode: self.format.as_str().to_string(),
        }
    }

    fn json<T: serde::Serialize>(&self, command: &str, data: T, errors: Vec<String>) -> Result<String> {
        render_json(command, data, errors, self.catalog.clone(), self.pretty)
    }
}

/// Render the provider list.
pub fn render_providers(providers: &[ProviderSummary], opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_providers(providers, opts.no_color)),
        OutputFormat::Json => opts.json("providers", providers, vec![]),
        OutputFormat::Md => Ok(markdown_section("Providers", providers)),
        OutputFormat::Csv => Ok(csv_table(providers)),
    }
}

/// Render the models of one provider.
pub fn render_models(provider: &str, models: &[ModelView], opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_models(provider, models, opts.no_color)),
        OutputFormat::Json => opts.json("models", models, vec![]),
        OutputFormat::Md => Ok(markdown_section(&format!("{provider} models"), models)),
        OutputFormat::Csv => Ok(csv_table(models)),
    }
}

/// Render details of one model.
pub fn render_model_info(model: &ModelView, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_model_info(model, opts.no_color)),
        OutputFormat::Json => opts.json("info", model, vec![]),
        OutputFormat::Md => Ok(render_info_md(model)),
        OutputFormat::Csv => Err(opts.unsupported("info")),
    }
}

/// The export document is always bare JSON; it is meant to be saved as-is.
pub fn render_export(export: &ModelExport, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(export)?
    } else {
        serde_json::to_string(export)?
    };
    Ok(json)
}

fn render_info_md(model: &ModelView) -> String {
    let mut out = format!("## {} ({})\n\n", model.name, model.provider);
    out.push_str(&format!("- id: {}\n", model.id));
    out.push_str(&format!("- input_per_1m: {}\n", model.cost_per_1m_in));
    out.push_str(&format!("- output_per_1m: {}\n", model.cost_per_1m_out));
    out.push_str(&format!("- cached_input_per_1m: {}\n", model.cost_per_1m_in_cached));
    out.push_str(&format!("- cached_output_per_1m: {}\n", model.cost_per_1m_out_cached));
    out.push_str(&format!("- context_window: {}\n", model.context_window));
    out.push_str(&format!("- default_max_tokens: {}\n", model.default_max_tokens));
    out.push_str(&format!("- reasoning: {}\n", model.can_reason));
    if !model.reasoning_levels.is_empty() {
        out.push_str(&format!("- reasoning_levels: {}\n", model.reasoning_levels.join(", ")));
    }
    if let Some(effort) = &model.default_reasoning_effort {
        out.push_str(&format!("- default_reasoning_effort: {effort}\n"));
    }
    out.push_str(&format!("- vision: {}\n", model.supports_vision));
    out
}

/// Render ranked matches for `command` (`find` or `select`).
pub fn render_matches(
    command: &str,
    payload: &MatchPayload,
    detail: usize,
    opts: &RenderOptions,
) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_matches(payload, detail, opts.no_color)),
        OutputFormat::Json => opts.json(command, payload, vec![]),
        OutputFormat::Md => Ok(markdown_section(
            &format!("Top {} of {} matches", payload.results.len(), payload.total_matches),
            &payload.results,
        )),
        OutputFormat::Csv => Ok(csv_table(&payload.results)),
    }
}

/// Render a side-by-side model comparison.
pub fn render_compare(payload: &ComparePayload, opts: &RenderOptions) -> Result<String> {
    let errors: Vec<String> = payload
        .missing
        .iter()
        .map(|m| format!("model not found: {m}"))
        .collect();
    match opts.format {
        OutputFormat::Human => Ok(human::render_compare(payload, opts.no_color)),
        OutputFormat::Json => opts.json("find", payload, errors),
        OutputFormat::Md => Ok(markdown_section("Model comparison", &payload.models)),
        OutputFormat::Csv => Ok(csv_table(&payload.models)),
    }
}

/// Render cost results. Skipped entries surface in the envelope `errors`.
pub fn render_costs(report: &CostReport, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_costs(report, opts.no_color)),
        OutputFormat::Json => {
            let errors = report
                .skipped
                .iter()
                .map(|s| format!("entry {}: model not found: {}", s.index + 1, s.model))
                .collect();
            opts.json("cost", report, errors)
        }
        OutputFormat::Md => Ok(markdown_table(&report.results)),
        OutputFormat::Csv => Ok(csv_table(&report.results)),
    }
}

/// Render the resolved configuration.
pub fn render_config(report: &ConfigReport, opts: &RenderOptions) -> Result<String> {
    match opts.format {
        OutputFormat::Human => Ok(human::render_config(report, opts.no_color)),
        OutputFormat::Json => opts.json("config", report, vec![]),
        OutputFormat::Md => Ok(format!(
            "{}\nConfig file: `{}`\n",
            markdown_section("Configuration", &report.entries),
            report.config_path
        )),
        OutputFormat::Csv => Err(opts.unsupported("config")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_test_model, make_test_provider};
    use crate::{assert_contains, assert_json_valid};

    fn opts(format: OutputFormat) -> RenderOptions {
        RenderOptions {
            format,
            pretty: false,
            no_color: true,
            catalog: None,
        }
    }

    #[test]
    fn csv_not_offered_for_info_or_config() {
        let provider = make_test_provider("acme", vec![make_test_model("a", 1.0, 2.0, 8_000)]);
        let view = ModelView::new(&provider.models[0], &provider);
        let err = render_model_info(&view, &opts(OutputFormat::Csv)).unwrap_err();
        assert!(matches!(err, McatError::UnsupportedOutputMode { .. }));
        assert_contains!(&err.to_string(), "info: csv");
    }

    #[test]
    fn info_markdown_lists_fields() {
        let provider = make_test_provider("acme", vec![make_test_model("a", 1.0, 2.0, 8_000)]);
        let view = ModelView::new(&provider.models[0], &provider);
        let md = render_model_info(&view, &opts(OutputFormat::Md)).unwrap();
        assert!(md.starts_with("## A (Acme)"));
        assert_contains!(&md, "- context_window: 8000");
    }

    #[test]
    fn skipped_costs_become_envelope_errors() {
        let report = CostReport {
            results: vec![],
            skipped: vec![crate::core::pricing::SkippedEntry {
                index: 1,
                model: "ghost".into(),
            }],
        };
        let json = render_costs(&report, &opts(OutputFormat::Json)).unwrap();
        assert_json_valid!(&json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["errors"][0], "entry 2: model not found: ghost");
        assert_eq!(value["data"]["results"], serde_json::json!([]));
    }

    #[test]
    fn export_is_bare_document() {
        let provider = make_test_provider("acme", vec![make_test_model("a", 1.0, 2.0, 8_000)]);
        let export = ModelExport::new(&provider.models[0], &provider);
        let json = render_export(&export, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("schemaVersion").is_none());
        assert_eq!(value["api_config"]["endpoint"], "https://api.acme.test/v1");
    }
}
