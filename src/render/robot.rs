//! Robot-mode output (JSON, Markdown and CSV).
//!
//! Provides stable, token-efficient output for scripts and AI agents. JSON
//! wraps every payload in the [`RobotOutput`] envelope; Markdown and CSV
//! flatten row-shaped payloads through [`Tabular`].

use serde::Serialize;

use crate::core::models::{CatalogMeta, ModelView, ProviderSummary, RankedModel, RobotOutput};
use crate::core::pricing::CostResult;
use crate::error::Result;
use crate::storage::config::ConfigEntry;
use crate::util::{format_context, format_cost, format_price, yes_no};

/// Render a payload in the JSON envelope.
pub fn render_json<T: Serialize>(
    command: &str,
    data: T,
    errors: Vec<String>,
    catalog: Option<CatalogMeta>,
    pretty: bool,
) -> Result<String> {
    let output = RobotOutput::new(command, data)
        .with_errors(errors)
        .with_catalog(catalog);
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}

// =============================================================================
// Tables
// =============================================================================

/// A payload row that can be laid out as a table.
pub trait Tabular {
    fn headers() -> &'static [&'static str];

    /// Display cells, used for Markdown.
    fn row(&self) -> Vec<String>;

    /// Raw cells, used for CSV.
    fn record(&self) -> Vec<String> {
        self.row()
    }
}

impl Tabular for ProviderSummary {
    fn headers() -> &'static [&'static str] {
        &["id", "name", "type", "models", "endpoint"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.provider_type.clone(),
            self.model_count.to_string(),
            self.endpoint.clone(),
        ]
    }
}

impl Tabular for ModelView {
    fn headers() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "provider",
            "input_per_1m",
            "output_per_1m",
            "context",
            "reasoning",
            "vision",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.provider.clone(),
            format_price(self.cost_per_1m_in),
            format_price(self.cost_per_1m_out),
            format_context(self.context_window),
            yes_no(self.can_reason).to_string(),
            yes_no(self.supports_vision).to_string(),
        ]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.provider.clone(),
            self.cost_per_1m_in.to_string(),
            self.cost_per_1m_out.to_string(),
            self.context_window.to_string(),
            self.can_reason.to_string(),
            self.supports_vision.to_string(),
        ]
    }
}

impl Tabular for RankedModel {
    fn headers() -> &'static [&'static str] {
        &[
            "rank",
            "model",
            "provider",
            "score",
            "input_per_1m",
            "output_per_1m",
            "context",
            "reasoning",
            "vision",
            "reasons",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.rank.to_string(),
            self.model.clone(),
            self.provider.clone(),
            format!("{:.1}", self.score),
            format_price(self.cost_per_1m_in),
            format_price(self.cost_per_1m_out),
            format_context(self.context_window),
            yes_no(self.can_reason).to_string(),
            yes_no(self.supports_vision).to_string(),
            self.reasons.join("; "),
        ]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.rank.to_string(),
            self.model_id.clone(),
            self.provider_id.clone(),
            format!("{:.1}", self.score),
            self.cost_per_1m_in.to_string(),
            self.cost_per_1m_out.to_string(),
            self.context_window.to_string(),
            self.can_reason.to_string(),
            self.supports_vision.to_string(),
            self.reasons.join("; "),
        ]
    }
}

impl Tabular for CostResult {
    fn headers() -> &'static [&'static str] {
        &[
            "model",
            "provider",
            "input_tokens",
            "output_tokens",
            "cached_ratio",
            "input_cost",
            "output_cost",
            "total_cost",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.provider.clone(),
            self.input_tokens.to_string(),
            self.output_tokens.to_string(),
            format!("{:.2}", self.cached_ratio),
            format_cost(self.input_cost),
            format_cost(self.output_cost),
            format_cost(self.total_cost),
        ]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.provider.clone(),
            self.input_tokens.to_string(),
            self.output_tokens.to_string(),
            format!("{:.2}", self.cached_ratio),
            format!("{:.4}", self.input_cost),
            format!("{:.4}", self.output_cost),
            format!("{:.4}", self.total_cost),
        ]
    }
}

impl Tabular for ConfigEntry {
    fn headers() -> &'static [&'static str] {
        &["key", "value", "source"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.value.clone(),
            self.source.to_string(),
        ]
    }
}

// =============================================================================
// Markdown
// =============================================================================

/// Markdown table. An empty row set yields only the header.
#[must_use]
pub fn markdown_table<T: Tabular>(rows: &[T]) -> String {
    let headers = T::headers();
    let mut out = String::new();
    out.push_str(&markdown_line(headers.iter().map(|h| (*h).to_string())));
    out.push_str(&markdown_line(headers.iter().map(|_| "---".to_string())));
    for row in rows {
        out.push_str(&markdown_line(row.row().into_iter()));
    }
    out
}

fn markdown_line(cells: impl Iterator<Item = String>) -> String {
    let cells: Vec<String> = cells
        .map(|c| c.replace('|', "\\|").replace('\n', " "))
        .collect();
    format!("| {} |\n", cells.join(" | "))
}

/// Markdown heading followed by a table.
#[must_use]
pub fn markdown_section<T: Tabular>(title: &str, rows: &[T]) -> String {
    format!("## {title}\n\n{}", markdown_table(rows))
}

// =============================================================================
// CSV
// =============================================================================

/// CSV with a header row, quoted per RFC 4180, CRLF-free.
#[must_use]
pub fn csv_table<T: Tabular>(rows: &[T]) -> String {
    let mut out = csv_line(T::headers().iter().map(|h| (*h).to_string()));
    for row in rows {
        out.push_str(&csv_line(row.record().into_iter()));
    }
    out
}

fn csv_line(cells: impl Iterator<Item = String>) -> String {
    let cells: Vec<String> = cells.map(|c| csv_field(&c)).collect();
    format!("{}\n", cells.join(","))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pricing::{self, CostScenario};
    use crate::storage::config::ConfigSource;
    use crate::test_utils::{make_test_model, make_test_provider};
    use crate::{assert_contains, assert_json_valid};

    fn worked_example() -> CostResult {
        let mut model = make_test_model("a", 2.5, 10.0, 128_000);
        model.cost_per_1m_in_cached = 1.25;
        let providers = vec![make_test_provider("acme", vec![model])];
        let scenario = CostScenario {
            model: "a".into(),
            input_tokens: 1000,
            output_tokens: 500,
            cached_ratio: 0.5,
        };
        pricing::estimate(&providers, &scenario).unwrap()
    }

    #[test]
    fn json_envelope_wraps_payload() {
        let out = render_json("cost", vec![worked_example()], vec!["skipped".into()], None, false)
            .unwrap();
        assert_json_valid!(&out);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["command"], "cost");
        let total = value["data"][0]["totalCost"].as_f64().unwrap();
        assert!((total - 0.006_875).abs() < 1e-12);
        assert_eq!(value["errors"][0], "skipped");
        assert_eq!(value["meta"]["format"], "json");
    }

    #[test]
    fn pretty_json_is_multiline() {
        let out = render_json("providers", Vec::<ProviderSummary>::new(), vec![], None, true)
            .unwrap();
        assert!(out.lines().count() > 1);
    }

    #[test]
    fn markdown_costs() {
        let md = markdown_table(&[worked_example()]);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| model | provider |"));
        assert_contains!(lines[2], "$0.006875");
    }

    #[test]
    fn markdown_escapes_pipes() {
        let entry = ConfigEntry {
            key: "catalog.url".into(),
            value: "a|b".into(),
            source: ConfigSource::Default,
        };
        assert_contains!(&markdown_table(&[entry]), "a\\|b");
    }

    #[test]
    fn csv_costs_use_four_decimals() {
        let csv = csv_table(&[worked_example()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "model,provider,input_tokens,output_tokens,cached_ratio,input_cost,output_cost,total_cost"
        );
        assert_eq!(lines[1], "A,Acme,1000,500,0.50,0.0019,0.0050,0.0069");
    }

    #[test]
    fn csv_quotes_special_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn empty_tables_keep_headers() {
        assert_eq!(csv_table::<ProviderSummary>(&[]), "id,name,type,models,endpoint\n");
        assert_eq!(markdown_table::<ProviderSummary>(&[]).lines().count(), 2);
    }
}
