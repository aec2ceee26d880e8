//! Human-readable output using rich_rust.
//!
//! Every listing is a panel whose body is a column-aligned table. Text from
//! the catalog is sanitized before it is laid out.

use rich_rust::prelude::*;
use rich_rust::Segment;

use crate::core::models::{ComparePayload, MatchPayload, ModelView, ProviderSummary, RankedModel};
use crate::core::pricing::{CostReport, CostResult};
use crate::core::session::SessionStats;
use crate::rich::{ThemeConfig, create_default_theme, sanitize, segments_to_string};
use crate::storage::config::ConfigReport;
use crate::util::{format_context, format_cost, format_price, format_tokens, yes_no};

const MIN_PANEL_WIDTH: usize = 60;

type Line = Vec<Segment<'static>>;

// =============================================================================
// Layout helpers
// =============================================================================

fn render_panel(title: &str, lines: Vec<Line>, theme: &ThemeConfig, no_color: bool) -> String {
    let widest = lines
        .iter()
        .map(|l| l.iter().map(|s| s.text.chars().count()).sum::<usize>())
        .max()
        .unwrap_or(0);
    let width = (widest + 4).max(title.chars().count() + 6).max(MIN_PANEL_WIDTH);

    let title = if no_color {
        Text::new(title)
    } else {
        Text::styled(title, theme.primary.clone())
    };
    let mut panel = Panel::new(lines).title(title).padding((0, 1));
    if !no_color {
        panel = panel.border_style(theme.panel_border.clone());
    }
    segments_to_string(&panel.render(width), no_color)
}

/// Column-aligned rows with a bold header line.
fn table_lines(headers: &[&str], rows: &[Vec<String>], theme: &ThemeConfig) -> Vec<Line> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let pad = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    let mut lines = vec![vec![Segment::styled(pad(&header), theme.table_header.clone())]];
    lines.extend(rows.iter().map(|r| vec![Segment::plain(pad(r))]));
    lines
}

fn key_value_lines(pairs: &[(&str, String)], theme: &ThemeConfig) -> Vec<Line> {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| {
            vec![
                Segment::styled(format!("{k:<width$}  "), theme.muted.clone()),
                Segment::plain(v.clone()),
            ]
        })
        .collect()
}

fn note(text: &str, theme: &ThemeConfig) -> Line {
    vec![Segment::styled(text.to_string(), theme.muted.clone())]
}

fn flags(can_reason: bool, supports_vision: bool) -> String {
    match (can_reason, supports_vision) {
        (true, true) => "reasoning, vision".to_string(),
        (true, false) => "reasoning".to_string(),
        (false, true) => "vision".to_string(),
        (false, false) => "-".to_string(),
    }
}

// =============================================================================
// Catalog listings
// =============================================================================

/// Render the provider list.
#[must_use]
pub fn render_providers(providers: &[ProviderSummary], no_color: bool) -> String {
    let theme = create_default_theme();
    let rows: Vec<Vec<String>> = providers
        .iter()
        .map(|p| {
            vec![
                sanitize(&p.id),
                sanitize(&p.name),
                sanitize(&p.provider_type),
                p.model_count.to_string(),
                sanitize(&p.endpoint),
            ]
        })
        .collect();

    let lines = if rows.is_empty() {
        vec![note("No providers found", &theme)]
    } else {
        table_lines(&["ID", "Name", "Type", "Models", "Endpoint"], &rows, &theme)
    };
    render_panel(&format!("Providers ({})", providers.len()), lines, &theme, no_color)
}

/// Render the models of one provider.
#[must_use]
pub fn render_models(provider: &str, models: &[ModelView], no_color: bool) -> String {
    let theme = create_default_theme();
    let rows: Vec<Vec<String>> = models
        .iter()
        .map(|m| {
            vec![
                sanitize(&m.id),
                sanitize(&m.name),
                format_price(m.cost_per_1m_in),
                format_price(m.cost_per_1m_out),
                format_context(m.context_window),
                flags(m.can_reason, m.supports_vision),
            ]
        })
        .collect();

    let lines = if rows.is_empty() {
        vec![note("No models match the given filters", &theme)]
    } else {
        table_lines(
            &["ID", "Name", "In $/1M", "Out $/1M", "Context", "Capabilities"],
            &rows,
            &theme,
        )
    };
    let title = format!("{} models ({})", sanitize(provider), models.len());
    render_panel(&title, lines, &theme, no_color)
}

/// Render full details of one model.
#[must_use]
pub fn render_model_info(model: &ModelView, no_color: bool) -> String {
    let theme = create_default_theme();
    let mut pairs = vec![
        ("ID", sanitize(&model.id)),
        (
            "Provider",
            format!("{} ({})", sanitize(&model.provider), sanitize(&model.provider_id)),
        ),
        ("Input", format!("{} / 1M tokens", format_price(model.cost_per_1m_in))),
        ("Output", format!("{} / 1M tokens", format_price(model.cost_per_1m_out))),
    ];
    if model.cost_per_1m_in_cached > 0.0 || model.cost_per_1m_out_cached > 0.0 {
        pairs.push((
            "Cached input",
            format!("{} / 1M tokens", format_price(model.cost_per_1m_in_cached)),
        ));
        pairs.push((
            "Cached output",
            format!("{} / 1M tokens", format_price(model.cost_per_1m_out_cached)),
        ));
    } else {
        pairs.push(("Caching", "not supported".to_string()));
    }
    pairs.push((
        "Context",
        format!("{} tokens", format_tokens(model.context_window)),
    ));
    pairs.push((
        "Max output",
        format!("{} tokens", format_tokens(model.default_max_tokens)),
    ));
    pairs.push(("Reasoning", yes_no(model.can_reason).to_string()));
    if !model.reasoning_levels.is_empty() {
        pairs.push(("Effort levels", sanitize(&model.reasoning_levels.join(", "))));
    }
    if let Some(effort) = &model.default_reasoning_effort {
        pairs.push(("Default effort", sanitize(effort)));
    }
    pairs.push(("Vision", yes_no(model.supports_vision).to_string()));

    let mut lines = key_value_lines(&pairs, &theme);
    // Provider row takes the provider's brand color.
    if let Some(value) = lines.get_mut(1).and_then(|line| line.get_mut(1)) {
        *value = Segment::styled(
            value.text.to_string(),
            theme.provider_style(&model.provider_id).clone(),
        );
    }
    render_panel(&sanitize(&model.name), lines, &theme, no_color)
}

// =============================================================================
// Matching
// =============================================================================

fn ranked_rows(rows: &[RankedModel]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.rank.to_string(),
                sanitize(&r.model),
                sanitize(&r.provider),
                format!("{:.1}", r.score),
                format_price(r.cost_per_1m_in),
                format_price(r.cost_per_1m_out),
                format_context(r.context_window),
                flags(r.can_reason, r.supports_vision),
            ]
        })
        .collect()
}

/// Render ranked matches. The first `detail` rows also list their reasons.
#[must_use]
pub fn render_matches(payload: &MatchPayload, detail: usize, no_color: bool) -> String {
    let theme = create_default_theme();
    if payload.results.is_empty() {
        return render_panel(
            "Matches",
            vec![note("No models match these requirements", &theme)],
            &theme,
            no_color,
        );
    }

    let mut lines = table_lines(
        &["#", "Model", "Provider", "Score", "In $/1M", "Out $/1M", "Context", "Capabilities"],
        &ranked_rows(&payload.results),
        &theme,
    );

    let detailed: Vec<&RankedModel> = payload
        .results
        .iter()
        .take(detail)
        .filter(|r| !r.reasons.is_empty())
        .collect();
    if !detailed.is_empty() {
        lines.push(Vec::new());
        for r in detailed {
            lines.push(vec![
                Segment::styled(format!("{}. {}", r.rank, sanitize(&r.model)), theme.score.clone()),
                Segment::styled(format!("  score {:.1}", r.score), theme.muted.clone()),
            ]);
            for reason in &r.reasons {
                lines.push(vec![Segment::plain(format!("   - {reason}"))]);
            }
        }
    }

    let title = format!(
        "Top {} of {} matches",
        payload.results.len(),
        payload.total_matches
    );
    render_panel(&title, lines, &theme, no_color)
}

/// Render models side by side, one column per model.
#[must_use]
pub fn render_compare(payload: &ComparePayload, no_color: bool) -> String {
    let theme = create_default_theme();
    let mut lines = Vec::new();

    if payload.models.is_empty() {
        lines.push(note("No models found", &theme));
    } else {
        let mut headers = vec!["".to_string()];
        headers.extend(payload.models.iter().map(|m| sanitize(&m.name)));
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let row = |label: &str, f: &dyn Fn(&ModelView) -> String| -> Vec<String> {
            std::iter::once(label.to_string())
                .chain(payload.models.iter().map(f))
                .collect()
        };
        let rows = vec![
            row("Provider", &|m: &ModelView| sanitize(&m.provider)),
            row("Input $/1M", &|m: &ModelView| format_price(m.cost_per_1m_in)),
            row("Output $/1M", &|m: &ModelView| format_price(m.cost_per_1m_out)),
            row("Cached in $/1M", &|m: &ModelView| format_price(m.cost_per_1m_in_cached)),
            row("Context", &|m: &ModelView| format_context(m.context_window)),
            row("Max output", &|m: &ModelView| format_context(m.default_max_tokens)),
            row("Reasoning", &|m: &ModelView| yes_no(m.can_reason).to_string()),
            row("Vision", &|m: &ModelView| yes_no(m.supports_vision).to_string()),
        ];
        lines.extend(table_lines(&header_refs, &rows, &theme));
    }

    render_panel("Model comparison", lines, &theme, no_color)
}

// =============================================================================
// Costs
// =============================================================================

fn single_cost_lines(result: &CostResult, theme: &ThemeConfig) -> Vec<Line> {
    let mut lines = key_value_lines(
        &[
            ("Provider", sanitize(&result.provider)),
            ("Input tokens", format_tokens(result.input_tokens)),
            ("Output tokens", format_tokens(result.output_tokens)),
            ("Cached ratio", format!("{:.0}%", result.cached_ratio * 100.0)),
            ("Input cost", format_cost(result.input_cost)),
            ("Output cost", format_cost(result.output_cost)),
        ],
        theme,
    );
    lines.push(vec![
        Segment::styled("Total         ".to_string(), theme.table_header.clone()),
        Segment::styled(format_cost(result.total_cost), theme.cost.clone()),
    ]);
    lines
}

/// Render cost results. A single result gets a breakdown panel.
#[must_use]
pub fn render_costs(report: &CostReport, no_color: bool) -> String {
    let theme = create_default_theme();

    if let [result] = report.results.as_slice()
        && report.skipped.is_empty()
    {
        let title = format!("Cost estimate: {}", sanitize(&result.model));
        return render_panel(&title, single_cost_lines(result, &theme), &theme, no_color);
    }

    let lines = if report.results.is_empty() {
        vec![note("No models found", &theme)]
    } else {
        let rows: Vec<Vec<String>> = report
            .results
            .iter()
            .map(|r| {
                vec![
                    sanitize(&r.model),
                    sanitize(&r.provider),
                    format_tokens(r.input_tokens),
                    format_tokens(r.output_tokens),
                    format!("{:.0}%", r.cached_ratio * 100.0),
                    format_cost(r.input_cost),
                    format_cost(r.output_cost),
                    format_cost(r.total_cost),
                ]
            })
            .collect();
        table_lines(
            &["Model", "Provider", "Input", "Output", "Cached", "Input $", "Output $", "Total $"],
            &rows,
            &theme,
        )
    };
    render_panel(
        &format!("Cost estimates ({})", report.results.len()),
        lines,
        &theme,
        no_color,
    )
}

// =============================================================================
// Config and chat
// =============================================================================

/// Render the resolved configuration with value sources.
#[must_use]
pub fn render_config(report: &ConfigReport, no_color: bool) -> String {
    let theme = create_default_theme();
    let rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .map(|e| vec![e.key.clone(), e.value.clone(), e.source.to_string()])
        .collect();
    let mut lines = table_lines(&["Key", "Value", "Source"], &rows, &theme);
    lines.push(Vec::new());
    let status = if report.config_exists {
        ""
    } else {
        " (not found)"
    };
    lines.push(note(&format!("Config file: {}{status}", report.config_path), &theme));
    render_panel("Configuration", lines, &theme, no_color)
}

/// Running totals for a chat session.
#[must_use]
pub fn render_session_stats(stats: &SessionStats, no_color: bool) -> String {
    let theme = create_default_theme();
    let lines = key_value_lines(
        &[
            ("Messages", stats.messages.to_string()),
            ("Tokens", format_tokens(stats.total_tokens)),
            ("Cost", format_cost(stats.total_cost)),
        ],
        &theme,
    );
    render_panel("Session", lines, &theme, no_color)
}
