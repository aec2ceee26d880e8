//! Error rendering.
//!
//! Robot formats get the JSON failure envelope. Human output gets a rich
//! panel with fix suggestions when stderr is an interactive terminal, and a
//! two-line `Error [code]: message` / `Fix: command` form otherwise.

use crate::cli::args::OutputFormat;
use crate::core::models::RobotOutput;
use crate::error::{FixSuggestion, McatError};
use crate::rich::{ThemeConfig, create_default_theme, segments_to_string, should_use_rich_output};
use rich_rust::prelude::*;
use rich_rust::Segment;

const WRAP_WIDTH: usize = 60;
const PANEL_WIDTH: usize = 70;

/// Render a fatal error for `command` in the requested format.
#[must_use]
pub fn render_error(
    command: &str,
    error: &McatError,
    format: OutputFormat,
    no_color: bool,
    pretty: bool,
) -> String {
    if format.is_robot() {
        return render_error_json(command, error, pretty || format == OutputFormat::Md);
    }

    // should_use_rich_output looks at stdout; errors go to stderr
    let use_rich = should_use_rich_output(format, no_color) && crate::util::env::stderr_is_tty();
    if use_rich {
        render_rich(error)
    } else {
        render_simple(error)
    }
}

/// The failure envelope as JSON.
#[must_use]
pub fn render_error_json(command: &str, error: &McatError, pretty: bool) -> String {
    let envelope = RobotOutput::failure(command, error);
    let json = if pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    };
    json.unwrap_or_else(|_| render_simple(error))
}

// =============================================================================
// Rich
// =============================================================================

fn render_rich(error: &McatError) -> String {
    let theme = create_default_theme();
    let suggestions = error.fix_suggestions();

    let mut lines: Vec<Vec<Segment<'static>>> = vec![
        vec![
            Segment::styled(error.to_string(), theme.error.clone()),
            Segment::styled(format!(" [{}]", error.error_code()), theme.muted.clone()),
        ],
        Vec::new(),
    ];

    if !suggestions.is_empty() {
        lines.extend(suggestions_section(&suggestions, &theme));
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            lines.push(Vec::new());
            lines.extend(text_section("Why this happened:", &first.context, &theme.secondary));
        }
        if let Some(prevention) = &first.prevention {
            lines.push(Vec::new());
            lines.extend(text_section("Prevention:", prevention, &theme.success));
        }
    }

    let panel = Panel::new(lines)
        .title(Text::new(error.category().description()))
        .border_style(theme.panel_error_border.clone())
        .padding((1, 2));
    segments_to_string(&panel.render(PANEL_WIDTH), false)
}

fn suggestions_section(
    suggestions: &[FixSuggestion],
    theme: &ThemeConfig,
) -> Vec<Vec<Segment<'static>>> {
    let mut lines = vec![vec![Segment::styled(
        "How to fix:".to_string(),
        theme.primary.clone(),
    )]];
    for (i, suggestion) in suggestions.iter().enumerate() {
        for (j, cmd) in suggestion.commands.iter().enumerate() {
            let prefix = if j == 0 {
                format!("  {}. ", i + 1)
            } else {
                "     Or: ".to_string()
            };
            lines.push(vec![
                Segment::plain(prefix),
                Segment::styled(cmd.clone(), theme.score.clone()),
            ]);
        }
    }
    lines
}

fn text_section(header: &str, body: &str, style: &Style) -> Vec<Vec<Segment<'static>>> {
    let mut lines = vec![vec![Segment::styled(header.to_string(), style.clone())]];
    lines.extend(
        wrap_text(body, WRAP_WIDTH)
            .into_iter()
            .map(|l| vec![Segment::plain(format!("  {l}"))]),
    );
    lines
}

// =============================================================================
// Simple
// =============================================================================

fn render_simple(error: &McatError) -> String {
    let mut lines = vec![format!("Error [{}]: {}", error.error_code(), error)];

    let fix = error
        .fix_suggestions()
        .into_iter()
        .flat_map(|s| s.commands)
        .find(|cmd| !cmd.starts_with('#'));
    if let Some(cmd) = fix {
        lines.push(format!("Fix: {cmd}"));
    }

    lines.join("\n")
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
