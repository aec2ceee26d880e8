//! Rich output gates and theme, wrapping `rich_rust`.
//!
//! Output is frequently consumed by scripts and agents, so styled output is
//! only produced when every gate in [`should_use_rich_output`] passes. Text
//! that originates from the network (catalog names, model replies) is run
//! through [`sanitize`] before it reaches the terminal.

use std::sync::LazyLock;

use regex::Regex;
pub use rich_rust::prelude::*;
use rich_rust::{ColorSystem, Segment};

use crate::cli::args::OutputFormat;
use crate::util::env as env_util;

const PLAIN_ENV: &str = "MCAT_PLAIN";

// =============================================================================
// Theme
// =============================================================================

/// Styles used across human output.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub primary: Style,
    pub secondary: Style,
    pub success: Style,
    pub error: Style,
    pub muted: Style,
    pub table_header: Style,
    pub panel_border: Style,
    pub panel_error_border: Style,
    pub cost: Style,
    pub score: Style,
    provider_anthropic: Style,
    provider_openai: Style,
    provider_google: Style,
    provider_other: Style,
}

impl ThemeConfig {
    /// Brand-ish style for a provider id or name.
    #[must_use]
    pub fn provider_style(&self, name: &str) -> &Style {
        let lower = name.to_lowercase();
        if lower.contains("anthropic") || lower.contains("claude") {
            &self.provider_anthropic
        } else if lower.contains("openai") || lower.contains("azure") {
            &self.provider_openai
        } else if lower.contains("google") || lower.contains("gemini") || lower.contains("vertex") {
            &self.provider_google
        } else {
            &self.provider_other
        }
    }
}

/// Style with the named color, or unstyled if the name does not parse.
#[must_use]
pub fn color_style(name: &str) -> Style {
    Color::parse(name).map_or_else(|_| Style::new(), |c| Style::new().color(c))
}

/// The default theme.
#[must_use]
pub fn create_default_theme() -> ThemeConfig {
    ThemeConfig {
        primary: color_style("cyan").bold(),
        secondary: color_style("magenta"),
        success: color_style("green"),
        error: color_style("red").bold(),
        muted: Style::new().dim(),
        table_header: Style::new().bold(),
        panel_border: color_style("blue"),
        panel_error_border: color_style("red"),
        cost: color_style("green"),
        score: color_style("cyan"),
        provider_anthropic: color_style("#d97757"),
        provider_openai: color_style("#10a37f"),
        provider_google: color_style("#4285f4"),
        provider_other: color_style("white"),
    }
}

// =============================================================================
// Safety gates
// =============================================================================

/// Decide whether rich (styled) output should be used.
///
/// Rich output is disabled when any of the following hold:
/// 1. format is not human
/// 2. `--no-color` (or a config/env equivalent) is set
/// 3. `NO_COLOR` env var is set (any value, per <https://no-color.org/>)
/// 4. `MCAT_PLAIN` env var is set
/// 5. stdout is not a TTY
/// 6. `TERM=dumb`
/// 7. `CI` or `GITHUB_ACTIONS` is set
#[must_use]
pub fn should_use_rich_output(format: OutputFormat, no_color: bool) -> bool {
    let disabled_by = if format != OutputFormat::Human {
        Some("robot_mode")
    } else if no_color {
        Some("no_color")
    } else if std::env::var_os("NO_COLOR").is_some() {
        Some("no_color_env")
    } else if std::env::var_os(PLAIN_ENV).is_some() {
        Some("plain_env")
    } else if !env_util::stdout_is_tty() {
        Some("not_tty")
    } else if std::env::var("TERM").is_ok_and(|t| t == "dumb") {
        Some("term_dumb")
    } else if std::env::var_os("CI").is_some() || std::env::var_os("GITHUB_ACTIONS").is_some() {
        Some("ci_environment")
    } else {
        None
    };

    match disabled_by {
        Some(reason) => {
            tracing::debug!(reason, decision = "disabled", "Rich output disabled");
            false
        }
        None => {
            tracing::debug!(decision = "enabled", "Rich output enabled");
            true
        }
    }
}

// =============================================================================
// Text helpers
// =============================================================================

static ANSI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(\x07|\x1b\\)").unwrap());

/// Remove terminal escape sequences and other control characters, keeping
/// newlines and tabs.
#[must_use]
pub fn sanitize(text: &str) -> String {
    ANSI_REGEX
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

/// Render segments to a string, with ANSI styling unless `no_color`.
#[must_use]
pub fn segments_to_string(segments: &[Segment<'_>], no_color: bool) -> String {
    segments
        .iter()
        .map(|seg| match &seg.style {
            Some(style) if !no_color => style.render(&seg.text, ColorSystem::TrueColor),
            _ => seg.text.to_string(),
        })
        .collect()
}
