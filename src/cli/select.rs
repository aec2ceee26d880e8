//! Select command: drives the requirement wizard from the terminal.
//!
//! On an interactive terminal choices are picked with the arrow keys (or
//! digits) in raw mode. Otherwise each step reads one numbered answer per
//! line, so the wizard can be scripted through a pipe.

use std::io::{self, BufRead, Write};

use crossterm::QueueableCommand;
use crossterm::cursor::MoveUp;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};

use crate::cli::args::OutputFormat;
use crate::cli::{emit, render_options};
use crate::core::catalog::Catalog;
use crate::core::models::{MatchPayload, RankedModel};
use crate::core::wizard::{Choice, Wizard, WizardEvent, WizardState};
use crate::error::{McatError, Result};
use crate::render::{self, human};
use crate::storage::config::{DisplayLimits, ResolvedConfig};
use crate::util::env as env_util;

// =============================================================================
// Event sources
// =============================================================================

/// Produces one wizard event per call.
pub trait EventSource {
    /// Show the question for `state` on `out` and wait for an answer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if input cannot be read or prompts written.
    fn next_event<W: Write>(&mut self, state: WizardState, out: &mut W) -> Result<WizardEvent>;
}

/// Interpret one line of input for `state`. `None` means "ask again".
#[must_use]
pub fn parse_line(line: &str, state: WizardState) -> Option<WizardEvent> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Some(WizardEvent::Cancel);
    }
    if state == WizardState::ShowResults {
        return Some(WizardEvent::Confirm(0));
    }
    let n: usize = line.parse().ok()?;
    (1..=state.choices().len())
        .contains(&n)
        .then(|| WizardEvent::Confirm(n - 1))
}

/// Numbered answers read line by line.
pub struct LineEvents<R> {
    reader: R,
}

impl<R: BufRead> LineEvents<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> EventSource for LineEvents<R> {
    fn next_event<W: Write>(&mut self, state: WizardState, out: &mut W) -> Result<WizardEvent> {
        let choices = state.choices();
        if state != WizardState::ShowResults {
            writeln!(out, "\n{}", state.prompt())?;
            for (i, choice) in choices.iter().enumerate() {
                writeln!(out, "  {}. {}", i + 1, choice.label)?;
            }
        }

        loop {
            if state == WizardState::ShowResults {
                write!(out, "Press Enter to finish (q to cancel): ")?;
            } else {
                write!(out, "Choose 1-{} (q to cancel): ", choices.len())?;
            }
            out.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                // End of input accepts shown results and abandons anything earlier.
                writeln!(out)?;
                return Ok(if state == WizardState::ShowResults {
                    WizardEvent::Confirm(0)
                } else {
                    WizardEvent::Cancel
                });
            }
            if let Some(event) = parse_line(&line, state) {
                return Ok(event);
            }
            writeln!(out, "Please enter a number between 1 and {}.", choices.len())?;
        }
    }
}

/// Key action in the interactive picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Up,
    Down,
    Select,
    Cancel,
    /// Digit shortcut, zero-based.
    Pick(usize),
    None,
}

impl KeyAction {
    #[must_use]
    pub const fn from_key_event(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Cancel,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Self::Cancel,
            KeyCode::Up | KeyCode::Char('k') => Self::Up,
            KeyCode::Down | KeyCode::Char('j') => Self::Down,
            KeyCode::Enter | KeyCode::Char(' ') => Self::Select,
            KeyCode::Char(c @ '1'..='9') => Self::Pick((c as u32 - '1' as u32) as usize),
            _ => Self::None,
        }
    }
}

/// Restores cooked mode when dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!(error = %e, "Failed to restore terminal mode");
        }
    }
}

fn read_action() -> Result<KeyAction> {
    loop {
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            return Ok(KeyAction::from_key_event(key));
        }
    }
}

fn draw_choices<W: Write>(out: &mut W, choices: &[Choice], cursor: usize) -> Result<()> {
    for (i, choice) in choices.iter().enumerate() {
        let marker = if i == cursor { ">" } else { " " };
        write!(out, "{marker} {}. {}\r\n", i + 1, choice.label)?;
    }
    out.flush()?;
    Ok(())
}

/// Arrow-key picker in raw mode.
pub struct KeyEvents;

impl EventSource for KeyEvents {
    fn next_event<W: Write>(&mut self, state: WizardState, out: &mut W) -> Result<WizardEvent> {
        if state == WizardState::ShowResults {
            write!(out, "Press Enter to finish (q to cancel)")?;
            out.flush()?;
            let _raw = RawMode::enable()?;
            loop {
                let event = match read_action()? {
                    KeyAction::Select => WizardEvent::Confirm(0),
                    KeyAction::Cancel => WizardEvent::Cancel,
                    _ => continue,
                };
                out.write_all(b"\r\n")?;
                return Ok(event);
            }
        }

        let choices = state.choices();
        let rows = u16::try_from(choices.len()).unwrap_or(u16::MAX);
        write!(out, "\r\n{}\r\n", state.prompt())?;
        let mut cursor = 0;
        draw_choices(out, choices, cursor)?;

        let _raw = RawMode::enable()?;
        loop {
            match read_action()? {
                KeyAction::Up => cursor = cursor.checked_sub(1).unwrap_or(choices.len() - 1),
                KeyAction::Down => cursor = (cursor + 1) % choices.len(),
                KeyAction::Select => return Ok(WizardEvent::Confirm(cursor)),
                KeyAction::Pick(i) if i < choices.len() => return Ok(WizardEvent::Confirm(i)),
                KeyAction::Cancel => return Ok(WizardEvent::Cancel),
                KeyAction::Pick(_) | KeyAction::None => continue,
            }
            out.queue(MoveUp(rows))?
                .queue(Clear(ClearType::FromCursorDown))?;
            draw_choices(out, choices, cursor)?;
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

/// The wizard's ranked results, truncated to `limit` rows.
#[must_use]
pub fn results_payload(wizard: &Wizard<'_>, limit: usize) -> Option<MatchPayload> {
    let ranked = wizard.results()?;
    Some(MatchPayload {
        requirements: *wizard.requirements(),
        total_matches: ranked.len(),
        results: RankedModel::from_candidates(ranked.top(limit)),
    })
}

/// Feed events to the wizard until it finishes or is cancelled.
///
/// The results screen (top `limits.preview`, with reasons for the first
/// `limits.detail`) is written to `out` before the final confirmation.
///
/// # Errors
///
/// Returns an I/O error from the event source or output.
pub fn drive<S: EventSource, W: Write>(
    wizard: &mut Wizard<'_>,
    source: &mut S,
    out: &mut W,
    limits: DisplayLimits,
    no_color: bool,
) -> Result<WizardState> {
    while !wizard.state().is_terminal() {
        let state = wizard.state();
        if state == WizardState::ShowResults
            && let Some(payload) = results_payload(wizard, limits.preview)
        {
            writeln!(out, "\n{}", human::render_matches(&payload, limits.detail, no_color))?;
        }
        let event = source.next_event(state, out)?;
        tracing::debug!(?state, ?event, "Wizard event");
        wizard.handle(event);
    }
    Ok(wizard.state())
}

/// Execute the select command.
pub fn execute(catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let opts = render_options(config, Some(catalog));
    let json = match config.format {
        OutputFormat::Human => false,
        OutputFormat::Json => true,
        other => {
            return Err(McatError::UnsupportedOutputMode {
                command: "select".to_string(),
                mode: other.as_str().to_string(),
            });
        }
    };

    // Prompts share stdout with human output; JSON keeps stdout clean.
    let (mut out, out_is_tty): (Box<dyn Write>, bool) = if json {
        (Box::new(io::stderr()), env_util::stderr_is_tty())
    } else {
        (Box::new(io::stdout()), env_util::stdout_is_tty())
    };
    let no_color = json || opts.no_color;

    let mut wizard = Wizard::new(catalog.entries());
    let state = if env_util::stdin_is_tty() && out_is_tty {
        drive(&mut wizard, &mut KeyEvents, &mut out, config.limits, no_color)?
    } else {
        let mut source = LineEvents::new(io::stdin().lock());
        drive(&mut wizard, &mut source, &mut out, config.limits, no_color)?
    };

    match state {
        WizardState::Finished if json => {
            if let Some(payload) = results_payload(&wizard, config.limits.preview) {
                emit(&render::render_matches("select", &payload, config.limits.detail, &opts)?)?;
            }
        }
        WizardState::Cancelled => {
            tracing::info!("Selection cancelled");
            writeln!(out, "Selection cancelled.")?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{Provider, entries};
    use crate::core::filter::Requirements;
    use crate::test_utils::{make_test_model, make_test_provider};
    use crate::{assert_contains, assert_float_eq};
    use std::io::Cursor;

    fn catalog() -> Vec<Provider> {
        let mut thinker = make_test_model("thinker", 0.4, 1.6, 200_000);
        thinker.can_reason = true;
        let mut seer = make_test_model("seer", 3.0, 12.0, 128_000);
        seer.can_reason = true;
        seer.supports_vision = true;
        vec![make_test_provider(
            "acme",
            vec![make_test_model("basic", 0.1, 0.2, 16_000), thinker, seer],
        )]
    }

    fn run(input: &str) -> (WizardState, Requirements, Option<MatchPayload>, String) {
        let providers = catalog();
        let mut wizard = Wizard::new(entries(&providers));
        let mut source = LineEvents::new(Cursor::new(input.to_string()));
        let mut out = Vec::new();
        let state = drive(
            &mut wizard,
            &mut source,
            &mut out,
            DisplayLimits::default(),
            true,
        )
        .unwrap();
        let payload = results_payload(&wizard, 5);
        (
            state,
            *wizard.requirements(),
            payload,
            String::from_utf8(out).unwrap(),
        )
    }

    #[test]
    fn scripted_answers_reach_results() {
        let (state, req, payload, out) = run("3\n3\n1\n2\n\n");
        assert_eq!(state, WizardState::Finished);
        assert_eq!(
            req,
            Requirements {
                budget: 1.0,
                min_context: 100_000,
                reasoning: true,
                vision: false,
            }
        );
        let payload = payload.unwrap();
        assert_eq!(payload.total_matches, 3);
        assert_eq!(payload.results[0].model_id, "thinker");
        // 100 + 30 (well under budget) + 20 (context) + 25 (reasoning)
        assert_float_eq!(payload.results[0].score, 175.0);
        assert_contains!(&out, "What's your budget?");
        assert_contains!(&out, "Top 3 of 3 matches");
    }

    #[test]
    fn q_cancels_without_results() {
        let (state, req, payload, _) = run("2\nq\n");
        assert_eq!(state, WizardState::Cancelled);
        assert_eq!(req, Requirements::default());
        assert!(payload.is_none());
    }

    #[test]
    fn end_of_input_before_results_cancels() {
        let (state, _, _, _) = run("1\n");
        assert_eq!(state, WizardState::Cancelled);
    }

    #[test]
    fn end_of_input_at_results_finishes() {
        let (state, _, payload, _) = run("1\n1\n2\n2\n");
        assert_eq!(state, WizardState::Finished);
        assert!(payload.is_some());
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (state, req, _, out) = run("9\nabc\n2\n1\n2\n2\n\n");
        assert_eq!(state, WizardState::Finished);
        assert_float_eq!(req.budget, 0.5);
        assert_contains!(&out, "Please enter a number between 1 and 6.");
    }

    #[test]
    fn line_parsing() {
        assert_eq!(parse_line(" Q ", WizardState::CollectBudget), Some(WizardEvent::Cancel));
        assert_eq!(parse_line("2", WizardState::CollectReasoning), Some(WizardEvent::Confirm(1)));
        assert_eq!(parse_line("3", WizardState::CollectReasoning), None);
        assert_eq!(parse_line("0", WizardState::CollectBudget), None);
        assert_eq!(parse_line("", WizardState::ShowResults), Some(WizardEvent::Confirm(0)));
    }

    #[test]
    fn key_mapping() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(KeyAction::from_key_event(key(KeyCode::Esc)), KeyAction::Cancel);
        assert_eq!(KeyAction::from_key_event(key(KeyCode::Char('3'))), KeyAction::Pick(2));
        assert_eq!(KeyAction::from_key_event(key(KeyCode::Enter)), KeyAction::Select);
        assert_eq!(
            KeyAction::from_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Cancel
        );
        assert_eq!(KeyAction::from_key_event(key(KeyCode::Char('x'))), KeyAction::None);
    }
}
