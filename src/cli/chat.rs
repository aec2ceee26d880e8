//! Chat command: an interactive session against an OpenAI-compatible endpoint.

use std::io::{self, BufRead, Write};

use crate::cli::args::{ChatArgs, OutputFormat};
use crate::cli::render_options;
use crate::core::catalog::{Catalog, Provider};
use crate::core::completion::{
    CompletionClient, OpenAiCompatibleClient, api_key_env_var, mask_key, resolve_api_key,
};
use crate::core::lookup::{find_provider, resolve_provider_model};
use crate::core::session::{ChatSession, SessionCommand, SessionInput};
use crate::error::{McatError, Result};
use crate::render::{error as error_render, human};
use crate::rich::{create_default_theme, sanitize, segments_to_string};
use crate::storage::config::ResolvedConfig;
use crate::util::format_cost;
use rich_rust::Segment;

/// Lines shown by `--debug` before the session starts.
#[must_use]
pub fn debug_lines(provider: &Provider, client: &OpenAiCompatibleClient, api_key: &str) -> Vec<String> {
    let mut lines = vec![
        format!("Endpoint: {}", client.url()),
        format!("API key:  {} (env: {})", mask_key(api_key), api_key_env_var(&provider.id)),
        format!("Type:     {}", provider.provider_type),
    ];
    if provider.default_headers.is_empty() {
        lines.push("Headers:  none".to_string());
    } else {
        lines.push("Headers:".to_string());
        lines.extend(
            provider
                .default_headers
                .iter()
                .map(|(k, v)| format!("  {k}: {v}")),
        );
    }
    lines
}

fn muted(text: String, no_color: bool) -> String {
    let theme = create_default_theme();
    segments_to_string(&[Segment::styled(text, theme.muted)], no_color)
}

/// Read lines from `input` until `/quit` or end of input.
///
/// A failed exchange is reported on `out` and leaves the session usable.
///
/// # Errors
///
/// Returns an I/O error if input cannot be read or output written.
pub async fn run_loop<R: BufRead, W: Write>(
    session: &mut ChatSession,
    client: &dyn CompletionClient,
    mut input: R,
    out: &mut W,
    no_color: bool,
) -> Result<()> {
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        match SessionInput::classify(&line) {
            SessionInput::Empty => {}
            SessionInput::Message(text) => match session.exchange(client, &text).await {
                Ok(turn) => {
                    writeln!(out, "\n{}\n", sanitize(&turn.reply))?;
                    let usage = format!(
                        "[{} tokens, {}]",
                        turn.usage.total(),
                        format_cost(turn.cost)
                    );
                    writeln!(out, "{}", muted(usage, no_color))?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Chat exchange failed");
                    writeln!(
                        out,
                        "{}",
                        error_render::render_error("chat", &e, OutputFormat::Human, true, false)
                    )?;
                }
            },
            SessionInput::Command(SessionCommand::Clear) => {
                session.clear();
                writeln!(out, "Conversation cleared.")?;
            }
            SessionInput::Command(SessionCommand::Cost) => {
                writeln!(out, "{}", human::render_session_stats(&session.stats(), no_color))?;
            }
            SessionInput::Command(SessionCommand::Help) => {
                for (command, description) in SessionCommand::HELP {
                    writeln!(out, "  {command:<8} {description}")?;
                }
            }
            SessionInput::Command(SessionCommand::Quit) => break,
            SessionInput::Command(SessionCommand::Unknown(command)) => {
                writeln!(out, "Unknown command: {command} (try /help)")?;
            }
        }
    }

    writeln!(out, "{}", human::render_session_stats(&session.stats(), no_color))?;
    Ok(())
}

/// Execute the chat command.
pub async fn execute(args: &ChatArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    if config.format != OutputFormat::Human {
        return Err(McatError::UnsupportedOutputMode {
            command: "chat".to_string(),
            mode: config.format.as_str().to_string(),
        });
    }
    let opts = render_options(config, Some(catalog));

    let provider = find_provider(&catalog.providers, &args.provider)?;
    let model = resolve_provider_model(provider, args.model.as_deref())?;
    let api_key = resolve_api_key(args.api_key.as_deref(), provider, |name| {
        std::env::var(name).ok()
    })?;
    let client = OpenAiCompatibleClient::new(provider, api_key.as_str())?;

    let mut stdout = io::stdout();
    if args.debug {
        for line in debug_lines(provider, &client, &api_key) {
            writeln!(stdout, "{}", muted(line, opts.no_color))?;
        }
    }

    let mut session = ChatSession::new(model.clone(), args.system.as_deref(), args.max_tokens);
    tracing::info!(
        provider = %provider.id,
        model = %model.id,
        max_tokens = ?session.max_tokens(),
        "Starting chat session"
    );
    writeln!(
        stdout,
        "Chatting with {} ({}). Type /help for commands, /quit to exit.",
        sanitize(&model.name),
        sanitize(&provider.name)
    )?;

    run_loop(&mut session, &client, io::stdin().lock(), &mut stdout, opts.no_color).await
}
