//! Chat session state: history, slash commands, running token and cost totals.

use serde::Serialize;

use crate::core::catalog::Model;
use crate::core::completion::{ChatMessage, CompletionClient, CompletionRequest, Role, Usage};
use crate::core::pricing::ModelPricing;
use crate::error::Result;

/// Slash commands understood inside a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Clear,
    Cost,
    Quit,
    Help,
    Unknown(String),
}

impl SessionCommand {
    /// Commands and their one-line descriptions, for `/help`.
    pub const HELP: &'static [(&'static str, &'static str)] = &[
        ("/clear", "Clear conversation history"),
        ("/cost", "Show current session cost"),
        ("/help", "Show this help"),
        ("/quit", "Exit the chat"),
    ];

    fn parse(command: &str) -> Self {
        match command.to_lowercase().as_str() {
            "/clear" => Self::Clear,
            "/cost" => Self::Cost,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/help" => Self::Help,
            _ => Self::Unknown(command.to_string()),
        }
    }
}

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Empty,
    Command(SessionCommand),
    Message(String),
}

impl SessionInput {
    #[must_use]
    pub fn classify(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Self::Empty
        } else if line.starts_with('/') {
            Self::Command(SessionCommand::parse(line))
        } else {
            Self::Message(line.to_string())
        }
    }
}

/// Snapshot for `/cost` and the exit summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub messages: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
}

/// Result of one successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    pub usage: Usage,
    pub cost: f64,
}

/// A conversation with one model.
#[derive(Debug, Clone)]
pub struct ChatSession {
    model: Model,
    pricing: ModelPricing,
    max_tokens: Option<u64>,
    messages: Vec<ChatMessage>,
    total_tokens: u64,
    total_cost: f64,
}

impl ChatSession {
    /// Start a session. `max_tokens` of `None` or zero falls back to the
    /// model's default, and a model default of zero sends no limit.
    #[must_use]
    pub fn new(model: Model, system_prompt: Option<&str>, max_tokens: Option<u64>) -> Self {
        let max_tokens = max_tokens
            .filter(|&n| n > 0)
            .or_else(|| (model.default_max_tokens > 0).then_some(model.default_max_tokens));
        let messages = system_prompt
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| vec![ChatMessage::new(Role::System, s)])
            .unwrap_or_default();
        Self {
            pricing: ModelPricing::from(&model),
            model,
            max_tokens,
            messages,
            total_tokens: 0,
            total_cost: 0.0,
        }
    }

    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }

    #[must_use]
    pub const fn max_tokens(&self) -> Option<u64> {
        self.max_tokens
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            messages: self.messages.len(),
            total_tokens: self.total_tokens,
            total_cost: self.total_cost,
        }
    }

    /// Drop history, keeping a leading system message if there is one.
    /// Totals are not reset.
    pub fn clear(&mut self) {
        let keep = usize::from(
            self.messages
                .first()
                .is_some_and(|m| m.role == Role::System),
        );
        self.messages.truncate(keep);
    }

    /// Send `text` and record the reply.
    ///
    /// The user message is appended before the call and removed again if the
    /// call fails, so a failed turn leaves history and totals untouched.
    ///
    /// # Errors
    ///
    /// Returns the client's error (`RemoteCallFailure`, `Timeout`).
    pub async fn exchange(
        &mut self,
        client: &dyn CompletionClient,
        text: &str,
    ) -> Result<TurnOutcome> {
        self.messages.push(ChatMessage::new(Role::User, text));

        let request = CompletionRequest {
            model: &self.model.id,
            messages: &self.messages,
            max_tokens: self.max_tokens,
        };
        let result = client.complete(request).await;
        let completion = match result {
            Ok(c) => c,
            Err(e) => {
                self.messages.pop();
                tracing::debug!(error = %e, "Completion failed, user message rolled back");
                return Err(e);
            }
        };

        let usage = completion.usage;
        let cost = self
            .pricing
            .turn_cost(usage.prompt_tokens, usage.completion_tokens);
        self.messages
            .push(ChatMessage::new(Role::Assistant, completion.content.clone()));
        self.total_tokens = self.total_tokens.saturating_add(usage.total());
        self.total_cost += cost;

        Ok(TurnOutcome {
            reply: completion.content,
            usage,
            cost,
        })
    }
}
