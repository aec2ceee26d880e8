//! OpenAI-compatible chat completion client.
//!
//! Every catalog provider exposes (or is proxied behind) the
//! `POST {endpoint}/chat/completions` shape, so one client serves all of them.
//! The provider's default headers are sent on every request.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::core::catalog::Provider;
use crate::core::http::{COMPLETION_TIMEOUT, build_client, map_send_error};
use crate::error::{McatError, Result};

/// Boxed future returned by completion clients.
pub type CompletionFuture<'a> = Pin<Box<dyn Future<Output = Result<Completion>> + Send + 'a>>;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl Usage {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// The first choice of a completion plus usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Usage,
}

/// Anything that can answer a chat request.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> CompletionFuture<'a>;
}

// Wire format

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for one provider endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    provider_id: String,
    endpoint: String,
    api_key: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl OpenAiCompatibleClient {
    /// Build a client for `provider` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be built or a default
    /// header from the catalog is not a valid HTTP header.
    pub fn new(provider: &Provider, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(provider, api_key, COMPLETION_TIMEOUT)
    }

    /// Same as [`Self::new`] with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_timeout(
        provider: &Provider,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            provider_id: provider.id.clone(),
            endpoint: provider.api_endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            headers: header_map(&provider.default_headers)?,
            timeout,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    async fn send(&self, request: CompletionRequest<'_>) -> Result<Completion> {
        let url = self.url();
        tracing::debug!(provider = %self.provider_id, url = %url, model = request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                map_send_error(&e, &self.provider_id, self.timeout, |message| {
                    McatError::RemoteCallFailure {
                        provider: self.provider_id.clone(),
                        status_code: None,
                        message,
                    }
                })
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| McatError::RemoteCallFailure {
            provider: self.provider_id.clone(),
            status_code: Some(status.as_u16()),
            message: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(McatError::RemoteCallFailure {
                provider: self.provider_id.clone(),
                status_code: Some(status.as_u16()),
                message: error_message(&body),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| McatError::RemoteCallFailure {
                provider: self.provider_id.clone(),
                status_code: Some(status.as_u16()),
                message: format!("invalid completion payload: {e}"),
            })?;

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Err(McatError::RemoteCallFailure {
                provider: self.provider_id.clone(),
                status_code: Some(status.as_u16()),
                message: "no response from model".to_string(),
            });
        };

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            usage: parsed.usage,
        })
    }
}

impl CompletionClient for OpenAiCompatibleClient {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> CompletionFuture<'a> {
        Box::pin(self.send(request))
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| McatError::Config(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| McatError::Config(format!("invalid value for header {name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Pull `error.message` out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

// =============================================================================
// API keys
// =============================================================================

/// Environment variable consulted for a provider's key.
#[must_use]
pub fn api_key_env_var(provider_id: &str) -> String {
    match provider_id {
        "openai" => "OPENAI_API_KEY".to_string(),
        "anthropic" => "ANTHROPIC_API_KEY".to_string(),
        "gemini" => "GEMINI_API_KEY".to_string(),
        "xai" => "XAI_API_KEY".to_string(),
        "groq" => "GROQ_API_KEY".to_string(),
        "openrouter" => "OPENROUTER_API_KEY".to_string(),
        "cerebras" => "CEREBRAS_API_KEY".to_string(),
        "huggingface" => "HUGGINGFACE_API_KEY".to_string(),
        "vercel" => "VERCEL_API_KEY".to_string(),
        other => format!("{}_API_KEY", other.to_uppercase().replace('-', "_")),
    }
}

/// Resolve the key to use: explicit flag, then environment, then catalog.
///
/// A catalog key of the form `$NAME` is a placeholder and is looked up in
/// the environment too. `env` is injected so callers and tests control
/// lookup.
///
/// # Errors
///
/// Returns `MissingApiKey` if no source yields a non-empty key.
pub fn resolve_api_key(
    flag: Option<&str>,
    provider: &Provider,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    let env_var = api_key_env_var(&provider.id);
    let non_empty = |s: String| (!s.trim().is_empty()).then_some(s);

    if let Some(key) = flag.map(str::to_string).and_then(non_empty) {
        return Ok(key);
    }
    if let Some(key) = env(&env_var).and_then(non_empty) {
        return Ok(key);
    }
    let configured = provider.api_key.trim();
    let from_catalog = match configured.strip_prefix('$') {
        Some(name) => env(name.trim_start_matches('{').trim_end_matches('}')),
        None => Some(configured.to_string()),
    };
    from_catalog
        .and_then(non_empty)
        .ok_or_else(|| McatError::MissingApiKey {
            provider: provider.id.clone(),
            env_var,
        })
}

/// `sk-a...wxyz` style masking for debug output.
#[must_use]
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_test_provider;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn usage_total_saturates() {
        let usage = Usage {
            prompt_tokens: u64::MAX - 1,
            completion_tokens: 10,
        };
        assert_eq!(usage.total(), u64::MAX);
    }

    #[test]
    fn env_var_names() {
        assert_eq!(api_key_env_var("openai"), "OPENAI_API_KEY");
        assert_eq!(api_key_env_var("huggingface"), "HUGGINGFACE_API_KEY");
        assert_eq!(api_key_env_var("deepseek"), "DEEPSEEK_API_KEY");
        assert_eq!(api_key_env_var("azure-openai"), "AZURE_OPENAI_API_KEY");
    }

    #[test]
    fn flag_wins_over_env_and_catalog() {
        let mut provider = make_test_provider("openai", vec![]);
        provider.api_key = "catalog-key".to_string();
        let env = |name: &str| (name == "OPENAI_API_KEY").then(|| "env-key".to_string());

        assert_eq!(resolve_api_key(Some("flag-key"), &provider, env).unwrap(), "flag-key");
        assert_eq!(resolve_api_key(None, &provider, env).unwrap(), "env-key");
        assert_eq!(resolve_api_key(Some(""), &provider, no_env).unwrap(), "catalog-key");
    }

    #[test]
    fn catalog_placeholder_expands_from_env() {
        let mut provider = make_test_provider("custom", vec![]);
        provider.api_key = "$MY_GATEWAY_KEY".to_string();
        let env = |name: &str| (name == "MY_GATEWAY_KEY").then(|| "gw".to_string());
        assert_eq!(resolve_api_key(None, &provider, env).unwrap(), "gw");

        let err = resolve_api_key(None, &provider, no_env).unwrap_err();
        assert!(matches!(
            err,
            McatError::MissingApiKey { ref env_var, .. } if env_var == "CUSTOM_API_KEY"
        ));
    }

    #[test]
    fn masks_keys() {
        assert_eq!(mask_key("sk-abcdefghijkl"), "sk-a...ijkl");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn extracts_error_messages() {
        assert_eq!(
            error_message(r#"{"error": {"message": "bad key", "type": "auth"}}"#),
            "bad key"
        );
        assert_eq!(error_message("  upstream down \n"), "upstream down");
        assert_eq!(error_message(""), "empty response body");
    }

    #[test]
    fn rejects_invalid_default_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(header_map(&headers).is_err());

        let mut headers = BTreeMap::new();
        headers.insert("X-Title".to_string(), "mcat".to_string());
        assert_eq!(header_map(&headers).unwrap().len(), 1);
    }

    #[test]
    fn request_omits_unset_max_tokens() {
        let messages = vec![ChatMessage::new(Role::User, "hi")];
        let body = serde_json::to_value(CompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: None,
        })
        .unwrap();
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }
}
