//! Error types for mcat.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into five main categories:
//! - **Lookup**: A model or provider token matched nothing in the catalog
//! - **Input**: Malformed cost scenarios, unknown output modes, missing arguments
//! - **Network**: Catalog fetches and completion calls that failed or timed out
//! - **Configuration**: Config file parsing, validation, or missing API keys
//! - **Internal**: I/O, serialization, or unclassified failures
//!
//! Each error has a stable error code (e.g., `MCAT-L001`) for programmatic handling.
//!
//! ## Fix Suggestions
//!
//! Each error type can provide actionable fix suggestions via the
//! [`McatError::fix_suggestions()`] method.

pub mod suggestions;

use thiserror::Error;

pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A lookup token did not resolve to a model or provider.
    Lookup,
    /// User-supplied input failed validation.
    Input,
    /// Catalog or completion endpoint failures.
    Network,
    /// Configuration issues (parse errors, invalid values, missing keys).
    Configuration,
    /// Internal errors (I/O, serialization, unexpected state).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Lookup => "Lookup error",
            Self::Input => "Input error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Lookup => "L",
            Self::Input => "I",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Model or provider not found
    NotFound = 2,
    /// Invalid input: bad scenario, unknown format, missing argument
    InvalidInput = 3,
    /// Catalog or remote endpoint unreachable, or timed out
    Network = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for mcat operations.
///
/// Each variant has:
/// - A stable error code (e.g., `MCAT-L001`)
/// - A category for classification
/// - A retryable flag for retry logic
#[derive(Error, Debug)]
pub enum McatError {
    // ==========================================================================
    // Lookup errors (Category: Lookup)
    // ==========================================================================
    /// No model id or display name matched the query.
    #[error("model not found: {query}")]
    ModelNotFound {
        query: String,
        /// Provider the search was restricted to, if any.
        provider: Option<String>,
    },

    /// No provider id matched.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    // ==========================================================================
    // Input errors (Category: Input)
    // ==========================================================================
    /// Cost scenario failed validation.
    #[error("invalid scenario{}: {reason}", .index.map(|i| format!(" #{}", i + 1)).unwrap_or_default())]
    InvalidScenario {
        /// Zero-based position in the batch, when the scenario came from one.
        index: Option<usize>,
        reason: String,
    },

    /// Requested output format or sort key is not supported by the command.
    #[error("unsupported output mode for {command}: {mode}")]
    UnsupportedOutputMode { command: String, mode: String },

    /// A required argument was not supplied.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Catalog could not be fetched or decoded.
    #[error("catalog unavailable at {location}: {reason}")]
    CatalogUnavailable { location: String, reason: String },

    /// Completion endpoint call failed.
    #[error("remote call to {provider} failed: {message}")]
    RemoteCallFailure {
        provider: String,
        status_code: Option<u16>,
        message: String,
    },

    /// Request exceeded the configured timeout.
    #[error("request to {target} timed out after {seconds} seconds")]
    Timeout { target: String, seconds: u64 },

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Config file could not be parsed.
    #[error("failed to parse config at {path}: {message}")]
    ConfigParse {
        path: String,
        line: Option<usize>,
        message: String,
    },

    /// Config value failed validation.
    #[error("invalid config value for {key}: {reason}")]
    ConfigInvalid {
        key: String,
        value: String,
        reason: String,
    },

    /// No API key could be resolved for a provider.
    #[error("no API key found for {provider}")]
    MissingApiKey { provider: String, env_var: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    // ==========================================================================
    // Internal errors (Category: Internal)
    // ==========================================================================
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl McatError {
    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::ModelNotFound { .. } | Self::ProviderNotFound(_) => ExitCode::NotFound,
            Self::InvalidScenario { .. }
            | Self::UnsupportedOutputMode { .. }
            | Self::MissingArgument(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. } => ExitCode::InvalidInput,
            Self::CatalogUnavailable { .. }
            | Self::RemoteCallFailure { .. }
            | Self::Timeout { .. } => ExitCode::Network,
            Self::MissingApiKey { .. }
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ModelNotFound { .. } | Self::ProviderNotFound(_) => ErrorCategory::Lookup,
            Self::InvalidScenario { .. }
            | Self::UnsupportedOutputMode { .. }
            | Self::MissingArgument(_) => ErrorCategory::Input,
            Self::CatalogUnavailable { .. }
            | Self::RemoteCallFailure { .. }
            | Self::Timeout { .. } => ErrorCategory::Network,
            Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::MissingApiKey { .. }
            | Self::Config(_) => ErrorCategory::Configuration,
            Self::Io(_) | Self::Json(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ModelNotFound { .. } => "MCAT-L001",
            Self::ProviderNotFound(_) => "MCAT-L002",

            Self::InvalidScenario { .. } => "MCAT-I001",
            Self::UnsupportedOutputMode { .. } => "MCAT-I002",
            Self::MissingArgument(_) => "MCAT-I003",

            Self::CatalogUnavailable { .. } => "MCAT-N001",
            Self::RemoteCallFailure { .. } => "MCAT-N002",
            Self::Timeout { .. } => "MCAT-N003",

            Self::ConfigParse { .. } => "MCAT-C001",
            Self::ConfigInvalid { .. } => "MCAT-C002",
            Self::MissingApiKey { .. } => "MCAT-C003",
            Self::Config(_) => "MCAT-C004",

            Self::Io(_) => "MCAT-X001",
            Self::Json(_) => "MCAT-X002",
            Self::Other(_) => "MCAT-X003",
        }
    }

    /// Returns true if retrying the same operation might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::CatalogUnavailable { .. } | Self::Timeout { .. } => true,
            Self::RemoteCallFailure { status_code, .. } => match status_code {
                Some(code) => *code == 429 || *code >= 500,
                None => true,
            },
            _ => false,
        }
    }

    /// Returns the provider id if this error is provider-specific.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ModelNotFound { provider, .. } => provider.as_deref(),
            Self::ProviderNotFound(p) => Some(p),
            Self::RemoteCallFailure { provider, .. } | Self::MissingApiKey { provider, .. } => {
                Some(provider)
            }
            _ => None,
        }
    }

    /// Returns true if this is a lookup miss that batch operations may skip.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ModelNotFound { .. } | Self::ProviderNotFound(_))
    }

    /// Returns actionable fix suggestions for this error.
    ///
    /// # Example
    ///
    /// ```
    /// use mcat::error::McatError;
    ///
    /// let err = McatError::ProviderNotFound("openai".to_string());
    /// let suggestions = err.fix_suggestions();
    /// assert!(!suggestions.is_empty());
    /// ```
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::ModelNotFound { query, provider } => {
                suggestions::model_not_found_suggestions(query, provider.as_deref())
            }
            Self::ProviderNotFound(id) => suggestions::provider_not_found_suggestions(id),

            Self::InvalidScenario { index, reason } => {
                suggestions::invalid_scenario_suggestions(*index, reason)
            }
            Self::UnsupportedOutputMode { command, mode } => {
                suggestions::unsupported_output_mode_suggestions(command, mode)
            }
            Self::MissingArgument(name) => suggestions::missing_argument_suggestions(name),

            Self::CatalogUnavailable { location, .. } => {
                suggestions::catalog_unavailable_suggestions(location)
            }
            Self::RemoteCallFailure {
                provider,
                status_code,
                ..
            } => suggestions::remote_call_failure_suggestions(provider, *status_code),
            Self::Timeout { target, seconds } => suggestions::timeout_suggestions(target, *seconds),

            Self::ConfigParse { path, line, .. } => {
                suggestions::config_parse_suggestions(path, *line)
            }
            Self::ConfigInvalid { key, value, .. } => {
                suggestions::config_invalid_suggestions(key, value)
            }
            Self::MissingApiKey { provider, env_var } => {
                suggestions::missing_api_key_suggestions(provider, env_var)
            }
            Self::Config(msg) => vec![FixSuggestion::new(
                vec!["mcat config".to_string()],
                format!("Configuration problem: {msg}"),
            )],

            Self::Io(e) => vec![FixSuggestion::new(
                vec![],
                format!("I/O error: {e}. Check file paths and permissions."),
            )],
            Self::Json(e) => vec![FixSuggestion::new(
                vec![],
                format!("JSON error: {e}. The input or catalog payload is malformed."),
            )],
            Self::Other(_) => vec![],
        }
    }
}

/// Result type alias for mcat operations.
pub type Result<T> = std::result::Result<T, McatError>;
