//! Fix suggestion database for mcat errors.
//!
//! Maps each error kind to copy-paste commands, a short explanation of the
//! failure, and an optional prevention tip.

// =============================================================================
// Fix Suggestion Types
// =============================================================================

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct FixSuggestion {
    /// Primary fix commands in order of preference.
    /// These should be copy-paste ready for the terminal.
    pub commands: Vec<String>,

    /// Explanation of why this error occurred.
    pub context: String,

    /// Tips to prevent this error in the future.
    pub prevention: Option<String>,
}

impl FixSuggestion {
    /// Creates a new fix suggestion with required fields.
    #[must_use]
    pub fn new(commands: Vec<String>, context: impl Into<String>) -> Self {
        Self {
            commands,
            context: context.into(),
            prevention: None,
        }
    }

    /// Builder: adds prevention tips.
    #[must_use]
    pub fn with_prevention(mut self, prevention: impl Into<String>) -> Self {
        self.prevention = Some(prevention.into());
        self
    }
}

// =============================================================================
// Lookup
// =============================================================================

/// Suggestions for a model query that matched nothing.
#[must_use]
pub fn model_not_found_suggestions(query: &str, provider: Option<&str>) -> Vec<FixSuggestion> {
    let mut commands = vec!["mcat find --limit 50".to_string()];
    if let Some(p) = provider {
        commands.insert(0, format!("mcat models --provider {p}"));
    }
    let scope = provider.map_or(String::new(), |p| format!(" within provider {p}"));
    vec![
        FixSuggestion::new(
            commands,
            format!(
                "No model id equals '{query}' and no model name contains it{scope}. \
                 Lookup is case-insensitive and matches substrings of display names."
            ),
        )
        .with_prevention("Use the exact model id shown by `mcat models` when scripting."),
    ]
}

/// Suggestions for an unknown provider id.
#[must_use]
pub fn provider_not_found_suggestions(id: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["mcat providers".to_string()],
        format!("The catalog has no provider with id '{id}'."),
    )]
}

// =============================================================================
// Input
// =============================================================================

/// Suggestions for a cost scenario that failed validation.
#[must_use]
pub fn invalid_scenario_suggestions(index: Option<usize>, reason: &str) -> Vec<FixSuggestion> {
    let location = index.map_or_else(
        || "The scenario".to_string(),
        |i| format!("Batch entry #{}", i + 1),
    );
    vec![
        FixSuggestion::new(
            vec!["mcat cost --help".to_string()],
            format!("{location} was rejected: {reason}."),
        )
        .with_prevention(
            "Each batch record needs model, input_tokens, output_tokens and an optional \
             cached_ratio between 0 and 1.",
        ),
    ]
}

/// Suggestions for a format or sort key the command does not support.
#[must_use]
pub fn unsupported_output_mode_suggestions(command: &str, mode: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec![format!("mcat {command} --help")],
        format!("`{command}` cannot produce '{mode}' output."),
    )]
}

/// Suggestions for a missing required argument.
#[must_use]
pub fn missing_argument_suggestions(name: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["mcat --help".to_string()],
        format!("The command needs {name} to run."),
    )]
}

// =============================================================================
// Network
// =============================================================================

/// Suggestions when the catalog could not be fetched.
#[must_use]
pub fn catalog_unavailable_suggestions(location: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                format!("curl -i {location}/v2/providers"),
                "export CATWALK_URL=<catalog-url>".to_string(),
                "mcat --catalog-file providers.json providers".to_string(),
            ],
            format!("The model catalog at {location} could not be loaded."),
        )
        .with_prevention("Keep a local copy of the catalog and pass it with --catalog-file."),
    ]
}

/// Suggestions for a failed completion call.
#[must_use]
pub fn remote_call_failure_suggestions(
    provider: &str,
    status_code: Option<u16>,
) -> Vec<FixSuggestion> {
    let context = match status_code {
        Some(401 | 403) => format!("{provider} rejected the API key."),
        Some(429) => format!("{provider} is rate limiting requests."),
        Some(code) if code >= 500 => format!("{provider} returned a server error ({code})."),
        Some(code) => format!("{provider} returned HTTP {code}."),
        None => format!("The request to {provider} did not complete."),
    };
    vec![FixSuggestion::new(
        vec![format!("mcat chat --provider {provider} --debug")],
        context,
    )]
}

/// Suggestions for a timed-out request.
#[must_use]
pub fn timeout_suggestions(target: &str, seconds: u64) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![format!("MCAT_TIMEOUT={} mcat providers", seconds * 2)],
            format!("The {target} did not respond within {seconds}s."),
        )
        .with_prevention("Raise catalog.timeout_secs in the config file."),
    ]
}

// =============================================================================
// Configuration
// =============================================================================

/// Suggestions for a config file with a syntax error.
#[must_use]
pub fn config_parse_suggestions(path: &str, line: Option<usize>) -> Vec<FixSuggestion> {
    let line_info = line.map_or(String::new(), |l| format!(" on line {l}"));
    vec![
        FixSuggestion::new(
            vec![format!("$EDITOR {path}"), "mcat config".to_string()],
            format!("The config file has a syntax error{line_info}."),
        )
        .with_prevention("Run `mcat config` after editing to check the resolved values."),
    ]
}

/// Suggestions for a config value that failed validation.
#[must_use]
pub fn config_invalid_suggestions(key: &str, value: &str) -> Vec<FixSuggestion> {
    vec![FixSuggestion::new(
        vec!["mcat config".to_string()],
        format!("'{value}' is not a valid value for {key}."),
    )]
}

/// Suggestions when no API key could be resolved.
#[must_use]
pub fn missing_api_key_suggestions(provider: &str, env_var: &str) -> Vec<FixSuggestion> {
    vec![
        FixSuggestion::new(
            vec![
                format!("export {env_var}=<key>"),
                format!("mcat chat --provider {provider} --api-key <key>"),
            ],
            format!("No key was passed with --api-key, {env_var} is unset, and the catalog has none for {provider}."),
        ),
    ]
}
