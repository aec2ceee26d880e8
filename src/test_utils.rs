//! Test utilities for mcat.
//!
//! Provides catalog factories, a temp directory helper, and assertion macros
//! for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcat::test_utils::*;
//!
//! let model = make_test_model("gpt-4o", 2.5, 10.0, 128_000);
//! let provider = make_test_provider("openai", vec![model]);
//! let dir = TestDir::new();
//! dir.create_file("config.toml", "[catalog]\ncache_ttl_secs = 60");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use crate::core::catalog::{Model, Provider};

// =============================================================================
// Catalog Factories
// =============================================================================

fn display_name(id: &str) -> String {
    let mut chars = id.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Create a test `Model` with the given pricing and context window.
///
/// The display name is the id with its first letter capitalized. Every
/// capability flag is off; tests switch on what they need.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::test_utils::make_test_model;
///
/// let mut model = make_test_model("o3", 2.0, 8.0, 200_000);
/// model.can_reason = true;
/// assert_eq!(model.name, "O3");
/// ```
#[must_use]
pub fn make_test_model(id: &str, cost_in: f64, cost_out: f64, context_window: u64) -> Model {
    Model {
        id: id.to_string(),
        name: display_name(id),
        cost_per_1m_in: cost_in,
        cost_per_1m_out: cost_out,
        cost_per_1m_in_cached: 0.0,
        cost_per_1m_out_cached: 0.0,
        context_window,
        default_max_tokens: 4096,
        can_reason: false,
        reasoning_levels: Vec::new(),
        default_reasoning_effort: None,
        supports_vision: false,
    }
}

/// Create a test OpenAI-compatible `Provider` owning `models`.
///
/// The endpoint is `https://api.{id}.test/v1` and no defaults are set.
#[must_use]
pub fn make_test_provider(id: &str, models: Vec<Model>) -> Provider {
    Provider {
        id: id.to_string(),
        name: display_name(id),
        provider_type: "openai".to_string(),
        api_endpoint: format!("https://api.{id}.test/v1"),
        api_key: String::new(),
        default_headers: BTreeMap::new(),
        default_large_model_id: String::new(),
        default_small_model_id: String::new(),
        models,
    }
}

/// A small two-provider catalog as served by `/v2/providers`.
#[must_use]
pub fn make_test_catalog_json() -> String {
    r#"[
  {
    "id": "openai",
    "name": "OpenAI",
    "type": "openai",
    "api_endpoint": "https://api.openai.com/v1",
    "api_key": "$OPENAI_API_KEY",
    "default_large_model_id": "gpt-4o",
    "default_small_model_id": "gpt-4o-mini",
    "models": [
      {"id": "gpt-4o", "name": "GPT-4o", "cost_per_1m_in": 2.5, "cost_per_1m_out": 10.0,
       "cost_per_1m_in_cached": 1.25, "context_window": 128000, "default_max_tokens": 16384,
       "supports_attachments": true},
      {"id": "gpt-4o-mini", "name": "GPT-4o mini", "cost_per_1m_in": 0.15, "cost_per_1m_out": 0.6,
       "context_window": 128000, "default_max_tokens": 16384, "supports_attachments": true}
    ]
  },
  {
    "id": "anthropic",
    "name": "Anthropic",
    "type": "anthropic",
    "api_endpoint": "https://api.anthropic.com/v1",
    "api_key": "$ANTHROPIC_API_KEY",
    "default_large_model_id": "claude-sonnet-4",
    "default_small_model_id": "claude-haiku-3-5",
    "models": [
      {"id": "claude-sonnet-4", "name": "Claude Sonnet 4", "cost_per_1m_in": 3.0, "cost_per_1m_out": 15.0,
       "context_window": 200000, "default_max_tokens": 50000, "can_reason": true,
       "reasoning_levels": ["low", "medium", "high"], "default_reasoning_effort": "medium",
       "supports_attachments": true},
      {"id": "claude-haiku-3-5", "name": "Claude 3.5 Haiku", "cost_per_1m_in": 0.8, "cost_per_1m_out": 4.0,
       "context_window": 200000, "default_max_tokens": 5000}
    ]
  }
]"#
    .to_string()
}

// =============================================================================
// Temp Directory Utilities
// =============================================================================

/// A temporary directory for tests with automatic cleanup.
///
/// Creates an isolated directory that is automatically deleted when
/// the `TestDir` is dropped. Uses the `tempfile` crate internally.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::test_utils::TestDir;
///
/// let dir = TestDir::new();
/// dir.create_file("config.toml", "[output]\nformat = \"json\"");
///
/// let config_path = dir.path().join("config.toml");
/// assert!(config_path.exists());
///
/// // Directory is automatically cleaned up when `dir` goes out of scope
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.inner.path().join(name);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        let mut file = fs::File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes())
            .expect("Failed to write test file");
    }

    /// Read a file from the temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_file(&self, name: &str) -> io::Result<String> {
        let path = self.inner.path().join(name);
        fs::read_to_string(path)
    }

    /// Check if a file exists in the temporary directory.
    #[must_use]
    pub fn file_exists(&self, name: &str) -> bool {
        self.inner.path().join(name).exists()
    }

    /// Get the full path to a file in the temporary directory.
    #[must_use]
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.inner.path().join(name)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_contains;
///
/// let text = "Hello, world!";
/// assert_contains!(text, "world");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
    ($haystack:expr, $needle:expr, $($arg:tt)*) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            $($arg)*
        );
    };
}

/// Assert that a string does NOT contain a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_not_contains;
///
/// let text = "Hello, world!";
/// assert_not_contains!(text, "goodbye");
/// ```
#[macro_export]
macro_rules! assert_not_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
    ($haystack:expr, $needle:expr, $($arg:tt)*) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            !haystack.contains(needle),
            $($arg)*
        );
    };
}

/// Assert that a string is valid JSON.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_json_valid;
///
/// let json = r#"{"key": "value"}"#;
/// assert_json_valid!(json);
/// ```
#[macro_export]
macro_rules! assert_json_valid {
    ($json:expr) => {
        let json = $json;
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(_) => {}
            Err(e) => {
                panic!(
                    "Expected valid JSON, but parsing failed: {}\n\nJSON string:\n{}",
                    e, json
                );
            }
        }
    };
}

/// Assert that a string contains ANSI escape codes (has colors/formatting).
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_ansi_codes;
///
/// let colored = "\x1b[31mred text\x1b[0m";
/// assert_ansi_codes!(colored);
/// ```
#[macro_export]
macro_rules! assert_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            text.contains('\x1b') || text.contains('\u{001b}'),
            "Expected string to contain ANSI escape codes, but none found.\n\nActual string:\n{:?}",
            text
        );
    };
}

/// Assert that a string does NOT contain ANSI escape codes.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_no_ansi_codes;
///
/// let plain = "plain text";
/// assert_no_ansi_codes!(plain);
/// ```
#[macro_export]
macro_rules! assert_no_ansi_codes {
    ($text:expr) => {
        let text = $text;
        assert!(
            !text.contains('\x1b') && !text.contains('\u{001b}'),
            "Expected string to NOT contain ANSI escape codes.\n\nActual string:\n{:?}",
            text
        );
    };
}

/// Assert approximate floating point equality.
///
/// # Examples
///
/// ```rust,ignore
/// use mcat::assert_float_eq;
///
/// assert_float_eq!(70.0, 70.0000001);
/// assert_float_eq!(70.0, 70.05, 0.1); // Custom epsilon
/// ```
#[macro_export]
macro_rules! assert_float_eq {
    ($left:expr, $right:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = f64::EPSILON * 100.0;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
    ($left:expr, $right:expr, $epsilon:expr) => {
        let left: f64 = $left;
        let right: f64 = $right;
        let epsilon: f64 = $epsilon;
        assert!(
            (left - right).abs() < epsilon,
            "Float equality assertion failed: {} != {} (epsilon: {})",
            left,
            right,
            epsilon
        );
    };
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Check if a string contains valid ANSI escape sequences.
#[must_use]
pub fn has_ansi_codes(text: &str) -> bool {
    text.contains('\x1b') || text.contains('\u{001b}')
}

// =============================================================================
// Tests for Test Utilities
// =============================================================================
