//! Configuration file loading and resolution.
//!
//! The config file lives at `<config dir>/config.toml`
//! (`~/.config/mcat/config.toml` on Linux) unless `MCAT_CONFIG` points
//! elsewhere.
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `CATWALK_URL`: Catalog service base URL
//! - `MCAT_CATALOG_FILE`: Read the catalog from a local JSON file
//! - `MCAT_FORMAT`: Output format (human, json, md, csv)
//! - `MCAT_TIMEOUT`: Catalog request timeout in seconds
//! - `MCAT_NO_COLOR` or `NO_COLOR`: Disable colors
//! - `MCAT_PRETTY`: Pretty-print JSON output (1, true, yes)
//! - `MCAT_CONFIG`: Override config file path

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::ranking::{DETAIL_LIMIT, PREVIEW_LIMIT, SEARCH_LIMIT};
use crate::error::{McatError, Result};
use crate::storage::cache::DEFAULT_CATALOG_TTL_SECS;

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Catalog service base URL.
pub const ENV_CATALOG_URL: &str = "CATWALK_URL";
/// Local catalog JSON file.
pub const ENV_CATALOG_FILE: &str = "MCAT_CATALOG_FILE";
pub const ENV_FORMAT: &str = "MCAT_FORMAT";
/// Timeout in seconds for catalog requests.
pub const ENV_TIMEOUT: &str = "MCAT_TIMEOUT";
pub const ENV_NO_COLOR: &str = "MCAT_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";
pub const ENV_PRETTY: &str = "MCAT_PRETTY";
/// Override config file path.
pub const ENV_CONFIG: &str = "MCAT_CONFIG";

/// Catalog service used when nothing else is configured.
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Config file
// =============================================================================

/// Contents of `config.toml`. Absent keys fall through to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// human, json, md or csv.
    pub format: Option<String>,
    pub color: Option<bool>,
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub search_limit: Option<usize>,
    pub preview_limit: Option<usize>,
    pub detail_limit: Option<usize>,
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` if the file exists but is not valid TOML for
    /// this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| McatError::ConfigParse {
            path: path.display().to_string(),
            line: e.span().map(|span| line_of(&content, span.start)),
            message: e.message().to_string(),
        })
    }

    /// Check values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.catalog.url {
            validate_url("catalog.url", url)?;
        }
        if let Some(format) = &self.output.format
            && OutputFormat::parse(format).is_none()
        {
            return Err(invalid("output.format", format, "expected human, json, md or csv"));
        }
        if self.catalog.timeout_secs == Some(0) {
            return Err(invalid("catalog.timeout_secs", "0", "must be at least 1 second"));
        }
        for (key, value) in [
            ("display.search_limit", self.display.search_limit),
            ("display.preview_limit", self.display.preview_limit),
            ("display.detail_limit", self.display.detail_limit),
        ] {
            if value == Some(0) {
                return Err(invalid(key, "0", "must be at least 1"));
            }
        }
        Ok(())
    }
}

/// 1-based line containing byte `offset`.
fn line_of(content: &str, offset: usize) -> usize {
    content
        .get(..offset.min(content.len()))
        .map_or(1, |prefix| prefix.matches('\n').count() + 1)
}

fn invalid(key: &str, value: &str, reason: &str) -> McatError {
    McatError::ConfigInvalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    let lower = url.trim().to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid(key, url, "must start with http:// or https://"))
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Where the catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How many rows each listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimits {
    pub search: usize,
    pub preview: usize,
    pub detail: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            search: SEARCH_LIMIT,
            preview: PREVIEW_LIMIT,
            detail: DETAIL_LIMIT,
        }
    }
}

/// Fully resolved configuration, threaded into every command.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub catalog: CatalogLocation,
    /// Catalog request timeout.
    pub timeout: Duration,
    pub cache_ttl: Duration,
    /// False when `--no-cache` was given.
    pub use_cache: bool,
    pub format: OutputFormat,
    pub pretty: bool,
    pub no_color: bool,
    pub limits: DisplayLimits,
    /// The config file consulted (which may not exist).
    pub config_path: PathBuf,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub catalog: ConfigSource,
    pub timeout: ConfigSource,
    pub cache_ttl: ConfigSource,
    pub use_cache: ConfigSource,
    pub format: ConfigSource,
    pub pretty: ConfigSource,
    pub no_color: ConfigSource,
    pub limits: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// One row of `mcat config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: ConfigSource,
}

/// Payload of `mcat config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    pub config_path: String,
    pub config_exists: bool,
    pub entries: Vec<ConfigEntry>,
}

impl ResolvedConfig {
    /// Resolve from CLI args, the process environment and the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed or any resolved
    /// value is invalid.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        Self::resolve_with(cli, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::resolve`] with an injected environment.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub fn resolve_with(cli: &Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config_path = env(ENV_CONFIG).map_or_else(|| AppPaths::new().config_file(), PathBuf::from);
        let config = Config::load_from(&config_path)?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let catalog = Self::resolve_catalog(cli, &config, &env, &mut sources.catalog)?;
        let timeout = Self::resolve_timeout(&config, &env, &mut sources.timeout)?;
        let cache_ttl = match config.catalog.cache_ttl_secs {
            Some(secs) => {
                sources.cache_ttl = ConfigSource::ConfigFile;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        };
        let use_cache = if cli.no_cache {
            sources.use_cache = ConfigSource::Cli;
            false
        } else {
            true
        };
        let format = Self::resolve_format(cli, &config, &env, &mut sources.format)?;
        let pretty = Self::resolve_flag(
            cli.pretty,
            Self::is_truthy(env(ENV_PRETTY)),
            config.output.pretty,
            &mut sources.pretty,
        );
        let no_color = Self::resolve_flag(
            cli.no_color,
            Self::is_truthy(env(ENV_NO_COLOR)) || env(ENV_NO_COLOR_STD).is_some(),
            config.output.color.map(|color| !color),
            &mut sources.no_color,
        );
        let limits = Self::resolve_limits(&config, &mut sources.limits);

        Ok(Self {
            catalog,
            timeout,
            cache_ttl,
            use_cache,
            format,
            pretty,
            no_color,
            limits,
            config_path,
            sources,
        })
    }

    fn resolve_catalog(
        cli: &Cli,
        config: &Config,
        env: &impl Fn(&str) -> Option<String>,
        source: &mut ConfigSource,
    ) -> Result<CatalogLocation> {
        // 1. CLI flags
        if let Some(path) = &cli.catalog_file {
            *source = ConfigSource::Cli;
            return Ok(CatalogLocation::File(path.clone()));
        }
        if let Some(url) = &cli.catalog_url {
            *source = ConfigSource::Cli;
            validate_url("--catalog-url", url)?;
            return Ok(CatalogLocation::Url(url.trim().to_string()));
        }

        // 2. Environment variables
        if let Some(path) = env(ENV_CATALOG_FILE) {
            *source = ConfigSource::Env;
            return Ok(CatalogLocation::File(PathBuf::from(path)));
        }
        if let Some(url) = env(ENV_CATALOG_URL) {
            *source = ConfigSource::Env;
            validate_url(ENV_CATALOG_URL, &url)?;
            return Ok(CatalogLocation::Url(url));
        }

        // 3. Config file
        if let Some(url) = &config.catalog.url {
            *source = ConfigSource::ConfigFile;
            return Ok(CatalogLocation::Url(url.trim().to_string()));
        }

        // 4. Default
        *source = ConfigSource::Default;
        Ok(CatalogLocation::Url(DEFAULT_CATALOG_URL.to_string()))
    }

    fn resolve_timeout(
        config: &Config,
        env: &impl Fn(&str) -> Option<String>,
        source: &mut ConfigSource,
    ) -> Result<Duration> {
        if let Some(raw) = env(ENV_TIMEOUT) {
            *source = ConfigSource::Env;
            return match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(invalid(ENV_TIMEOUT, &raw, "expected a whole number of seconds >= 1")),
            };
        }
        if let Some(secs) = config.catalog.timeout_secs {
            *source = ConfigSource::ConfigFile;
            return Ok(Duration::from_secs(secs));
        }
        *source = ConfigSource::Default;
        Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    fn resolve_format(
        cli: &Cli,
        config: &Config,
        env: &impl Fn(&str) -> Option<String>,
        source: &mut ConfigSource,
    ) -> Result<OutputFormat> {
        if let Some(format) = cli.cli_format() {
            *source = ConfigSource::Cli;
            return Ok(format);
        }
        if let Some(raw) = env(ENV_FORMAT) {
            *source = ConfigSource::Env;
            return OutputFormat::parse(&raw)
                .ok_or_else(|| invalid(ENV_FORMAT, &raw, "expected human, json, md or csv"));
        }
        if let Some(format) = config.output.format.as_deref().and_then(OutputFormat::parse) {
            *source = ConfigSource::ConfigFile;
            return Ok(format);
        }
        *source = ConfigSource::Default;
        Ok(OutputFormat::Human)
    }

    /// A boolean where any layer can only turn the setting on, except the
    /// config file which may state it either way.
    fn resolve_flag(
        cli: bool,
        env: bool,
        file: Option<bool>,
        source: &mut ConfigSource,
    ) -> bool {
        if cli {
            *source = ConfigSource::Cli;
            return true;
        }
        if env {
            *source = ConfigSource::Env;
            return true;
        }
        if let Some(value) = file {
            *source = ConfigSource::ConfigFile;
            return value;
        }
        *source = ConfigSource::Default;
        false
    }

    fn resolve_limits(config: &Config, source: &mut ConfigSource) -> DisplayLimits {
        let defaults = DisplayLimits::default();
        let display = &config.display;
        if display.search_limit.is_some()
            || display.preview_limit.is_some()
            || display.detail_limit.is_some()
        {
            *source = ConfigSource::ConfigFile;
        }
        DisplayLimits {
            search: display.search_limit.unwrap_or(defaults.search),
            preview: display.preview_limit.unwrap_or(defaults.preview),
            detail: display.detail_limit.unwrap_or(defaults.detail),
        }
    }

    fn is_truthy(value: Option<String>) -> bool {
        value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
    }

    /// Every setting with its value and source, for `mcat config`.
    #[must_use]
    pub fn report(&self) -> ConfigReport {
        let s = &self.sources;
        let entry = |key: &str, value: String, source: ConfigSource| ConfigEntry {
            key: key.to_string(),
            value,
            source,
        };
        let catalog_key = match self.catalog {
            CatalogLocation::Url(_) => "catalog.url",
            CatalogLocation::File(_) => "catalog.file",
        };
        ConfigReport {
            config_path: self.config_path.display().to_string(),
            config_exists: self.config_path.exists(),
            entries: vec![
                entry(catalog_key, self.catalog.to_string(), s.catalog),
                entry(
                    "catalog.timeout_secs",
                    self.timeout.as_secs().to_string(),
                    s.timeout,
                ),
                entry(
                    "catalog.cache_ttl_secs",
                    self.cache_ttl.as_secs().to_string(),
                    s.cache_ttl,
                ),
                entry("catalog.cache", self.use_cache.to_string(), s.use_cache),
                entry("output.format", self.format.as_str().to_string(), s.format),
                entry("output.pretty", self.pretty.to_string(), s.pretty),
                entry("output.color", (!self.no_color).to_string(), s.no_color),
                entry(
                    "display.search_limit",
                    self.limits.search.to_string(),
                    s.limits,
                ),
                entry(
                    "display.preview_limit",
                    self.limits.preview.to_string(),
                    s.limits,
                ),
                entry(
                    "display.detail_limit",
                    self.limits.detail.to_string(),
                    s.limits,
                ),
            ],
        }
    }
}
