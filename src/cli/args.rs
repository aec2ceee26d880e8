//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::filter::ModelSort;
use crate::core::logging::LogLevel;
use crate::error::{McatError, Result};

/// Model catalog browser, matcher and cost estimator.
#[derive(Parser, Debug)]
#[command(name = "mcat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // === Global flags ===
    /// Output format [default: human]
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Emit JSON logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog service base URL (overrides CATWALK_URL)
    #[arg(long, value_name = "URL", global = true)]
    pub catalog_url: Option<String>,

    /// Read the catalog from a local JSON file instead of the service
    #[arg(long, value_name = "PATH", global = true, conflicts_with = "catalog_url")]
    pub catalog_file: Option<PathBuf>,

    /// Skip the catalog cache and fetch unconditionally
    #[arg(long, global = true)]
    pub no_cache: bool,
}

impl Cli {
    /// Output format requested on the command line, if any.
    #[must_use]
    pub fn cli_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List providers in the catalog
    Providers(ProvidersArgs),

    /// List the models of one provider
    Models(ModelsArgs),

    /// Show full details for one model
    Info(InfoArgs),

    /// Find models matching constraints, ranked by score
    Find(FindArgs),

    /// Estimate token costs
    Cost(CostArgs),

    /// Interactively choose a model from your requirements
    Select,

    /// Chat with a model and track spend
    Chat(ChatArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Name used in robot envelopes and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Providers(_) => "providers",
            Self::Models(_) => "models",
            Self::Info(_) => "info",
            Self::Find(_) => "find",
            Self::Cost(_) => "cost",
            Self::Select => "select",
            Self::Chat(_) => "chat",
            Self::Config(_) => "config",
            Self::Completions { .. } => "completions",
        }
    }

    /// Whether the command needs the provider catalog.
    #[must_use]
    pub const fn needs_catalog(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Completions { .. })
    }
}

/// Arguments for the `providers` command.
#[derive(Parser, Debug)]
pub struct ProvidersArgs {
    /// Only providers of this type (e.g. openai, anthropic)
    #[arg(long = "type", value_name = "TYPE")]
    pub provider_type: Option<String>,
}

/// Arguments for the `models` command.
#[derive(Parser, Debug)]
pub struct ModelsArgs {
    /// Provider id
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: String,

    /// Only models that can reason
    #[arg(long)]
    pub reasoning: bool,

    /// Only models that accept images
    #[arg(long)]
    pub vision: bool,

    /// Sort order
    #[arg(long, value_enum, default_value_t = ModelSort::Name)]
    pub sort: ModelSort,
}

/// Arguments for the `info` command.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Model id or display name
    pub model: String,

    /// Restrict the lookup to one provider
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Print connection details as JSON for use in other tools
    #[arg(long)]
    pub export: bool,
}

/// Arguments for the `find` command.
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Maximum input cost per 1M tokens (USD)
    #[arg(long, value_name = "USD")]
    pub max_cost: Option<f64>,

    /// Minimum context window in tokens
    #[arg(long, value_name = "TOKENS")]
    pub min_context: Option<u64>,

    /// Require reasoning support
    #[arg(long)]
    pub reasoning: bool,

    /// Require image input support
    #[arg(long)]
    pub vision: bool,

    /// Number of results to show [default: from config, 10]
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Compare these models side by side instead of searching
    #[arg(long, value_name = "MODELS", value_delimiter = ',', num_args = 1..)]
    pub compare: Option<Vec<String>>,

    /// Narrow the search step by step from typed cost and context limits
    #[arg(long, conflicts_with = "compare")]
    pub interactive: bool,
}

/// Arguments for the `cost` command.
#[derive(Parser, Debug)]
pub struct CostArgs {
    /// Model to price
    #[arg(short, long, value_name = "MODEL", conflicts_with_all = ["compare", "batch"])]
    pub model: Option<String>,

    /// Input tokens
    #[arg(short, long, value_name = "TOKENS")]
    pub input: Option<u64>,

    /// Output tokens
    #[arg(short, long, value_name = "TOKENS")]
    pub output: Option<u64>,

    /// Share of input tokens served from cache (0 to 1)
    #[arg(long, value_name = "RATIO", default_value_t = 0.0)]
    pub cached: f64,

    /// Price the same token profile on several models
    #[arg(long, value_name = "MODELS", value_delimiter = ',', num_args = 1.., conflicts_with = "batch")]
    pub compare: Option<Vec<String>>,

    /// JSON file with an array of scenarios
    #[arg(long, value_name = "FILE")]
    pub batch: Option<PathBuf>,
}

/// What `cost` was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CostMode {
    Single {
        model: String,
        input: u64,
        output: u64,
        cached: f64,
    },
    Compare {
        models: Vec<String>,
        input: u64,
        output: u64,
        cached: f64,
    },
    Batch(PathBuf),
}

impl CostArgs {
    /// Work out the mode and check its required arguments.
    ///
    /// # Errors
    ///
    /// `MissingArgument` when no mode or a required count is missing (single
    /// mode needs positive token counts), `InvalidScenario` for a cached
    /// ratio outside `[0, 1]`.
    pub fn mode(&self) -> Result<CostMode> {
        if let Some(path) = &self.batch {
            return Ok(CostMode::Batch(path.clone()));
        }

        crate::core::pricing::validate_cached_ratio(self.cached)
            .map_err(|reason| McatError::InvalidScenario { index: None, reason })?;

        if let Some(models) = &self.compare {
            let models: Vec<String> = models
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if models.is_empty() {
                return Err(McatError::MissingArgument("--compare".to_string()));
            }
            return Ok(CostMode::Compare {
                models,
                input: self.input.unwrap_or(0),
                output: self.output.unwrap_or(0),
                cached: self.cached,
            });
        }

        let Some(model) = self.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) else {
            return Err(McatError::MissingArgument("--model".to_string()));
        };
        let input = self.input.filter(|&n| n > 0);
        let output = self.output.filter(|&n| n > 0);
        match (input, output) {
            (Some(input), Some(output)) => Ok(CostMode::Single {
                model: model.to_string(),
                input,
                output,
                cached: self.cached,
            }),
            (None, _) => Err(McatError::MissingArgument("--input".to_string())),
            (_, None) => Err(McatError::MissingArgument("--output".to_string())),
        }
    }
}

/// Arguments for the `chat` command.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Provider id
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: String,

    /// Model id [default: the provider's default large model]
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// System prompt
    #[arg(long, value_name = "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per reply [default: the model's default]
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u64>,

    /// API key (overrides environment and catalog)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Show endpoint, masked key and headers before chatting
    #[arg(long)]
    pub debug: bool,
}

/// Arguments for the `config` command.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Only print the config file path
    #[arg(long)]
    pub path: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable rich output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Markdown output
    Md,
    /// Comma-separated values
    Csv,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
            Self::Md => "md",
            Self::Csv => "csv",
        }
    }

    /// Parse a config or environment value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "md" | "markdown" => Some(Self::Md),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_robot(self) -> bool {
        !matches!(self, Self::Human)
    }
}
