//! mcat - Model Catalog Tool
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::{CommandFactory, Parser};
use std::process::ExitCode;

use mcat::cli::{self, Cli, Commands, OutputFormat};
use mcat::core::logging::{self, LogSettings};
use mcat::error::McatError;
use mcat::storage::config::ResolvedConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = LogSettings::resolve(cli.log_level, cli.json_output, cli.verbose, |key| {
        std::env::var(key).ok()
    });
    logging::init(&settings);

    let command = cli.command.name();
    let config = match ResolvedConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            let format = cli.cli_format().unwrap_or_default();
            return fail(command, &e, format, cli.no_color, cli.pretty);
        }
    };

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(command, &e, config.format, config.no_color, config.pretty),
    }
}

fn fail(
    command: &str,
    error: &McatError,
    format: OutputFormat,
    no_color: bool,
    pretty: bool,
) -> ExitCode {
    tracing::debug!(command, code = error.error_code(), "Command failed: {error}");
    let output = mcat::render::error::render_error(command, error, format, no_color, pretty);
    eprintln!("{output}");
    ExitCode::from(error.exit_code() as u8)
}

async fn run(cli: Cli, config: &ResolvedConfig) -> mcat::Result<()> {
    let command = cli.command;
    tracing::debug!(command = command.name(), format = config.format.as_str(), "Dispatching");

    if !command.needs_catalog() {
        return match &command {
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(*shell, &mut cmd, "mcat", &mut std::io::stdout());
                Ok(())
            }
            Commands::Config(args) => cli::config::execute(args, config),
            _ => Ok(()),
        };
    }

    let catalog = cli::load(config).await?;
    match &command {
        Commands::Providers(args) => cli::providers::execute(args, &catalog, config),
        Commands::Models(args) => cli::models::execute(args, &catalog, config),
        Commands::Info(args) => cli::info::execute(args, &catalog, config),
        Commands::Find(args) => cli::find::execute(args, &catalog, config),
        Commands::Cost(args) => cli::cost::execute(args, &catalog, config),
        Commands::Select => cli::select::execute(&catalog, config),
        Commands::Chat(args) => cli::chat::execute(args, &catalog, config).await,
        Commands::Config(_) | Commands::Completions { .. } => Ok(()),
    }
}
