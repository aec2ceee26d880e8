//! Config command implementation.

use crate::cli::args::ConfigArgs;
use crate::cli::{emit, render_options};
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;

/// Execute the config command.
pub fn execute(args: &ConfigArgs, config: &ResolvedConfig) -> Result<()> {
    if args.path {
        return emit(&config.config_path.display().to_string());
    }
    let report = config.report();
    let output = render::render_config(&report, &render_options(config, None))?;
    emit(&output)
}
