//! Cost command implementation.

use std::path::Path;

use crate::cli::args::{CostArgs, CostMode};
use crate::cli::{OutputFormat, emit, render_options, warn};
use crate::core::catalog::{Catalog, Provider};
use crate::core::pricing::{self, CostReport, CostScenario};
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;

/// Run the requested estimate against the catalog.
///
/// # Errors
///
/// Single mode fails on an unknown model. Batch mode fails if the file cannot
/// be read or any record is malformed; unknown models in a batch or a
/// comparison are skipped and reported in [`CostReport::skipped`].
pub fn run(providers: &[Provider], mode: &CostMode) -> Result<CostReport> {
    match mode {
        CostMode::Single {
            model,
            input,
            output,
            cached,
        } => {
            let scenario = CostScenario {
                model: model.clone(),
                input_tokens: *input,
                output_tokens: *output,
                cached_ratio: *cached,
            };
            Ok(CostReport {
                results: vec![pricing::estimate(providers, &scenario)?],
                skipped: Vec::new(),
            })
        }
        CostMode::Compare {
            models,
            input,
            output,
            cached,
        } => Ok(pricing::compare(providers, models, *input, *output, *cached)),
        CostMode::Batch(path) => {
            let scenarios = read_batch(path)?;
            Ok(pricing::estimate_batch(providers, &scenarios))
        }
    }
}

fn read_batch(path: &Path) -> Result<Vec<CostScenario>> {
    let content = std::fs::read_to_string(path)?;
    let scenarios = pricing::parse_batch(&content)?;
    tracing::debug!(path = %path.display(), scenarios = scenarios.len(), "Loaded batch file");
    Ok(scenarios)
}

/// Execute the cost command.
pub fn execute(args: &CostArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let mode = args.mode()?;
    let report = run(&catalog.providers, &mode)?;

    // JSON carries skips in the envelope; everything else warns on stderr.
    if config.format != OutputFormat::Json {
        for skipped in &report.skipped {
            warn(&format!(
                "entry {}: model not found: {}",
                skipped.index + 1,
                skipped.model
            ));
        }
    }

    let output = render::render_costs(&report, &render_options(config, Some(catalog)))?;
    emit(&output)
}
