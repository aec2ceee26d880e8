//! Find command implementation: constraint search, step-by-step refinement,
//! and side-by-side compare.

use std::io::{self, BufRead, Write};

use crate::cli::args::FindArgs;
use crate::cli::{OutputFormat, emit, render_options, warn};
use crate::core::catalog::{Catalog, Provider};
use crate::core::filter::{Requirements, filter_entries};
use crate::core::lookup::find_model;
use crate::core::models::{ComparePayload, MatchPayload, ModelView, RankedModel};
use crate::core::ranking::RankedList;
use crate::core::refine::{RefineEvent, RefineStep, Refinement};
use crate::core::scoring::ScoringPolicy;
use crate::error::{McatError, Result};
use crate::render::{self, human};
use crate::storage::config::ResolvedConfig;

impl FindArgs {
    /// Constraints from the flags; absent flags leave a field unconstrained.
    #[must_use]
    pub fn requirements(&self) -> Requirements {
        Requirements {
            budget: self.max_cost.unwrap_or(0.0),
            min_context: self.min_context.unwrap_or(0),
            reasoning: self.reasoning,
            vision: self.vision,
        }
    }
}

/// Filter, score with the simple policy, rank, and keep the top `limit`.
#[must_use]
pub fn search(providers: &[Provider], requirements: Requirements, limit: usize) -> MatchPayload {
    let all = crate::core::catalog::entries(providers);
    let matching = filter_entries(&all, &requirements);
    let ranked = RankedList::rank(&matching, ScoringPolicy::Simple, &requirements);
    tracing::debug!(candidates = all.len(), matching = ranked.len(), limit, "Ranked search results");

    MatchPayload {
        requirements,
        total_matches: ranked.len(),
        results: RankedModel::from_candidates(ranked.top(limit)),
    }
}

/// Resolve each named model; unknown names are collected, not fatal.
#[must_use]
pub fn compare(providers: &[Provider], names: &[String]) -> ComparePayload {
    let mut payload = ComparePayload {
        models: Vec::new(),
        missing: Vec::new(),
    };
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        match find_model(providers, name) {
            Ok(entry) => payload.models.push(ModelView::new(entry.model, entry.provider)),
            Err(_) => {
                tracing::debug!(model = %name, "Skipping unknown model in comparison");
                payload.missing.push(name.to_string());
            }
        }
    }
    payload
}

/// The refinement's ranked survivors, truncated to `limit` rows.
#[must_use]
pub fn refined_payload(refinement: &Refinement<'_>, limit: usize) -> Option<MatchPayload> {
    let ranked = refinement.results()?;
    Some(MatchPayload {
        requirements: *refinement.requirements(),
        total_matches: ranked.len(),
        results: RankedModel::from_candidates(ranked.top(limit)),
    })
}

/// Read one answer per line until the refinement finishes or is cancelled.
///
/// End of input cancels, except on the results screen where it finishes.
///
/// # Errors
///
/// Returns an I/O error if input cannot be read or prompts written.
pub fn refine<R: BufRead, W: Write>(
    refinement: &mut Refinement<'_>,
    mut input: R,
    out: &mut W,
    limit: usize,
    no_color: bool,
) -> Result<RefineStep> {
    writeln!(out, "Find models step by step (q to cancel)")?;
    while !refinement.step().is_terminal() {
        let step = refinement.step();
        match step {
            RefineStep::MinContext | RefineStep::Capabilities => {
                writeln!(out, "\nFiltered to {} models", refinement.matching())?;
            }
            RefineStep::Results => {
                if let Some(payload) = refined_payload(refinement, limit) {
                    writeln!(out, "\n{}", human::render_matches(&payload, 0, no_color))?;
                }
            }
            _ => {}
        }
        write!(out, "{}: ", step.prompt())?;
        out.flush()?;

        let mut line = String::new();
        let event = if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            if step == RefineStep::Results {
                RefineEvent::Submit(String::new())
            } else {
                RefineEvent::Cancel
            }
        } else {
            RefineEvent::from_line(&line)
        };
        tracing::debug!(?step, ?event, "Refinement event");
        if refinement.handle(&event) == step {
            writeln!(out, "Please enter a non-negative number.")?;
        }
    }
    Ok(refinement.step())
}

fn execute_interactive(args: &FindArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let opts = render_options(config, Some(catalog));
    let json = match config.format {
        OutputFormat::Human => false,
        OutputFormat::Json => true,
        other => {
            return Err(McatError::UnsupportedOutputMode {
                command: "find".to_string(),
                mode: other.as_str().to_string(),
            });
        }
    };
    let limit = args.limit.unwrap_or(config.limits.preview).max(1);

    // Prompts share stdout with human output; JSON keeps stdout clean.
    let mut out: Box<dyn Write> = if json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut refinement = Refinement::new(catalog.entries(), args.requirements());
    let step = refine(
        &mut refinement,
        io::stdin().lock(),
        &mut out,
        limit,
        json || opts.no_color,
    )?;

    match step {
        RefineStep::Finished if json => {
            if let Some(payload) = refined_payload(&refinement, limit) {
                emit(&render::render_matches("find", &payload, 0, &opts)?)?;
            }
        }
        RefineStep::Cancelled => {
            tracing::info!("Refined search cancelled");
            writeln!(out, "Search cancelled.")?;
        }
        _ => {}
    }
    Ok(())
}

/// Execute the find command.
pub fn execute(args: &FindArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    if args.interactive {
        return execute_interactive(args, catalog, config);
    }
    let opts = render_options(config, Some(catalog));

    let output = if let Some(names) = &args.compare {
        let payload = compare(&catalog.providers, names);
        // JSON carries misses in the envelope; everything else warns on stderr.
        if config.format != OutputFormat::Json {
            for name in &payload.missing {
                warn(&format!("model not found: {name}"));
            }
        }
        render::render_compare(&payload, &opts)?
    } else {
        let limit = args.limit.unwrap_or(config.limits.search).max(1);
        let payload = search(&catalog.providers, args.requirements(), limit);
        render::render_matches("find", &payload, 0, &opts)?
    };
    emit(&output)
}
