//! Models command implementation.

use crate::cli::args::ModelsArgs;
use crate::cli::{emit, render_options};
use crate::core::catalog::{Catalog, Model, Provider};
use crate::core::filter::{ModelSort, Requirements, sort_models};
use crate::core::lookup::find_provider;
use crate::core::models::ModelView;
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;

/// Models of one provider that pass the capability filters, sorted.
#[must_use]
pub fn list(provider: &Provider, reasoning: bool, vision: bool, sort: ModelSort) -> Vec<ModelView> {
    let requirements = Requirements {
        reasoning,
        vision,
        ..Requirements::default()
    };
    let mut models: Vec<&Model> = provider
        .models
        .iter()
        .filter(|m| requirements.admits(m))
        .collect();
    sort_models(&mut models, sort);
    models.into_iter().map(|m| ModelView::new(m, provider)).collect()
}

/// Execute the models command.
pub fn execute(args: &ModelsArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let provider = find_provider(&catalog.providers, &args.provider)?;
    let rows = list(provider, args.reasoning, args.vision, args.sort);
    tracing::debug!(provider = %provider.id, shown = rows.len(), sort = ?args.sort, "Listing models");

    let output = render::render_models(&provider.name, &rows, &render_options(config, Some(catalog)))?;
    emit(&output)
}
