//! Info command implementation.

use crate::cli::args::InfoArgs;
use crate::cli::{emit, render_options};
use crate::core::catalog::Catalog;
use crate::core::lookup::find_model_in;
use crate::core::models::{ModelExport, ModelView};
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;

/// Execute the info command.
pub fn execute(args: &InfoArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let entry = find_model_in(&catalog.providers, &args.model, args.provider.as_deref())?;
    tracing::debug!(query = %args.model, model = %entry.model.id, provider = %entry.provider.id, "Resolved model");

    let output = if args.export {
        render::render_export(&ModelExport::new(entry.model, entry.provider), config.pretty)?
    } else {
        let view = ModelView::new(entry.model, entry.provider);
        render::render_model_info(&view, &render_options(config, Some(catalog)))?
    };
    emit(&output)
}
