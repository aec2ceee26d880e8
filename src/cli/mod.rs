//! CLI argument parsing and command dispatch.

pub mod args;
pub mod chat;
pub mod config;
pub mod cost;
pub mod find;
pub mod info;
pub mod models;
pub mod providers;
pub mod select;

use std::io::Write;

use crate::core::catalog::{
    Catalog, CatalogSource, FileCatalogSource, HttpCatalogSource, LoadOptions, load_catalog,
};
use crate::core::models::CatalogMeta;
use crate::error::Result;
use crate::render::RenderOptions;
use crate::rich::should_use_rich_output;
use crate::storage::cache::CatalogCache;
use crate::storage::config::{CatalogLocation, ResolvedConfig};
use crate::storage::paths::AppPaths;

pub use args::{Cli, Commands, OutputFormat};

/// Load the catalog the resolved configuration points at.
///
/// # Errors
///
/// Returns `CatalogUnavailable` or `Timeout` when the catalog cannot be read.
pub async fn load(config: &ResolvedConfig) -> Result<Catalog> {
    let source: Box<dyn CatalogSource> = match &config.catalog {
        CatalogLocation::Url(url) => Box::new(HttpCatalogSource::new(url, config.timeout)?),
        CatalogLocation::File(path) => Box::new(FileCatalogSource::new(path.clone())),
    };
    let cache = CatalogCache::new(AppPaths::new().catalog_cache_dir());
    let options = LoadOptions {
        bypass_cache: !config.use_cache,
        cache_ttl: config.cache_ttl,
    };

    let catalog = load_catalog(source.as_ref(), Some(&cache), options).await?;
    tracing::debug!(
        location = %config.catalog,
        origin = ?catalog.origin,
        providers = catalog.providers.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Rendering options for a command, with catalog provenance if one was loaded.
///
/// Color is dropped whenever rich output is not appropriate for stdout.
#[must_use]
pub fn render_options(config: &ResolvedConfig, catalog: Option<&Catalog>) -> RenderOptions {
    RenderOptions {
        format: config.format,
        pretty: config.pretty,
        no_color: !should_use_rich_output(config.format, config.no_color),
        catalog: catalog.map(|c| CatalogMeta {
            location: config.catalog.to_string(),
            origin: c.origin,
            etag: c.etag.clone(),
        }),
    }
}

/// Write rendered output to stdout, ending with exactly one newline.
///
/// # Errors
///
/// Returns an I/O error if stdout is closed.
pub fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Print a non-fatal warning to stderr.
pub fn warn(message: &str) {
    eprintln!("Warning: {message}");
}
