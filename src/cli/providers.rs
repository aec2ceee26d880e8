//! Providers command implementation.

use crate::cli::args::ProvidersArgs;
use crate::cli::{emit, render_options};
use crate::core::catalog::{Catalog, Provider};
use crate::core::models::ProviderSummary;
use crate::error::Result;
use crate::render;
use crate::storage::config::ResolvedConfig;

/// Providers sorted by display name, optionally restricted to one type.
#[must_use]
pub fn summarize(providers: &[Provider], provider_type: Option<&str>) -> Vec<ProviderSummary> {
    let mut rows: Vec<ProviderSummary> = providers
        .iter()
        .filter(|p| provider_type.is_none_or(|t| p.provider_type.eq_ignore_ascii_case(t)))
        .map(ProviderSummary::from)
        .collect();
    rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    rows
}

/// Execute the providers command.
pub fn execute(args: &ProvidersArgs, catalog: &Catalog, config: &ResolvedConfig) -> Result<()> {
    let rows = summarize(&catalog.providers, args.provider_type.as_deref());
    tracing::debug!(
        total = catalog.providers.len(),
        shown = rows.len(),
        provider_type = args.provider_type.as_deref().unwrap_or("-"),
        "Listing providers"
    );
    let output = render::render_providers(&rows, &render_options(config, Some(catalog)))?;
    emit(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_test_provider;

    #[test]
    fn sorted_by_name_and_filtered_by_type() {
        let mut zeta = make_test_provider("zeta", vec![]);
        zeta.provider_type = "anthropic".into();
        let alpha = make_test_provider("alpha", vec![]);
        let providers = vec![zeta, alpha];

        let all = summarize(&providers, None);
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);

        let only = summarize(&providers, Some("Anthropic"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "zeta");
        assert!(summarize(&providers, Some("gemini")).is_empty());
    }
}
