//! Resolving free-text tokens to catalog models and providers.
//!
//! Lookup is order-sensitive: providers are scanned in catalog order and
//! models in list order, and the first hit wins. Reordering the catalog can
//! change which model a partial name resolves to.

use crate::core::catalog::{CatalogEntry, Model, Provider};
use crate::error::{McatError, Result};

/// Case-insensitive identifier equality, folding Unicode like name matching.
fn same_id(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// True if `model` answers to `token`: exact id (case-insensitive) or a
/// case-insensitive substring of the display name.
#[must_use]
pub fn model_matches(model: &Model, token: &str) -> bool {
    same_id(&model.id, token)
        || model.name.to_lowercase().contains(&token.to_lowercase())
}

/// Find the first model matching `token` across all providers.
///
/// # Errors
///
/// Returns `ModelNotFound` when nothing matches.
pub fn find_model<'a>(providers: &'a [Provider], token: &str) -> Result<CatalogEntry<'a>> {
    find_model_in(providers, token, None)
}

/// Find the first model matching `token`, optionally restricted to one
/// provider id (case-insensitive).
///
/// # Errors
///
/// Returns `ModelNotFound` when nothing matches.
pub fn find_model_in<'a>(
    providers: &'a [Provider],
    token: &str,
    provider_id: Option<&str>,
) -> Result<CatalogEntry<'a>> {
    providers
        .iter()
        .filter(|p| provider_id.is_none_or(|id| same_id(&p.id, id)))
        .find_map(|provider| {
            provider
                .models
                .iter()
                .find(|m| model_matches(m, token))
                .map(|model| CatalogEntry { model, provider })
        })
        .ok_or_else(|| McatError::ModelNotFound {
            query: token.to_string(),
            provider: provider_id.map(str::to_string),
        })
}

/// Find a provider by id (case-insensitive).
///
/// # Errors
///
/// Returns `ProviderNotFound` when no provider has that id.
pub fn find_provider<'a>(providers: &'a [Provider], id: &str) -> Result<&'a Provider> {
    providers
        .iter()
        .find(|p| same_id(&p.id, id))
        .ok_or_else(|| McatError::ProviderNotFound(id.to_string()))
}

/// Pick the model a chat session should use within one provider.
///
/// An explicit id must match exactly (case-insensitive). Without one the
/// provider's default large model is used, falling back to its first model.
///
/// # Errors
///
/// Returns `ModelNotFound` if the explicit id is unknown or the provider
/// has no models.
pub fn resolve_provider_model<'a>(
    provider: &'a Provider,
    requested: Option<&str>,
) -> Result<&'a Model> {
    let not_found = |query: &str| McatError::ModelNotFound {
        query: query.to_string(),
        provider: Some(provider.id.clone()),
    };

    if let Some(id) = requested {
        return provider
            .models
            .iter()
            .find(|m| same_id(&m.id, id))
            .ok_or_else(|| not_found(id));
    }

    provider
        .models
        .iter()
        .find(|m| m.id == provider.default_large_model_id)
        .or_else(|| provider.models.first())
        .ok_or_else(|| not_found(&provider.default_large_model_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{make_test_model, make_test_provider};

    fn catalog() -> Vec<Provider> {
        let mut openai = make_test_provider(
            "openai",
            vec![
                make_test_model("gpt-4o", 2.5, 10.0, 128_000),
                make_test_model("gpt-4o-mini", 0.15, 0.6, 128_000),
            ],
        );
        openai.models[0].name = "GPT-4o".to_string();
        openai.models[1].name = "GPT-4o mini".to_string();
        openai.default_large_model_id = "gpt-4o-mini".to_string();

        let mut router = make_test_provider(
            "openrouter",
            vec![make_test_model("openai/gpt-4o", 2.5, 10.0, 128_000)],
        );
        router.models[0].name = "OpenAI: GPT-4o".to_string();
        vec![openai, router]
    }

    #[test]
    fn exact_id_is_case_insensitive() {
        let providers = catalog();
        let hit = find_model(&providers, "GPT-4O-MINI").unwrap();
        assert_eq!(hit.model.id, "gpt-4o-mini");
        assert_eq!(hit.provider.id, "openai");
    }

    #[test]
    fn ids_fold_case_beyond_ascii() {
        let mut model = make_test_model("Ärzte-LLM", 1.0, 1.0, 8_000);
        model.name = "Medical".to_string();
        let providers = vec![make_test_provider("Éclair", vec![model])];

        let hit = find_model_in(&providers, "ärzte-llm", Some("éclair")).unwrap();
        assert_eq!(hit.model.id, "Ärzte-LLM");
        assert_eq!(find_provider(&providers, "ÉCLAIR").unwrap().id, "Éclair");
        assert_eq!(
            resolve_provider_model(&providers[0], Some("ÄRZTE-llm")).unwrap().id,
            "Ärzte-LLM"
        );
    }

    #[test]
    fn first_match_in_catalog_order_wins() {
        let providers = catalog();
        // "gpt-4o" also appears in the names of two later models
        let hit = find_model(&providers, "gpt-4o").unwrap();
        assert_eq!(hit.model.id, "gpt-4o");

        // Name fragments with spaces match as substrings too
        let hit = find_model(&providers, "4o mini").unwrap();
        assert_eq!(hit.model.id, "gpt-4o-mini");

        let hit = find_model(&providers, "openai/gpt-4o").unwrap();
        assert_eq!(hit.provider.id, "openrouter");
    }

    #[test]
    fn name_substring_matches() {
        let providers = catalog();
        let hit = find_model(&providers, "mini").unwrap();
        assert_eq!(hit.model.id, "gpt-4o-mini");
    }

    #[test]
    fn reordering_catalog_changes_resolution() {
        let mut providers = catalog();
        providers.reverse();
        let hit = find_model(&providers, "gpt-4o").unwrap();
        assert_eq!(hit.provider.id, "openrouter");
    }

    #[test]
    fn miss_is_not_found() {
        let providers = catalog();
        let err = find_model(&providers, "claude").unwrap_err();
        assert!(matches!(err, McatError::ModelNotFound { ref query, provider: None } if query == "claude"));
    }

    #[test]
    fn provider_restriction() {
        let providers = catalog();
        let hit = find_model_in(&providers, "gpt-4o", Some("OpenRouter")).unwrap();
        assert_eq!(hit.model.id, "openai/gpt-4o");

        let err = find_model_in(&providers, "mini", Some("openrouter")).unwrap_err();
        assert_eq!(err.provider(), Some("openrouter"));
    }

    #[test]
    fn provider_lookup() {
        let providers = catalog();
        assert_eq!(find_provider(&providers, "OPENAI").unwrap().id, "openai");
        assert!(matches!(
            find_provider(&providers, "groq"),
            Err(McatError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn chat_model_resolution_order() {
        let providers = catalog();
        let openai = &providers[0];

        assert_eq!(resolve_provider_model(openai, Some("GPT-4O")).unwrap().id, "gpt-4o");
        assert_eq!(resolve_provider_model(openai, None).unwrap().id, "gpt-4o-mini");
        assert!(resolve_provider_model(openai, Some("mini")).is_err());

        let router = &providers[1];
        assert_eq!(
            resolve_provider_model(router, None).unwrap().id,
            "openai/gpt-4o"
        );

        let empty = make_test_provider("empty", vec![]);
        assert!(resolve_provider_model(&empty, None).is_err());
    }
}
