//! Provider/model catalog types and catalog sources.
//!
//! A [`CatalogSource`] performs one conditional fetch: given the validator
//! (ETag) from a previous fetch it either returns a fresh provider list or
//! reports that the previously obtained data is still current.
//! [`load_catalog`] layers the on-disk cache on top of a source.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::http::{build_client, map_send_error};
use crate::error::{McatError, Result};
use crate::storage::cache::{CatalogCache, CatalogCacheEntry};

/// Boxed future returned by catalog sources.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<CatalogFetch>> + Send + 'a>>;

// =============================================================================
// Catalog data
// =============================================================================

/// A model offered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cost_per_1m_in: f64,
    #[serde(default)]
    pub cost_per_1m_out: f64,
    /// Zero when the model has no cached-input pricing.
    #[serde(default)]
    pub cost_per_1m_in_cached: f64,
    #[serde(default)]
    pub cost_per_1m_out_cached: f64,
    #[serde(default)]
    pub context_window: u64,
    #[serde(default)]
    pub default_max_tokens: u64,
    #[serde(default)]
    pub can_reason: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_levels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_reasoning_effort: Option<String>,
    /// Accepts image attachments.
    #[serde(default, rename = "supports_attachments", alias = "supports_images")]
    pub supports_vision: bool,
}

/// An inference provider and its ordered model list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub api_endpoint: String,
    /// Key from the catalog itself, usually an env placeholder like `$OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub default_large_model_id: String,
    #[serde(default)]
    pub default_small_model_id: String,
    #[serde(default)]
    pub models: Vec<Model>,
}

/// A model paired with the provider that offers it.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    pub model: &'a Model,
    pub provider: &'a Provider,
}

/// Flatten providers into entries, in catalog order.
#[must_use]
pub fn entries(providers: &[Provider]) -> Vec<CatalogEntry<'_>> {
    providers
        .iter()
        .flat_map(|provider| {
            provider
                .models
                .iter()
                .map(move |model| CatalogEntry { model, provider })
        })
        .collect()
}

// =============================================================================
// Sources
// =============================================================================

/// Outcome of one conditional fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogFetch {
    /// New data, with the validator to send next time.
    Fresh {
        providers: Vec<Provider>,
        etag: Option<String>,
    },
    /// The validator matched; keep using the previous data.
    NotModified,
}

/// Something that can produce the provider catalog.
pub trait CatalogSource: Send + Sync {
    /// Human-readable location used in errors and logs.
    fn location(&self) -> String;

    /// Whether results from this source should go through the on-disk cache.
    fn cacheable(&self) -> bool {
        true
    }

    /// Fetch the catalog. `None` forces an unconditional fetch.
    fn fetch<'a>(&'a self, validator: Option<&'a str>) -> FetchFuture<'a>;
}

/// Catalog served over HTTP at `{base_url}/v2/providers`.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCatalogSource {
    /// Create a source for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn providers_url(&self) -> String {
        format!("{}/v2/providers", self.base_url)
    }

    async fn fetch_inner(&self, validator: Option<&str>) -> Result<CatalogFetch> {
        let url = self.providers_url();
        let mut request = self.client.get(&url);
        if let Some(etag) = validator {
            request = request.header(IF_NONE_MATCH, etag);
        }

        tracing::debug!(url = %url, conditional = validator.is_some(), "Fetching catalog");
        let response = request.send().await.map_err(|e| {
            map_send_error(&e, "catalog", self.timeout, |reason| {
                McatError::CatalogUnavailable {
                    location: url.clone(),
                    reason,
                }
            })
        })?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            tracing::debug!(url = %url, "Catalog not modified");
            return Ok(CatalogFetch::NotModified);
        }
        if !status.is_success() {
            return Err(McatError::CatalogUnavailable {
                location: url,
                reason: format!("HTTP {status}"),
            });
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let providers: Vec<Provider> =
            response
                .json()
                .await
                .map_err(|e| McatError::CatalogUnavailable {
                    location: url.clone(),
                    reason: format!("invalid catalog payload: {e}"),
                })?;

        tracing::debug!(
            url = %url,
            providers = providers.len(),
            etag = etag.as_deref().unwrap_or("-"),
            "Catalog fetched"
        );
        Ok(CatalogFetch::Fresh { providers, etag })
    }
}

impl CatalogSource for HttpCatalogSource {
    fn location(&self) -> String {
        self.base_url.clone()
    }

    fn fetch<'a>(&'a self, validator: Option<&'a str>) -> FetchFuture<'a> {
        Box::pin(self.fetch_inner(validator))
    }
}

/// Catalog read from a local JSON file (same shape as the HTTP payload).
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileCatalogSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn cacheable(&self) -> bool {
        false
    }

    fn fetch<'a>(&'a self, _validator: Option<&'a str>) -> FetchFuture<'a> {
        Box::pin(async move {
            let location = self.location();
            let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                McatError::CatalogUnavailable {
                    location: location.clone(),
                    reason: e.to_string(),
                }
            })?;
            let providers: Vec<Provider> =
                serde_json::from_str(&content).map_err(|e| McatError::CatalogUnavailable {
                    location,
                    reason: format!("invalid catalog payload: {e}"),
                })?;
            Ok(CatalogFetch::Fresh {
                providers,
                etag: None,
            })
        })
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Where the loaded providers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogOrigin {
    /// Fetched from the source.
    Source,
    /// Cache was within its TTL; no request made.
    Cache,
    /// Source answered "not modified"; cached copy reused.
    Revalidated,
}

/// An immutable catalog snapshot.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub providers: Vec<Provider>,
    pub etag: Option<String>,
    pub origin: CatalogOrigin,
}

impl Catalog {
    /// All (model, provider) entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> Vec<CatalogEntry<'_>> {
        entries(&self.providers)
    }
}

/// Options for [`load_catalog`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Skip reading the cache and fetch unconditionally.
    pub bypass_cache: bool,
    /// Serve the cache without a request while it is younger than this.
    pub cache_ttl: Duration,
}

/// Load the catalog through the cache.
///
/// A fresh cache entry is served as-is. Otherwise the cached ETag (if any)
/// is sent as validator; "not modified" reuses the cached providers. Fetch
/// failures are never masked by stale cache data.
///
/// # Errors
///
/// Returns `CatalogUnavailable` or `Timeout` when the source fails.
pub async fn load_catalog(
    source: &dyn CatalogSource,
    cache: Option<&CatalogCache>,
    options: LoadOptions,
) -> Result<Catalog> {
    let cache = cache.filter(|_| source.cacheable());
    let cached: Option<CatalogCacheEntry> = match cache {
        Some(c) if !options.bypass_cache => c.read(&source.location()),
        _ => None,
    };

    if let Some(entry) = &cached
        && entry.is_fresh(options.cache_ttl)
    {
        tracing::debug!(location = %source.location(), "Serving catalog from fresh cache");
        return Ok(Catalog {
            providers: entry.providers.clone(),
            etag: entry.etag.clone(),
            origin: CatalogOrigin::Cache,
        });
    }

    let validator = cached.as_ref().and_then(|e| e.etag.as_deref());
    let fetched = source.fetch(validator).await?;
    match fetched {
        CatalogFetch::Fresh { providers, etag } => {
            if let Some(c) = cache
                && let Err(e) = c.write(&source.location(), &providers, etag.as_deref())
            {
                tracing::warn!(error = %e, "Failed to write catalog cache");
            }
            Ok(Catalog {
                providers,
                etag,
                origin: CatalogOrigin::Source,
            })
        }
        CatalogFetch::NotModified => {
            let Some(entry) = cached else {
                return Err(McatError::CatalogUnavailable {
                    location: source.location(),
                    reason: "not modified, but no cached copy exists".to_string(),
                });
            };
            if let Some(c) = cache
                && let Err(e) = c.touch(&source.location(), &entry)
            {
                tracing::warn!(error = %e, "Failed to refresh catalog cache timestamp");
            }
            Ok(Catalog {
                providers: entry.providers,
                etag: entry.etag,
                origin: CatalogOrigin::Revalidated,
            })
        }
    }
}
