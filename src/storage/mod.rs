//! Storage for configuration and the catalog cache.

pub mod cache;
pub mod config;
pub mod paths;

pub use cache::{CatalogCache, CatalogCacheEntry, DEFAULT_CATALOG_TTL_SECS};
pub use config::{
    CatalogLocation, Config, ConfigReport, ConfigSource, ConfigSources, DisplayLimits,
    ResolvedConfig,
};
pub use paths::AppPaths;
