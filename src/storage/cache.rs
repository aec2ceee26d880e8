//! On-disk cache for catalog snapshots.
//!
//! Each catalog location gets one JSON file holding the provider list, the
//! ETag the server returned with it, and when it was written.
//!
//! # Features
//! - Atomic writes using temp file + rename (prevents corruption)
//! - TTL-based freshness so repeated invocations skip the network
//! - Graceful degradation on missing/corrupt cache

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::catalog::Provider;
use crate::error::Result;

/// Default time a cached catalog is served without revalidation.
pub const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// One cached catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCacheEntry {
    pub location: String,
    pub etag: Option<String>,
    pub cached_at: DateTime<Utc>,
    pub providers: Vec<Provider>,
}

impl CatalogCacheEntry {
    /// Age of the entry.
    #[must_use]
    pub fn age(&self) -> Duration {
        let age = Utc::now() - self.cached_at;
        Duration::from_secs(u64::try_from(age.num_seconds()).unwrap_or(0))
    }

    /// Whether the entry is younger than `ttl`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Catalog cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    dir: PathBuf,
}

impl CatalogCache {
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Cache file for a catalog location.
    #[must_use]
    pub fn path_for(&self, location: &str) -> PathBuf {
        let name: String = location
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    /// Read the cached entry for a location.
    ///
    /// Missing or unreadable files yield `None`; a corrupt file is logged
    /// and treated as absent.
    #[must_use]
    pub fn read(&self, location: &str) -> Option<CatalogCacheEntry> {
        let path = self.path_for(location);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CatalogCacheEntry>(&content) {
            Ok(entry) if entry.location == location => Some(entry),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt catalog cache");
                None
            }
        }
    }

    /// Store a freshly fetched catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written.
    pub fn write(&self, location: &str, providers: &[Provider], etag: Option<&str>) -> Result<()> {
        let entry = CatalogCacheEntry {
            location: location.to_string(),
            etag: etag.map(str::to_string),
            cached_at: Utc::now(),
            providers: providers.to_vec(),
        };
        self.store(&entry)
    }

    /// Re-stamp an entry after the server confirmed it is current.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn touch(&self, location: &str, entry: &CatalogCacheEntry) -> Result<()> {
        let mut refreshed = entry.clone();
        refreshed.location = location.to_string();
        refreshed.cached_at = Utc::now();
        self.store(&refreshed)
    }

    fn store(&self, entry: &CatalogCacheEntry) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(entry)?;
        write_atomic(&self.path_for(&entry.location), content.as_bytes())?;
        Ok(())
    }
}

/// Write bytes atomically using temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Temp file must share the directory for the rename to be atomic
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("cache"),
        std::process::id()
    ));

    {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)
}
