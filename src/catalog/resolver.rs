//! Catalog resolver: fresh feed when reachable, else last-known-good snapshot.
//!
//! Online:   fetch → store in cache → return (Remote)
//!           fetch fails → cached snapshot (Cache) → NoSnapshot
//! Offline:  cached snapshot (Cache) → NoSnapshot

use super::cache::SnapshotCache;
use super::providers::{CatalogFetcher, CelestrakFetcher};
use super::types::{CatalogError, CatalogSnapshot, SnapshotOrigin};
use tracing::{info, warn};

/// Single accessor for "the catalog as of now".
pub trait SnapshotSource {
    fn current_snapshot(&mut self) -> Result<CatalogSnapshot, CatalogError>;
}

pub struct CatalogResolver<F: CatalogFetcher = CelestrakFetcher> {
    fetcher: F,
    cache: SnapshotCache,
    offline: bool,
}

impl CatalogResolver<CelestrakFetcher> {
    /// Default feed and default cache location.
    pub fn new() -> Self {
        Self::with_parts(CelestrakFetcher::default(), SnapshotCache::new())
    }
}

impl Default for CatalogResolver<CelestrakFetcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CatalogFetcher> CatalogResolver<F> {
    pub fn with_parts(fetcher: F, cache: SnapshotCache) -> Self {
        Self { fetcher, cache, offline: false }
    }

    /// Offline mode: never touch the network.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    fn fresh(&self) -> Result<CatalogSnapshot, CatalogError> {
        let records = self.fetcher.fetch()?;
        let snapshot = CatalogSnapshot::new(records, SnapshotOrigin::Remote);
        if let Err(e) = self.cache.store(&snapshot) {
            warn!(error = %e, "could not persist catalog snapshot");
        }
        Ok(snapshot)
    }

    fn last_known_good(&self) -> Result<CatalogSnapshot, CatalogError> {
        self.cache.load()?.ok_or(CatalogError::NoSnapshot)
    }
}

impl<F: CatalogFetcher> SnapshotSource for CatalogResolver<F> {
    fn current_snapshot(&mut self) -> Result<CatalogSnapshot, CatalogError> {
        if !self.offline {
            match self.fresh() {
                Ok(snapshot) => {
                    info!(records = snapshot.len(), "fetched fresh catalog");
                    return Ok(snapshot);
                }
                Err(e) => warn!(error = %e, "catalog fetch failed, falling back to cache"),
            }
        }

        let snapshot = self.last_known_good()?;
        info!(records = snapshot.len(), fetched_at_ms = snapshot.fetched_at_ms, "using cached catalog");
        Ok(snapshot)
    }
}
