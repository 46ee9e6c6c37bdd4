//! Last-known-good catalog snapshot at ~/.sigorigin/catalog.json.
//!
//! Written after every successful fetch, read when the remote feed is
//! unreachable. There is no TTL: a stale snapshot beats none.

use super::types::{CatalogError, CatalogSnapshot, SnapshotOrigin};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed snapshot store.
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Cache at the default location.
    pub fn new() -> Self {
        Self { path: Self::default_path() }
    }

    /// Cache at a specific path (config override, tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sigorigin")
            .join("catalog.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored snapshot, tagged as coming from cache.
    /// `Ok(None)` when nothing has been stored yet.
    pub fn load(&self) -> Result<Option<CatalogSnapshot>, CatalogError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut snapshot: CatalogSnapshot = serde_json::from_str(&data)?;
        snapshot.origin = SnapshotOrigin::Cache;
        debug!(path = %self.path.display(), records = snapshot.len(), "loaded cached catalog");
        Ok(Some(snapshot))
    }

    /// Persist a snapshot, replacing whatever was there.
    pub fn store(&self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), records = snapshot.len(), "stored catalog snapshot");
        Ok(())
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
