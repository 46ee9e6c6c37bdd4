//! Core types for the orbital-element catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One satellite's three-line element set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TleRecord {
    pub name: String,
    /// NORAD catalog number as printed on line 1 (e.g. "25544U").
    pub catalog_number: String,
    pub line1: String,
    pub line2: String,
}

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotOrigin {
    Remote,
    Cache,
}

impl fmt::Display for SnapshotOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "Remote"),
            Self::Cache => write!(f, "Cache"),
        }
    }
}

/// The catalog as of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub records: Vec<TleRecord>,
    /// Unix milliseconds of the fetch that produced these records.
    pub fetched_at_ms: i64,
    pub origin: SnapshotOrigin,
}

impl CatalogSnapshot {
    pub fn new(records: Vec<TleRecord>, origin: SnapshotOrigin) -> Self {
        Self {
            records,
            fetched_at_ms: chrono::Utc::now().timestamp_millis(),
            origin,
        }
    }

    /// Look up a record by catalog number.
    pub fn find(&self, catalog_number: &str) -> Option<&TleRecord> {
        self.records.iter().find(|r| r.catalog_number == catalog_number)
    }

    /// Records for the given catalog numbers, in request order.
    pub fn select<S: AsRef<str>>(&self, catalog_numbers: &[S]) -> Result<Vec<TleRecord>, CatalogError> {
        catalog_numbers
            .iter()
            .map(|n| {
                self.find(n.as_ref())
                    .cloned()
                    .ok_or_else(|| CatalogError::NotFound(n.as_ref().to_string()))
            })
            .collect()
    }

    /// (name, catalog number) pairs for listing.
    pub fn listing(&self) -> Vec<(&str, &str)> {
        self.records
            .iter()
            .map(|r| (r.name.as_str(), r.catalog_number.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid catalog data at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("satellite not found in catalog: '{0}'")]
    NotFound(String),

    #[error("no catalog snapshot available (offline and nothing cached)")]
    NoSnapshot,

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache format error: {0}")]
    Format(#[from] serde_json::Error),
}
