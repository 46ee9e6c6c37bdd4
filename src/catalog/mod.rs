//! Orbital-element catalog for choosing reference satellites.
//!
//! Fetches a three-line element feed, keeps the last good copy on disk,
//! and serves it back when the network is unavailable.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod tle;
pub mod types;

pub use cache::SnapshotCache;
pub use providers::{CatalogFetcher, CelestrakFetcher, DEFAULT_CATALOG_URL};
pub use resolver::{CatalogResolver, SnapshotSource};
pub use types::{CatalogError, CatalogSnapshot, SnapshotOrigin, TleRecord};
