//! Remote element-set feeds.

use super::tle;
use super::types::{CatalogError, TleRecord};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://celestrak.org/NORAD/elements/stations.txt";
const USER_AGENT: &str = "sigorigin/0.3 (signal-origin-estimator)";

/// Something that can produce a fresh set of element records.
pub trait CatalogFetcher {
    fn fetch(&self) -> Result<Vec<TleRecord>, CatalogError>;
}

/// Plain-text three-line feed over HTTP (CelesTrak layout).
#[derive(Debug, Clone)]
pub struct CelestrakFetcher {
    url: String,
    timeout: Duration,
}

impl CelestrakFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }
}

impl Default for CelestrakFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_CATALOG_URL, Duration::from_secs(10))
    }
}

impl CatalogFetcher for CelestrakFetcher {
    fn fetch(&self) -> Result<Vec<TleRecord>, CatalogError> {
        let response = ureq::get(&self.url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let body = response
            .into_string()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        tle::parse_feed(&body)
    }
}
