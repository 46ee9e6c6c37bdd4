//! Application configuration at ~/.sigorigin/config.json.
//!
//! Every field is optional in the file. A missing file means defaults.

use crate::catalog::{CatalogResolver, CelestrakFetcher, SnapshotCache, DEFAULT_CATALOG_URL};
use crate::estimator::{LongitudeAnchor, SolverConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog_url: String,
    /// Overrides ~/.sigorigin/catalog.json.
    pub cache_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub degeneracy_epsilon: f64,
    pub anchor: LongitudeAnchor,
    pub offline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            cache_path: None,
            fetch_timeout_secs: 10,
            degeneracy_epsilon: 0.0,
            anchor: LongitudeAnchor::default(),
            offline: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sigorigin")
            .join("config.json")
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path. Missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        let config: Self = serde_json::from_str(&data)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.degeneracy_epsilon.is_finite() || self.degeneracy_epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "degeneracy_epsilon must be finite and >= 0, got {}",
                self.degeneracy_epsilon
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn solver(&self) -> SolverConfig {
        SolverConfig::default()
            .with_epsilon(self.degeneracy_epsilon)
            .with_anchor(self.anchor)
    }

    /// Catalog resolver wired to this configuration's feed, cache and offline flag.
    pub fn catalog_resolver(&self) -> CatalogResolver {
        let fetcher = CelestrakFetcher::new(
            self.catalog_url.clone(),
            Duration::from_secs(self.fetch_timeout_secs),
        );
        let cache = match &self.cache_path {
            Some(p) => SnapshotCache::at(p.clone()),
            None => SnapshotCache::new(),
        };
        let mut resolver = CatalogResolver::with_parts(fetcher, cache);
        resolver.set_offline(self.offline);
        resolver
    }
}
