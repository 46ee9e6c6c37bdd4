use crate::catalog::CatalogResolver;
use crate::config::AppConfig;
use std::sync::Mutex;

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Mutex<CatalogResolver>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let catalog = Mutex::new(config.catalog_resolver());
        Self { config, catalog }
    }
}
