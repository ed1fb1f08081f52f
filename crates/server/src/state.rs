use std::sync::Arc;

use autoprint_core::{Config, PrintShop, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    shop: Arc<PrintShop>,
}

impl AppState {
    pub fn new(config: Config, shop: Arc<PrintShop>) -> Self {
        Self { config, shop }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn shop(&self) -> &PrintShop {
        &self.shop
    }
}
