use std::sync::Arc;

use souk_catalog::{CatalogService, CatalogStore, StockService};
use souk_order::{LifecycleEngine, OrderStore, PlacementEngine};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Engines are constructed once over the injected store handles; handlers
/// clone the state, never a connection.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub stock: StockService,
    pub placement: PlacementEngine,
    pub lifecycle: LifecycleEngine,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        order_store: Arc<dyn OrderStore>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            catalog: CatalogService::new(catalog_store.clone()),
            stock: StockService::new(catalog_store.clone()),
            placement: PlacementEngine::new(catalog_store, order_store.clone()),
            lifecycle: LifecycleEngine::new(order_store),
            auth,
        }
    }
}
