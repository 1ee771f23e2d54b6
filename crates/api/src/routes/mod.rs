//! Route handlers, one module per resource.

pub mod catalog;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod sessions;

use domain::{CatalogService, OrderService};
use store::OrderStore;

use crate::sessions::SessionStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub order_service: OrderService<S>,
    pub catalog_service: CatalogService<S>,
    pub sessions: SessionStore,
}

impl<S: OrderStore + Clone> AppState<S> {
    /// Builds services over one store and starts with no open sessions.
    pub fn new(store: S) -> Self {
        Self {
            order_service: OrderService::new(store.clone()),
            catalog_service: CatalogService::new(store),
            sessions: SessionStore::new(),
        }
    }
}
