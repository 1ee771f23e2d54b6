//! HTTP API server for the pupuseria point of sale.
//!
//! Exposes the catalog, per-operator ticket sessions and saved orders as
//! JSON endpoints, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: OrderStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/catalog/seed", post(routes::catalog::seed::<S>))
        .route("/products", get(routes::catalog::products::<S>))
        .route("/menu", get(routes::catalog::menu::<S>))
        .route("/sessions", post(routes::sessions::open::<S>))
        .route(
            "/sessions/{id}",
            get(routes::sessions::get::<S>).delete(routes::sessions::close::<S>),
        )
        .route("/sessions/{id}/items", post(routes::sessions::add_item::<S>))
        .route(
            "/sessions/{id}/items/{name}",
            delete(routes::sessions::remove_item::<S>),
        )
        .route(
            "/sessions/{id}/items/{name}/decrease",
            post(routes::sessions::decrease_item::<S>),
        )
        .route(
            "/sessions/{id}/customer",
            put(routes::sessions::set_customer::<S>),
        )
        .route("/sessions/{id}/save", post(routes::sessions::save::<S>))
        .route(
            "/sessions/{id}/edit/{order_id}",
            post(routes::sessions::edit_order::<S>),
        )
        .route("/orders", get(routes::orders::list::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).delete(routes::orders::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store.
pub fn create_default_state<S: OrderStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
