//! Catalog and menu endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::MenuSection;
use serde::Serialize;
use store::{OrderStore, Product};

use super::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct SeedResponse {
    pub inserted: usize,
}

/// POST /catalog/seed: append the starter catalog.
#[tracing::instrument(skip(state))]
pub async fn seed<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    let inserted = state.catalog_service.seed().await?;
    Ok((StatusCode::CREATED, Json(SeedResponse { inserted })))
}

/// GET /products: purchasable products in id order.
#[tracing::instrument(skip(state))]
pub async fn products<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog_service.products().await?))
}

/// GET /menu: purchasable products grouped into menu sections.
#[tracing::instrument(skip(state))]
pub async fn menu<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<MenuSection>>, ApiError> {
    Ok(Json(state.catalog_service.menu().await?))
}
