//! Saved order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{OrderDetails, OrderId};
use store::{OrderStore, OrderSummary};

use super::AppState;
use crate::error::ApiError;

/// GET /orders: saved orders, most recent first.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    Ok(Json(state.order_service.list_orders().await?))
}

/// GET /orders/:id: one order with its lines.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetails>, ApiError> {
    let order_id = parse_order_id(&id)?;
    Ok(Json(state.order_service.get_order(order_id).await?))
}

/// DELETE /orders/:id: remove an order and its lines.
#[tracing::instrument(skip(state))]
pub async fn delete<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    if state.order_service.delete_order(order_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Order {id} not found")))
    }
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse::<i64>()
        .map(OrderId::new)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID format: {e}")))
}
