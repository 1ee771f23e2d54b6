//! Ticket editing endpoints.
//!
//! A session is the server-side home of one operator's unsaved ticket. Every
//! mutating handler answers with the resulting [`SessionView`] so the client
//! can redraw the ticket and its total without a second request.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Money, OrderId, PosSession};
use serde::{Deserialize, Serialize};
use store::OrderStore;

use super::AppState;
use super::orders::parse_order_id;
use crate::error::ApiError;
use crate::sessions::SessionId;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct SetCustomerRequest {
    pub customer_name: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub customer_name: String,
    pub editing: Option<OrderId>,
    pub items: Vec<TicketItemView>,
    pub total: Money,
    pub total_display: String,
}

#[derive(Debug, Serialize)]
pub struct TicketItemView {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl SessionView {
    fn new(id: SessionId, session: &PosSession) -> Self {
        let total = session.ticket.total();
        Self {
            id,
            customer_name: session.customer_name.clone(),
            editing: session.editing,
            items: session
                .ticket
                .iter()
                .map(|(name, entry)| TicketItemView {
                    product_name: name.to_string(),
                    quantity: entry.quantity,
                    unit_price: entry.unit_price,
                    subtotal: entry.subtotal(),
                })
                .collect(),
            total,
            total_display: total.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct SavedResponse {
    pub order_id: OrderId,
    pub updated: bool,
}

// -- Handlers --

/// POST /sessions: open an empty session.
#[tracing::instrument(skip(state))]
pub async fn open<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> (StatusCode, Json<SessionView>) {
    let id = state.sessions.open().await;
    (
        StatusCode::CREATED,
        Json(SessionView::new(id, &PosSession::new())),
    )
}

/// GET /sessions/:id: the ticket with its running total.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(SessionView::new(id, &session)))
}

/// POST /sessions/:id/items: add units of a catalog product at its current price.
#[tracing::instrument(skip(state, req), fields(product = %req.product_name, quantity = req.quantity))]
pub async fn add_item<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let product = state
        .catalog_service
        .find_active(&req.product_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", req.product_name)))?;

    let view = update_session(&state, id, |session| {
        session.ticket.add(product.name, req.quantity, product.price)?;
        Ok::<_, ApiError>(SessionView::new(id, session))
    })
    .await??;
    Ok(Json(view))
}

/// POST /sessions/:id/items/:name/decrease: take one unit off.
#[tracing::instrument(skip(state))]
pub async fn decrease_item<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let view = update_session(&state, id, |session| {
        session.ticket.decrease(&name);
        SessionView::new(id, session)
    })
    .await?;
    Ok(Json(view))
}

/// DELETE /sessions/:id/items/:name: drop the entry regardless of quantity.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let view = update_session(&state, id, |session| {
        session.ticket.remove(&name);
        SessionView::new(id, session)
    })
    .await?;
    Ok(Json(view))
}

/// PUT /sessions/:id/customer: set the name the order will be saved under.
#[tracing::instrument(skip(state, req))]
pub async fn set_customer<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<SetCustomerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let view = update_session(&state, id, |session| {
        session.customer_name = req.customer_name;
        SessionView::new(id, session)
    })
    .await?;
    Ok(Json(view))
}

/// POST /sessions/:id/save: persist the ticket and reset the session.
///
/// The session stays locked until the store call returns. Answers 201 for a
/// new order and 200 when an edited order was overwritten.
#[tracing::instrument(skip(state))]
pub async fn save<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SavedResponse>), ApiError> {
    let id = parse_session_id(&id)?;
    let handle = state
        .sessions
        .handle(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let mut session = handle.lock().await;
    let updated = session.is_editing();

    let order_id = state.order_service.save_session(&mut session).await?;

    let status = if updated {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(SavedResponse { order_id, updated })))
}

/// POST /sessions/:id/edit/:order_id: load a saved order into the session.
///
/// Whatever the session held before is discarded.
#[tracing::instrument(skip(state))]
pub async fn edit_order<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, order_id)): Path<(String, String)>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&id)?;
    let order_id = parse_order_id(&order_id)?;
    let handle = state
        .sessions
        .handle(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let mut session = handle.lock().await;

    *session = state.order_service.load_for_edit(order_id).await?;
    Ok(Json(SessionView::new(id, &session)))
}

/// DELETE /sessions/:id: close the session, dropping its unsaved ticket.
#[tracing::instrument(skip(state))]
pub async fn close<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if state.sessions.close(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

async fn update_session<S: OrderStore, R>(
    state: &AppState<S>,
    id: SessionId,
    f: impl FnOnce(&mut PosSession) -> R,
) -> Result<R, ApiError> {
    state
        .sessions
        .update(id, f)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: SessionId) -> ApiError {
    ApiError::NotFound(format!("Session {id} not found"))
}

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid session ID format: {e}")))?;
    Ok(SessionId::from(uuid))
}
