//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError, TicketError};
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::Order(order_err) => match order_err {
            OrderError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            OrderError::CustomerNameRequired
            | OrderError::EmptyTicket
            | OrderError::UnknownProduct { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::Ticket(TicketError::InvalidQuantity { .. }) => StatusCode::BAD_REQUEST,
        DomainError::Store(store_err) => match store_err {
            StoreError::OrderNotFound(_)
            | StoreError::ProductNotFound(_)
            | StoreError::CustomerNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidData(_) => StatusCode::BAD_REQUEST,
            StoreError::Database(_) => {
                tracing::error!(error = %err, "database failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        ApiError::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CustomerId, OrderId};

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            status_of(DomainError::Order(OrderError::CustomerNameRequired).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                TicketError::InvalidQuantity {
                    product_name: "Café".to_string(),
                    quantity: 0,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_orders_are_not_found() {
        assert_eq!(
            status_of(DomainError::Order(OrderError::OrderNotFound(OrderId::new(9))).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Store(StoreError::OrderNotFound(OrderId::new(9))).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn missing_customer_is_not_found() {
        assert_eq!(
            status_of(DomainError::Store(StoreError::CustomerNotFound(CustomerId::new(3))).into()),
            StatusCode::NOT_FOUND
        );
    }
}
