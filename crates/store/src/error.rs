use thiserror::Error;

use crate::{CustomerId, OrderId, ProductId};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order header exists with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No customer row exists with this id.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// No product row exists with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A value read or about to be written violates the data model.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
