//! Domain error types.

use store::StoreError;
use thiserror::Error;

use crate::order::OrderError;
use crate::ticket::TicketError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the order store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An order could not be saved, loaded or changed.
    #[error("Order error: {0}")]
    Order(OrderError),

    /// A ticket mutation was rejected.
    #[error("Ticket error: {0}")]
    Ticket(#[from] TicketError),
}
