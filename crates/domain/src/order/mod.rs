//! Saving, editing and removing orders.

mod service;

pub use service::{OrderDetails, OrderService};

use thiserror::Error;

use crate::OrderId;

/// Validation and lookup failures of order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The customer name is empty or only whitespace.
    #[error("Customer name is required")]
    CustomerNameRequired,

    /// The ticket has no entries.
    #[error("Ticket is empty")]
    EmptyTicket,

    /// A ticket entry names a product that is not in the active catalog.
    #[error("Unknown product: {name}")]
    UnknownProduct { name: String },

    /// No order exists with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),
}
