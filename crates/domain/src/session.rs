//! Interaction context owned by one operator at the till.

use serde::{Deserialize, Serialize};

use crate::{OrderId, Ticket};

/// Everything one operator has entered but not yet saved.
///
/// A session starts empty. Loading a saved order for editing fills the ticket
/// and remembers which order a save should overwrite; a successful save
/// resets the session back to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosSession {
    pub ticket: Ticket,
    pub customer_name: String,
    /// The saved order the ticket was loaded from, if any.
    pub editing: Option<OrderId>,
}

impl PosSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that edits an existing order.
    pub fn editing(order_id: OrderId, customer_name: impl Into<String>, ticket: Ticket) -> Self {
        Self {
            ticket,
            customer_name: customer_name.into(),
            editing: Some(order_id),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Discards the ticket, the customer name and the editing target.
    pub fn reset(&mut self) {
        self.ticket.clear();
        self.customer_name.clear();
        self.editing = None;
    }
}
