//! Domain layer for the pupuseria point of sale.
//!
//! This crate provides:
//! - [`Ticket`], the in-memory cart built before an order is saved
//! - [`PosSession`], the context that owns a ticket between interactions
//! - [`CatalogService`], the starter catalog and the menu layout
//! - [`OrderService`], the multi-step order operations over an
//!   [`store::OrderStore`]

pub mod catalog;
pub mod error;
pub mod order;
pub mod session;
pub mod ticket;

pub use catalog::{CatalogService, MenuSection, STARTER_CATALOG};
pub use common::{CustomerId, Money, OrderId, ProductId};
pub use error::DomainError;
pub use order::{OrderDetails, OrderError, OrderService};
pub use session::PosSession;
pub use ticket::{Ticket, TicketEntry, TicketError};
