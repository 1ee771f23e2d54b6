//! Shared value types used by every crate in the point-of-sale workspace.

mod money;
mod types;

pub use money::Money;
pub use types::{CustomerId, OrderId, ProductId};
