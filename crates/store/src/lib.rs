//! Storage layer for the point of sale.
//!
//! Four relations back the system: customers, products, orders and order
//! lines. [`OrderStore`] is the seam every caller goes through; it is
//! implemented by [`SqliteOrderStore`] for the real database file and by
//! [`InMemoryOrderStore`] for tests.

pub mod error;
pub mod memory;
pub mod model;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use common::{CustomerId, Money, OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use model::{
    Customer, NewOrderLine, NewProduct, OrderLineView, OrderStatus, OrderSummary, Product,
};
pub use sqlite::SqliteOrderStore;
pub use store::{OrderStore, OrderStoreExt};
