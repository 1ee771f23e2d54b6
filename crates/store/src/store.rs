use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    CustomerId, Money, NewOrderLine, NewProduct, OrderId, OrderLineView, OrderSummary, Product,
    ProductId, Result,
};

/// Core trait for order store implementations.
///
/// Single-statement operations are the raw CRUD primitives. `place_order`,
/// `replace_order_lines` and `delete_order` touch several rows and are applied
/// atomically: either every row changes or none does.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Appends products to the catalog, all marked active.
    ///
    /// Rows are appended even when a product with the same name already
    /// exists. Returns the new ids in input order.
    async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<ProductId>>;

    /// Lists active products ordered by id.
    async fn list_active_products(&self) -> Result<Vec<Product>>;

    /// Sets the `active` flag of a product.
    async fn set_product_active(&self, product_id: ProductId, active: bool) -> Result<()>;

    /// Counts all product rows, active or not.
    async fn count_products(&self) -> Result<u64>;

    /// Returns the id of the customer with exactly this name, inserting it
    /// if absent.
    async fn get_or_create_customer(&self, name: &str) -> Result<CustomerId>;

    /// Inserts an order header with status `pending`.
    async fn create_order(&self, customer_id: CustomerId, total: Money) -> Result<OrderId>;

    /// Inserts one line, storing `quantity * unit_price` as its subtotal.
    ///
    /// Does not touch the order's total.
    async fn add_order_line(&self, order_id: OrderId, line: &NewOrderLine) -> Result<()>;

    /// Lists order headers with customer names, most recent first.
    async fn list_orders(&self) -> Result<Vec<OrderSummary>>;

    /// Loads one order header with its customer name.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderSummary>>;

    /// Lists the lines of an order with product names, in insertion order.
    async fn get_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLineView>>;

    /// Deletes every line of the order, then its header.
    ///
    /// Returns false when no header existed.
    async fn delete_order(&self, order_id: OrderId) -> Result<bool>;

    /// Deletes every line of the order, leaving the header in place.
    async fn delete_order_lines(&self, order_id: OrderId) -> Result<()>;

    /// Overwrites the cached total of an order.
    async fn update_order_total(&self, order_id: OrderId, total: Money) -> Result<()>;

    /// Creates a complete order for a customer name.
    ///
    /// Looks up or creates the customer, inserts the header with the sum of
    /// the line subtotals as total, then inserts the lines.
    async fn place_order(&self, customer_name: &str, lines: &[NewOrderLine]) -> Result<OrderId>;

    /// Replaces the lines of an existing order.
    ///
    /// Deletes the current lines, stores the sum of the new subtotals as the
    /// total, then inserts the new lines. Fails with `OrderNotFound` if the
    /// header does not exist.
    async fn replace_order_lines(&self, order_id: OrderId, lines: &[NewOrderLine]) -> Result<()>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Maps active product names to their ids.
    ///
    /// When the catalog holds several rows with one name, the highest id wins.
    async fn product_ids_by_name(&self) -> Result<HashMap<String, ProductId>> {
        let products = self.list_active_products().await?;
        Ok(products.into_iter().map(|p| (p.name, p.id)).collect())
    }

    /// Checks if an order header exists.
    async fn order_exists(&self, order_id: OrderId) -> Result<bool> {
        Ok(self.get_order(order_id).await?.is_some())
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
