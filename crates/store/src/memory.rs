use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::model::lines_total;
use crate::{
    Customer, CustomerId, Money, NewOrderLine, NewProduct, OrderId, OrderLineView, OrderStatus,
    OrderStore, OrderSummary, Product, ProductId, Result, StoreError,
};

#[derive(Debug, Clone)]
struct OrderRow {
    customer_id: CustomerId,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct LineRow {
    order_id: OrderId,
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
    subtotal: Money,
}

#[derive(Debug, Default)]
struct Tables {
    customers: Vec<Customer>,
    products: Vec<Product>,
    orders: BTreeMap<OrderId, OrderRow>,
    lines: Vec<LineRow>,
    last_customer_id: i64,
    last_product_id: i64,
    last_order_id: i64,
}

impl Tables {
    fn customer_id_for(&mut self, name: &str) -> CustomerId {
        if let Some(existing) = self.customers.iter().find(|c| c.name == name) {
            return existing.id;
        }
        self.last_customer_id += 1;
        let id = CustomerId::new(self.last_customer_id);
        self.customers.push(Customer {
            id,
            name: name.to_string(),
        });
        id
    }

    fn insert_order(&mut self, customer_id: CustomerId, total: Money) -> OrderId {
        self.last_order_id += 1;
        let id = OrderId::new(self.last_order_id);
        self.orders.insert(
            id,
            OrderRow {
                customer_id,
                total,
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Checks the same constraints the SQL schema enforces on a line.
    fn check_line(&self, order_id: OrderId, line: &NewOrderLine) -> Result<()> {
        line.validate()?;
        if !self.orders.contains_key(&order_id) {
            return Err(StoreError::OrderNotFound(order_id));
        }
        if !self.products.iter().any(|p| p.id == line.product_id) {
            return Err(StoreError::ProductNotFound(line.product_id));
        }
        Ok(())
    }

    fn push_line(&mut self, order_id: OrderId, line: &NewOrderLine) {
        self.lines.push(LineRow {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal(),
        });
    }

    fn summary(&self, id: OrderId, row: &OrderRow) -> Option<OrderSummary> {
        let customer = self.customers.iter().find(|c| c.id == row.customer_id)?;
        Some(OrderSummary {
            id,
            customer_name: customer.name.clone(),
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

/// In-memory order store implementation for testing.
///
/// Mirrors the SQLite implementation: surrogate ids are assigned
/// sequentially, joins drop rows whose parent is missing, and multi-row
/// operations run under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of customer rows.
    pub async fn customer_count(&self) -> usize {
        self.tables.read().await.customers.len()
    }

    /// Returns the number of order line rows across all orders.
    pub async fn line_count(&self) -> usize {
        self.tables.read().await.lines.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<ProductId>> {
        if let Some(bad) = products.iter().find(|p| p.price.is_negative()) {
            return Err(StoreError::InvalidData(format!(
                "product '{}' has negative price {}",
                bad.name, bad.price
            )));
        }

        let mut tables = self.tables.write().await;
        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            tables.last_product_id += 1;
            let id = ProductId::new(tables.last_product_id);
            tables.products.push(Product {
                id,
                name: product.name.clone(),
                price: product.price,
                active: true,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    async fn list_active_products(&self) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect())
    }

    async fn set_product_active(&self, product_id: ProductId, active: bool) -> Result<()> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or(StoreError::ProductNotFound(product_id))?;
        product.active = active;
        Ok(())
    }

    async fn count_products(&self) -> Result<u64> {
        Ok(self.tables.read().await.products.len() as u64)
    }

    async fn get_or_create_customer(&self, name: &str) -> Result<CustomerId> {
        Ok(self.tables.write().await.customer_id_for(name))
    }

    async fn create_order(&self, customer_id: CustomerId, total: Money) -> Result<OrderId> {
        let mut tables = self.tables.write().await;
        if !tables.customers.iter().any(|c| c.id == customer_id) {
            return Err(StoreError::CustomerNotFound(customer_id));
        }
        Ok(tables.insert_order(customer_id, total))
    }

    async fn add_order_line(&self, order_id: OrderId, line: &NewOrderLine) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.check_line(order_id, line)?;
        tables.push_line(order_id, line);
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .rev()
            .filter_map(|(id, row)| tables.summary(*id, row))
            .collect())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderSummary>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .get(&order_id)
            .and_then(|row| tables.summary(order_id, row)))
    }

    async fn get_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLineView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .filter_map(|l| {
                let product = tables.products.iter().find(|p| p.id == l.product_id)?;
                Some(OrderLineView {
                    product_name: product.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    subtotal: l.subtotal,
                })
            })
            .collect())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.lines.retain(|l| l.order_id != order_id);
        Ok(tables.orders.remove(&order_id).is_some())
    }

    async fn delete_order_lines(&self, order_id: OrderId) -> Result<()> {
        self.tables
            .write()
            .await
            .lines
            .retain(|l| l.order_id != order_id);
        Ok(())
    }

    async fn update_order_total(&self, order_id: OrderId, total: Money) -> Result<()> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        order.total = total;
        Ok(())
    }

    async fn place_order(&self, customer_name: &str, lines: &[NewOrderLine]) -> Result<OrderId> {
        let mut tables = self.tables.write().await;

        for line in lines {
            line.validate()?;
            if !tables.products.iter().any(|p| p.id == line.product_id) {
                return Err(StoreError::ProductNotFound(line.product_id));
            }
        }

        let customer_id = tables.customer_id_for(customer_name);
        let order_id = tables.insert_order(customer_id, lines_total(lines));
        for line in lines {
            tables.push_line(order_id, line);
        }
        Ok(order_id)
    }

    async fn replace_order_lines(&self, order_id: OrderId, lines: &[NewOrderLine]) -> Result<()> {
        let mut tables = self.tables.write().await;

        for line in lines {
            tables.check_line(order_id, line)?;
        }
        if !tables.orders.contains_key(&order_id) {
            return Err(StoreError::OrderNotFound(order_id));
        }

        tables.lines.retain(|l| l.order_id != order_id);
        if let Some(order) = tables.orders.get_mut(&order_id) {
            order.total = lines_total(lines);
        }
        for line in lines {
            tables.push_line(order_id, line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> (InMemoryOrderStore, Vec<ProductId>) {
        let store = InMemoryOrderStore::new();
        let ids = store
            .insert_products(&[
                NewProduct::new("Pupusa de Queso", Money::from_cents(75)),
                NewProduct::new("Soda Fanta", Money::from_cents(100)),
            ])
            .await
            .unwrap();
        (store, ids)
    }

    #[tokio::test]
    async fn get_or_create_customer_is_stable() {
        let store = InMemoryOrderStore::new();
        let first = store.get_or_create_customer("Ana").await.unwrap();
        let second = store.get_or_create_customer("Ana").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.customer_count().await, 1);
    }

    #[tokio::test]
    async fn place_order_stores_header_and_lines() {
        let (store, ids) = seeded_store().await;
        let order_id = store
            .place_order(
                "Ana",
                &[
                    NewOrderLine::new(ids[0], 2, Money::from_cents(75)),
                    NewOrderLine::new(ids[1], 1, Money::from_cents(100)),
                ],
            )
            .await
            .unwrap();

        let summary = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(summary.customer_name, "Ana");
        assert_eq!(summary.total, Money::from_cents(250));
        assert_eq!(summary.status, OrderStatus::Pending);
        assert_eq!(store.get_order_lines(order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn place_order_with_unknown_product_writes_nothing() {
        let (store, ids) = seeded_store().await;
        let result = store
            .place_order(
                "Ana",
                &[
                    NewOrderLine::new(ids[0], 1, Money::from_cents(75)),
                    NewOrderLine::new(ProductId::new(999), 1, Money::from_cents(100)),
                ],
            )
            .await;

        assert!(matches!(result, Err(StoreError::ProductNotFound(_))));
        assert!(store.list_orders().await.unwrap().is_empty());
        assert_eq!(store.customer_count().await, 0);
        assert_eq!(store.line_count().await, 0);
    }

    #[tokio::test]
    async fn add_line_to_missing_order_fails() {
        let (store, ids) = seeded_store().await;
        let result = store
            .add_order_line(
                OrderId::new(1),
                &NewOrderLine::new(ids[0], 1, Money::from_cents(75)),
            )
            .await;
        assert!(matches!(result, Err(StoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn inactive_products_are_not_listed() {
        let (store, ids) = seeded_store().await;
        store.set_product_active(ids[0], false).await.unwrap();

        let names: Vec<_> = store
            .list_active_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Soda Fanta"]);
        assert_eq!(store.count_products().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_orders_is_most_recent_first() {
        let (store, ids) = seeded_store().await;
        let line = NewOrderLine::new(ids[0], 1, Money::from_cents(75));
        let first = store.place_order("Ana", &[line.clone()]).await.unwrap();
        let second = store.place_order("Luis", &[line]).await.unwrap();

        let ids: Vec<_> = store
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn order_for_missing_customer_fails() {
        let store = InMemoryOrderStore::new();
        let result = store
            .create_order(CustomerId::new(77), Money::from_cents(100))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::CustomerNotFound(id)) if id == CustomerId::new(77)
        ));
        assert!(store.list_orders().await.unwrap().is_empty());
    }
}
