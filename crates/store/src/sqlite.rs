use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection};

use crate::model::lines_total;
use crate::schema::SCHEMA;
use crate::{
    CustomerId, Money, NewOrderLine, NewProduct, OrderId, OrderLineView, OrderStatus,
    OrderStore, OrderSummary, Product, ProductId, Result, StoreError,
};

/// SQLite-backed order store implementation.
#[derive(Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Creates a new SQLite order store over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to a database URL such as `sqlite://database.db`.
    ///
    /// The file is created if it does not exist. Foreign keys are enforced.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;
        Self::connect_with(options).await
    }

    /// Opens the database file at `path`, creating it if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path.as_ref());
        Self::connect_with(options).await
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        let options = options.create_if_missing(true).foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    fn row_to_product(row: SqliteRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            active: row.try_get("active")?,
        })
    }

    fn row_to_summary(row: SqliteRow) -> Result<OrderSummary> {
        let status: String = row.try_get("status")?;
        Ok(OrderSummary {
            id: OrderId::new(row.try_get("id")?),
            customer_name: row.try_get("customer_name")?,
            total: Money::from_cents(row.try_get("total_cents")?),
            status: status.parse()?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_line(row: SqliteRow) -> Result<OrderLineView> {
        let quantity: i64 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| StoreError::InvalidData(format!("quantity {quantity} out of range")))?;
        Ok(OrderLineView {
            product_name: row.try_get("product_name")?,
            quantity,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
        })
    }
}

async fn customer_id_for(conn: &mut SqliteConnection, name: &str) -> Result<CustomerId> {
    sqlx::query("INSERT INTO customers (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM customers WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(CustomerId::new(id))
}

/// Reports whether `table` has a row with this id.
///
/// Inserts check their references with this first, so a dangling id comes
/// back as the matching `*NotFound` error in both store implementations.
async fn row_exists(conn: &mut SqliteConnection, table: &'static str, id: i64) -> Result<bool> {
    let found: i64 = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)"
    ))
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(found != 0)
}

async fn insert_order_header(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
    total: Money,
) -> Result<OrderId> {
    if !row_exists(&mut *conn, "customers", customer_id.as_i64()).await? {
        return Err(StoreError::CustomerNotFound(customer_id));
    }

    let result = sqlx::query(
        "INSERT INTO orders (customer_id, total_cents, status, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(customer_id.as_i64())
    .bind(total.cents())
    .bind(OrderStatus::Pending.as_str())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(OrderId::new(result.last_insert_rowid()))
}

async fn insert_line(
    conn: &mut SqliteConnection,
    order_id: OrderId,
    line: &NewOrderLine,
) -> Result<()> {
    line.validate()?;
    if !row_exists(&mut *conn, "orders", order_id.as_i64()).await? {
        return Err(StoreError::OrderNotFound(order_id));
    }
    if !row_exists(&mut *conn, "products", line.product_id.as_i64()).await? {
        return Err(StoreError::ProductNotFound(line.product_id));
    }

    sqlx::query(
        r#"
        INSERT INTO order_lines (order_id, product_id, quantity, unit_price_cents, subtotal_cents)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(order_id.as_i64())
    .bind(line.product_id.as_i64())
    .bind(i64::from(line.quantity))
    .bind(line.unit_price.cents())
    .bind(line.subtotal().cents())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_lines(conn: &mut SqliteConnection, order_id: OrderId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM order_lines WHERE order_id = ?")
        .bind(order_id.as_i64())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

async fn set_total(conn: &mut SqliteConnection, order_id: OrderId, total: Money) -> Result<()> {
    let result = sqlx::query("UPDATE orders SET total_cents = ? WHERE id = ?")
        .bind(total.cents())
        .bind(order_id.as_i64())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::OrderNotFound(order_id));
    }
    Ok(())
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<ProductId>> {
        let mut tx = self.pool.begin().await?;

        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            if product.price.is_negative() {
                return Err(StoreError::InvalidData(format!(
                    "product '{}' has negative price {}",
                    product.name, product.price
                )));
            }
            let result = sqlx::query("INSERT INTO products (name, price_cents) VALUES (?, ?)")
                .bind(&product.name)
                .bind(product.price.cents())
                .execute(&mut *tx)
                .await?;
            ids.push(ProductId::new(result.last_insert_rowid()));
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn list_active_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, price_cents, active FROM products WHERE active = 1 ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn set_product_active(&self, product_id: ProductId, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE products SET active = ? WHERE id = ?")
            .bind(active)
            .bind(product_id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ProductNotFound(product_id));
        }
        Ok(())
    }

    async fn count_products(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn get_or_create_customer(&self, name: &str) -> Result<CustomerId> {
        let mut conn = self.pool.acquire().await?;
        customer_id_for(&mut conn, name).await
    }

    async fn create_order(&self, customer_id: CustomerId, total: Money) -> Result<OrderId> {
        let mut conn = self.pool.acquire().await?;
        insert_order_header(&mut conn, customer_id, total).await
    }

    async fn add_order_line(&self, order_id: OrderId, line: &NewOrderLine) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_line(&mut conn, order_id, line).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, c.name AS customer_name, o.total_cents, o.status, o.created_at
            FROM orders o
            JOIN customers c ON o.customer_id = c.id
            ORDER BY o.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_summary).collect()
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<OrderSummary>> {
        let row: Option<SqliteRow> = sqlx::query(
            r#"
            SELECT o.id, c.name AS customer_name, o.total_cents, o.status, o.created_at
            FROM orders o
            JOIN customers c ON o.customer_id = c.id
            WHERE o.id = ?
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_summary).transpose()
    }

    async fn get_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLineView>> {
        let rows = sqlx::query(
            r#"
            SELECT p.name AS product_name, l.quantity, l.unit_price_cents, l.subtotal_cents
            FROM order_lines l
            JOIN products p ON p.id = l.product_id
            WHERE l.order_id = ?
            ORDER BY l.id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        delete_lines(&mut tx, order_id).await?;
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_order_lines(&self, order_id: OrderId) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        delete_lines(&mut conn, order_id).await?;
        Ok(())
    }

    async fn update_order_total(&self, order_id: OrderId, total: Money) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        set_total(&mut conn, order_id, total).await
    }

    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn place_order(&self, customer_name: &str, lines: &[NewOrderLine]) -> Result<OrderId> {
        let mut tx = self.pool.begin().await?;

        let customer_id = customer_id_for(&mut tx, customer_name).await?;
        let order_id = insert_order_header(&mut tx, customer_id, lines_total(lines)).await?;
        for line in lines {
            insert_line(&mut tx, order_id, line).await?;
        }

        tx.commit().await?;
        tracing::debug!(%order_id, %customer_id, "order placed");
        Ok(order_id)
    }

    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn replace_order_lines(&self, order_id: OrderId, lines: &[NewOrderLine]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = delete_lines(&mut tx, order_id).await?;
        set_total(&mut tx, order_id, lines_total(lines)).await?;
        for line in lines {
            insert_line(&mut tx, order_id, line).await?;
        }

        tx.commit().await?;
        tracing::debug!(%order_id, removed, "order lines replaced");
        Ok(())
    }
}
