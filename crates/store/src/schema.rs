//! SQLite schema for the point of sale.
//!
//! Tables:
//! - `customers`: one row per distinct customer name
//! - `products`: the catalog, soft-disabled through `active`
//! - `orders`: order headers with a cached total
//! - `order_lines`: products sold under an order
//!
//! Deleting an order does not cascade; callers remove its lines first.

/// DDL for all tables. Safe to run on every startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
    active      INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS orders (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER NOT NULL REFERENCES customers(id),
    total_cents INTEGER NOT NULL,
    status      TEXT NOT NULL DEFAULT 'pending',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS order_lines (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id         INTEGER NOT NULL REFERENCES orders(id),
    product_id       INTEGER NOT NULL REFERENCES products(id),
    quantity         INTEGER NOT NULL CHECK (quantity > 0),
    unit_price_cents INTEGER NOT NULL,
    subtotal_cents   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_lines_order_id
    ON order_lines(order_id);
"#;
