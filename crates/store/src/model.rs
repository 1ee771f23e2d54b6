//! Row types read from and written to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CustomerId, Money, OrderId, ProductId, StoreError};

/// A customer, identified by a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    /// Inactive products stay in the table for order history but are not sold.
    pub active: bool,
}

/// A product about to be inserted into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Lifecycle status stored on an order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Saved and not yet served. Every order starts here.
    #[default]
    Pending,
}

impl OrderStatus {
    /// Returns the text stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            other => Err(StoreError::InvalidData(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

/// An order header joined with its customer's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_name: String,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A line to be written under an order.
///
/// The unit price is captured at the time of sale and never re-read from the
/// catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl NewOrderLine {
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns quantity * unit price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.quantity == 0 {
            return Err(StoreError::InvalidData(format!(
                "order line for product {} has zero quantity",
                self.product_id
            )));
        }
        if self.unit_price.is_negative() {
            return Err(StoreError::InvalidData(format!(
                "order line for product {} has negative price {}",
                self.product_id, self.unit_price
            )));
        }
        Ok(())
    }
}

/// Sum of the subtotals of a set of lines.
pub(crate) fn lines_total(lines: &[NewOrderLine]) -> Money {
    lines.iter().map(NewOrderLine::subtotal).sum()
}

/// An order line joined with its product's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineView {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_column_text() {
        let status: OrderStatus = OrderStatus::Pending.as_str().parse().unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }

    #[test]
    fn unknown_status_is_invalid_data() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn line_subtotal_is_quantity_times_price() {
        let line = NewOrderLine::new(ProductId::new(1), 2, Money::from_cents(75));
        assert_eq!(line.subtotal(), Money::from_cents(150));
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let line = NewOrderLine::new(ProductId::new(1), 0, Money::from_cents(75));
        assert!(line.validate().is_err());
    }

    #[test]
    fn lines_total_sums_subtotals() {
        let lines = vec![
            NewOrderLine::new(ProductId::new(2), 2, Money::from_cents(75)),
            NewOrderLine::new(ProductId::new(4), 1, Money::from_cents(100)),
        ];
        assert_eq!(lines_total(&lines), Money::from_cents(250));
    }
}
