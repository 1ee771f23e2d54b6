//! The running ticket (cart) built up before an order is saved.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use store::OrderLineView;
use thiserror::Error;

use crate::Money;

/// Errors raised by ticket mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    /// Items must be added at least one at a time.
    #[error("Invalid quantity for {product_name}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_name: String, quantity: u32 },
}

/// One product on the ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketEntry {
    pub unit_price: Money,
    /// Always at least 1; an entry that would reach 0 is removed instead.
    pub quantity: u32,
}

impl TicketEntry {
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Selected products keyed by name, in the order they were first added.
///
/// The ticket lives only as long as the session that owns it; nothing here
/// touches storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    entries: IndexMap<String, TicketEntry>,
}

impl Ticket {
    /// Creates an empty ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ticket from the lines of a saved order.
    ///
    /// Lines naming the same product are merged; the first line's price is kept.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a OrderLineView>) -> Self {
        let mut ticket = Self::new();
        for line in lines {
            if line.quantity > 0 {
                ticket.merge(&line.product_name, line.quantity, line.unit_price);
            }
        }
        ticket
    }

    /// Adds `quantity` units of a product.
    ///
    /// If the product is already on the ticket its quantity grows and its
    /// original unit price is kept; otherwise a new entry is appended.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), TicketError> {
        let name = name.into();
        if quantity == 0 {
            return Err(TicketError::InvalidQuantity {
                product_name: name,
                quantity,
            });
        }
        self.merge(&name, quantity, unit_price);
        Ok(())
    }

    fn merge(&mut self, name: &str, quantity: u32, unit_price: Money) {
        match self.entries.get_mut(name) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => {
                self.entries.insert(
                    name.to_string(),
                    TicketEntry {
                        unit_price,
                        quantity,
                    },
                );
            }
        }
    }

    /// Adds one unit of a product already on the ticket.
    ///
    /// Returns false if the product is not on the ticket.
    pub fn increase(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.quantity = entry.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Takes one unit off, removing the entry when its last unit goes.
    ///
    /// Returns false if the product is not on the ticket.
    pub fn decrease(&mut self, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.quantity > 1 {
            entry.quantity -= 1;
        } else {
            self.entries.shift_remove(name);
        }
        true
    }

    /// Removes a product regardless of its quantity.
    pub fn remove(&mut self, name: &str) -> Option<TicketEntry> {
        self.entries.shift_remove(name)
    }

    /// Sum of price * quantity over all entries.
    pub fn total(&self) -> Money {
        self.entries.values().map(TicketEntry::subtotal).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, name: &str) -> Option<&TicketEntry> {
        self.entries.get(name)
    }

    /// Iterates entries in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TicketEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    #[test]
    fn add_new_product_creates_entry() {
        let mut ticket = Ticket::new();
        ticket.add("Pupusa de Queso", 2, cents(75)).unwrap();

        let entry = ticket.get("Pupusa de Queso").unwrap();
        assert_eq!(entry.quantity, 2);
        assert_eq!(entry.unit_price, cents(75));
        assert_eq!(ticket.len(), 1);
    }

    #[test]
    fn add_existing_product_merges_quantity_and_keeps_price() {
        let mut ticket = Ticket::new();
        ticket.add("Café", 1, cents(50)).unwrap();
        ticket.add("Café", 3, cents(60)).unwrap();

        let entry = ticket.get("Café").unwrap();
        assert_eq!(entry.quantity, 4);
        assert_eq!(entry.unit_price, cents(50));
        assert_eq!(ticket.len(), 1);
    }

    #[test]
    fn add_zero_quantity_is_rejected() {
        let mut ticket = Ticket::new();
        let err = ticket.add("Café", 0, cents(50)).unwrap_err();
        assert!(matches!(err, TicketError::InvalidQuantity { quantity: 0, .. }));
        assert!(ticket.is_empty());
    }

    #[test]
    fn decrease_above_one_decrements() {
        let mut ticket = Ticket::new();
        ticket.add("Soda Fanta", 2, cents(100)).unwrap();
        assert!(ticket.decrease("Soda Fanta"));
        assert_eq!(ticket.get("Soda Fanta").unwrap().quantity, 1);
    }

    #[test]
    fn decrease_last_unit_removes_entry() {
        let mut ticket = Ticket::new();
        ticket.add("Soda Fanta", 1, cents(100)).unwrap();
        assert!(ticket.decrease("Soda Fanta"));
        assert!(ticket.get("Soda Fanta").is_none());
        assert!(ticket.is_empty());
    }

    #[test]
    fn decrease_missing_product_is_noop() {
        let mut ticket = Ticket::new();
        assert!(!ticket.decrease("Chocolate"));
        assert!(ticket.is_empty());
    }

    #[test]
    fn increase_only_touches_existing_entries() {
        let mut ticket = Ticket::new();
        ticket.add("Chocolate", 1, cents(75)).unwrap();
        assert!(ticket.increase("Chocolate"));
        assert!(!ticket.increase("Café"));
        assert_eq!(ticket.get("Chocolate").unwrap().quantity, 2);
        assert_eq!(ticket.len(), 1);
    }

    #[test]
    fn remove_drops_entry_regardless_of_quantity() {
        let mut ticket = Ticket::new();
        ticket.add("Pupusa Revuelta", 5, cents(75)).unwrap();
        let removed = ticket.remove("Pupusa Revuelta").unwrap();
        assert_eq!(removed.quantity, 5);
        assert!(ticket.remove("Pupusa Revuelta").is_none());
    }

    #[test]
    fn total_of_example_ticket() {
        let mut ticket = Ticket::new();
        ticket.add("Pupusa de Queso", 2, cents(75)).unwrap();
        ticket.add("Soda Fanta", 1, cents(100)).unwrap();
        assert_eq!(ticket.total(), cents(250));
    }

    #[test]
    fn clear_empties_ticket() {
        let mut ticket = Ticket::new();
        ticket.add("Café", 1, cents(50)).unwrap();
        ticket.clear();
        assert!(ticket.is_empty());
        assert!(ticket.total().is_zero());
    }

    #[test]
    fn iteration_follows_insertion_order_after_removal() {
        let mut ticket = Ticket::new();
        ticket.add("A", 1, cents(10)).unwrap();
        ticket.add("B", 1, cents(10)).unwrap();
        ticket.add("C", 1, cents(10)).unwrap();
        ticket.remove("B");
        ticket.add("B", 1, cents(10)).unwrap();

        let names: Vec<_> = ticket.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn from_lines_rebuilds_entries() {
        let lines = vec![
            OrderLineView {
                product_name: "Pupusa de Queso".to_string(),
                quantity: 2,
                unit_price: cents(75),
                subtotal: cents(150),
            },
            OrderLineView {
                product_name: "Soda Fanta".to_string(),
                quantity: 1,
                unit_price: cents(100),
                subtotal: cents(100),
            },
        ];
        let ticket = Ticket::from_lines(&lines);
        assert_eq!(ticket.len(), 2);
        assert_eq!(ticket.total(), cents(250));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, u32),
        Increase(usize),
        Decrease(usize),
        Remove(usize),
    }

    const NAMES: [&str; 4] = ["Pupusa Revuelta", "Soda Fanta", "Café", "Chocolate"];
    const PRICES: [i64; 4] = [75, 100, 50, 75];

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..NAMES.len(), 1u32..5).prop_map(|(i, q)| Op::Add(i, q)),
            (0..NAMES.len()).prop_map(Op::Increase),
            (0..NAMES.len()).prop_map(Op::Decrease),
            (0..NAMES.len()).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn quantities_stay_positive_and_total_matches(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut ticket = Ticket::new();
            for op in ops {
                match op {
                    Op::Add(i, q) => ticket.add(NAMES[i], q, cents(PRICES[i])).unwrap(),
                    Op::Increase(i) => { ticket.increase(NAMES[i]); }
                    Op::Decrease(i) => { ticket.decrease(NAMES[i]); }
                    Op::Remove(i) => { ticket.remove(NAMES[i]); }
                }

                prop_assert!(ticket.iter().all(|(_, e)| e.quantity >= 1));
                let expected: i64 = ticket
                    .iter()
                    .map(|(_, e)| e.unit_price.cents() * i64::from(e.quantity))
                    .sum();
                prop_assert_eq!(ticket.total().cents(), expected);
            }
        }
    }
}
