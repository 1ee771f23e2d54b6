//! Order service composing store primitives into order operations.

use serde::Serialize;
use store::{NewOrderLine, OrderLineView, OrderStore, OrderStoreExt, OrderSummary, StoreError};

use crate::error::DomainError;
use crate::{CustomerId, Money, OrderId, PosSession, ProductId, Ticket};

use super::OrderError;

impl From<OrderError> for DomainError {
    fn from(e: OrderError) -> Self {
        DomainError::Order(e)
    }
}

/// A saved order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub lines: Vec<OrderLineView>,
}

/// Service for managing orders.
///
/// The single-row methods pass straight through to the store and leave the
/// order total for the caller to keep consistent. [`OrderService::save_ticket`]
/// and [`OrderService::save_session`] are the consistent path: they write the
/// header, the lines and the recomputed total in one store transaction.
pub struct OrderService<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the id of the customer with this exact name, creating it first
    /// if needed.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_create_customer(&self, name: &str) -> Result<CustomerId, DomainError> {
        Ok(self.store.get_or_create_customer(name).await?)
    }

    /// Inserts a pending order header with the given total and no lines.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        total: Money,
    ) -> Result<OrderId, DomainError> {
        Ok(self.store.create_order(customer_id, total).await?)
    }

    /// Inserts one line under an order. The order total is not updated.
    #[tracing::instrument(skip(self))]
    pub async fn add_order_line(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), DomainError> {
        let line = NewOrderLine::new(product_id, quantity, unit_price);
        Ok(self.store.add_order_line(order_id, &line).await?)
    }

    /// Lists saved orders, most recent first.
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        Ok(self.store.list_orders().await?)
    }

    /// Lists the lines of an order; empty if the order has none or is gone.
    pub async fn get_order_lines(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderLineView>, DomainError> {
        Ok(self.store.get_order_lines(order_id).await?)
    }

    /// Loads an order with its lines.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderDetails, DomainError> {
        let summary = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let lines = self.store.get_order_lines(order_id).await?;
        Ok(OrderDetails { summary, lines })
    }

    /// Deletes an order together with its lines.
    ///
    /// Returns false when there was no such order. The customer is kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<bool, DomainError> {
        let deleted = self.store.delete_order(order_id).await?;
        if deleted {
            metrics::counter!("orders_deleted_total").increment(1);
            tracing::info!(%order_id, "order deleted");
        }
        Ok(deleted)
    }

    /// Deletes the lines of an order, keeping its header and stale total.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order_lines(&self, order_id: OrderId) -> Result<(), DomainError> {
        Ok(self.store.delete_order_lines(order_id).await?)
    }

    /// Overwrites the stored total of an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_total(
        &self,
        order_id: OrderId,
        total: Money,
    ) -> Result<(), DomainError> {
        self.store
            .update_order_total(order_id, total)
            .await
            .map_err(not_found_as_order_error)
    }

    /// Persists a ticket as a new order, or over an existing one.
    ///
    /// With `editing` unset, the customer is looked up or created by the
    /// trimmed name and a new order is written. With `editing` set, that
    /// order's lines and total are replaced and its customer is left as is.
    /// Either way the order total equals the ticket total afterwards.
    #[tracing::instrument(skip(self, ticket), fields(entries = ticket.len()))]
    pub async fn save_ticket(
        &self,
        ticket: &Ticket,
        customer_name: &str,
        editing: Option<OrderId>,
    ) -> Result<OrderId, DomainError> {
        let customer_name = customer_name.trim();
        if customer_name.is_empty() {
            return Err(OrderError::CustomerNameRequired.into());
        }
        if ticket.is_empty() {
            return Err(OrderError::EmptyTicket.into());
        }

        let lines = self.resolve_lines(ticket).await?;

        match editing {
            Some(order_id) => {
                self.store
                    .replace_order_lines(order_id, &lines)
                    .await
                    .map_err(not_found_as_order_error)?;
                metrics::counter!("orders_edited_total").increment(1);
                tracing::info!(%order_id, total = %ticket.total(), "order updated");
                Ok(order_id)
            }
            None => {
                let order_id = self.store.place_order(customer_name, &lines).await?;
                metrics::counter!("orders_saved_total").increment(1);
                tracing::info!(%order_id, customer = customer_name, total = %ticket.total(), "order saved");
                Ok(order_id)
            }
        }
    }

    /// Saves the session's ticket and resets the session on success.
    ///
    /// On failure the session is left untouched so the operator can fix the
    /// input and retry.
    pub async fn save_session(&self, session: &mut PosSession) -> Result<OrderId, DomainError> {
        let order_id = self
            .save_ticket(&session.ticket, &session.customer_name, session.editing)
            .await?;
        session.reset();
        Ok(order_id)
    }

    /// Opens a saved order for editing.
    ///
    /// The returned session holds a ticket rebuilt from the saved lines, at
    /// the prices captured when they were sold.
    #[tracing::instrument(skip(self))]
    pub async fn load_for_edit(&self, order_id: OrderId) -> Result<PosSession, DomainError> {
        let details = self.get_order(order_id).await?;
        let ticket = Ticket::from_lines(&details.lines);
        Ok(PosSession::editing(
            order_id,
            details.summary.customer_name,
            ticket,
        ))
    }

    async fn resolve_lines(&self, ticket: &Ticket) -> Result<Vec<NewOrderLine>, DomainError> {
        let ids = self.store.product_ids_by_name().await?;
        ticket
            .iter()
            .map(|(name, entry)| -> Result<NewOrderLine, DomainError> {
                let product_id = ids.get(name).copied().ok_or_else(|| {
                    OrderError::UnknownProduct {
                        name: name.to_string(),
                    }
                })?;
                Ok(NewOrderLine::new(
                    product_id,
                    entry.quantity,
                    entry.unit_price,
                ))
            })
            .collect()
    }
}

fn not_found_as_order_error(err: StoreError) -> DomainError {
    match err {
        StoreError::OrderNotFound(order_id) => OrderError::OrderNotFound(order_id).into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{InMemoryOrderStore, NewProduct};

    async fn create_service() -> OrderService<InMemoryOrderStore> {
        let store = InMemoryOrderStore::new();
        store
            .insert_products(&[
                NewProduct::new("Pupusa de Queso", Money::from_cents(75)),
                NewProduct::new("Soda Fanta", Money::from_cents(100)),
                NewProduct::new("Café", Money::from_cents(50)),
            ])
            .await
            .unwrap();
        OrderService::new(store)
    }

    fn example_ticket() -> Ticket {
        let mut ticket = Ticket::new();
        ticket
            .add("Pupusa de Queso", 2, Money::from_cents(75))
            .unwrap();
        ticket.add("Soda Fanta", 1, Money::from_cents(100)).unwrap();
        ticket
    }

    #[tokio::test]
    async fn test_save_new_order() {
        let service = create_service().await;
        let order_id = service
            .save_ticket(&example_ticket(), "Ana", None)
            .await
            .unwrap();

        let details = service.get_order(order_id).await.unwrap();
        assert_eq!(details.summary.customer_name, "Ana");
        assert_eq!(details.summary.total, Money::from_cents(250));
        assert_eq!(details.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_customer_name_is_rejected() {
        let service = create_service().await;
        let err = service
            .save_ticket(&example_ticket(), "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::CustomerNameRequired)
        ));
        assert!(service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_ticket_is_rejected() {
        let service = create_service().await;
        let err = service
            .save_ticket(&Ticket::new(), "Ana", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Order(OrderError::EmptyTicket)));
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let service = create_service().await;
        let mut ticket = example_ticket();
        ticket.add("Horchata", 1, Money::from_cents(100)).unwrap();

        let err = service.save_ticket(&ticket, "Ana", None).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::UnknownProduct { ref name }) if name == "Horchata"
        ));
        assert!(service.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_name_is_trimmed() {
        let service = create_service().await;
        service
            .save_ticket(&example_ticket(), "  Ana ", None)
            .await
            .unwrap();
        service
            .save_ticket(&example_ticket(), "Ana", None)
            .await
            .unwrap();
        assert_eq!(service.store().customer_count().await, 1);
    }

    #[tokio::test]
    async fn test_editing_missing_order_fails() {
        let service = create_service().await;
        let err = service
            .save_ticket(&example_ticket(), "Ana", Some(OrderId::new(41)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_session_resets_on_success_only() {
        let service = create_service().await;
        let mut session = PosSession::new();
        session.ticket = example_ticket();

        // No customer name yet: nothing is cleared.
        assert!(service.save_session(&mut session).await.is_err());
        assert_eq!(session.ticket.len(), 2);

        session.customer_name = "Ana".to_string();
        service.save_session(&mut session).await.unwrap();
        assert_eq!(session, PosSession::new());
    }

    #[tokio::test]
    async fn test_load_for_edit_round_trips_ticket() {
        let service = create_service().await;
        let ticket = example_ticket();
        let order_id = service.save_ticket(&ticket, "Ana", None).await.unwrap();

        let session = service.load_for_edit(order_id).await.unwrap();
        assert_eq!(session.editing, Some(order_id));
        assert_eq!(session.customer_name, "Ana");
        assert_eq!(session.ticket, ticket);
    }

    #[tokio::test]
    async fn test_order_details_serialize_flat() {
        let service = create_service().await;
        let order_id = service
            .save_ticket(&example_ticket(), "Ana", None)
            .await
            .unwrap();

        let details = service.get_order(order_id).await.unwrap();
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["customer_name"], "Ana");
        assert_eq!(json["total"], 250);
        assert_eq!(json["status"], "pending");
        assert_eq!(json["lines"][0]["product_name"], "Pupusa de Queso");
    }

    #[tokio::test]
    async fn test_update_total_of_missing_order() {
        let service = create_service().await;
        let err = service
            .update_order_total(OrderId::new(5), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Order(OrderError::OrderNotFound(_))
        ));
    }
}
