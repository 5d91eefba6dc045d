//! Order service providing a simplified API for order operations.

use common::{AggregateId, Money, Sku};
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    AddItem, ApplyCoupon, ApproveReturn, Cancel, Complete, Confirm, CreateOrder, CustomerId,
    MarkProcessing, Order, OrderItem, RecordDelivery, RecordPaymentFailure, RecordPaymentPending,
    RecordPaymentSuccess, RecordReturn, RecordShipment, Refund, RemoveItem, RequestReturn,
    UpdateItemQuantity,
};

impl From<super::OrderError> for DomainError {
    fn from(e: super::OrderError) -> Self {
        DomainError::Order(e)
    }
}

/// Service for managing orders.
///
/// Provides a high-level API for order operations, wrapping the command
/// handler and providing convenient methods for common operations. Every
/// persisted event is correlated by the order id so downstream consumers
/// can group the full checkout history of one order.
pub struct OrderService<S: EventStore> {
    handler: CommandHandler<S, Order>,
}

impl<S: EventStore> OrderService<S> {
    /// Creates a new order service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Order> {
        &self.handler
    }

    /// Creates a new order for a customer.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        cmd: CreateOrder,
    ) -> Result<CommandResult<Order>, DomainError> {
        let order_id = cmd.order_id;
        let customer_id = cmd.customer_id;

        let result = self
            .handler
            .execute(order_id, Some(order_id), |order| {
                order.create(order_id, customer_id)
            })
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        Ok(result)
    }

    /// Adds an item to an order.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, cmd: AddItem) -> Result<CommandResult<Order>, DomainError> {
        let item = cmd.item.clone();

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.add_item(item)
            })
            .await
    }

    /// Removes an item from an order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, cmd: RemoveItem) -> Result<CommandResult<Order>, DomainError> {
        let sku = cmd.sku.clone();

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.remove_item(sku)
            })
            .await
    }

    /// Updates the quantity of an item in an order.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        cmd: UpdateItemQuantity,
    ) -> Result<CommandResult<Order>, DomainError> {
        let sku = cmd.sku.clone();
        let new_quantity = cmd.new_quantity;

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.update_item_quantity(sku, new_quantity)
            })
            .await
    }

    /// Applies a coupon discount to an order.
    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        cmd: ApplyCoupon,
    ) -> Result<CommandResult<Order>, DomainError> {
        let code = cmd.code.clone();
        let discount = cmd.discount;

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.apply_coupon(code, discount)
            })
            .await
    }

    /// Confirms an order, locking in its contents and pricing.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, cmd: Confirm) -> Result<CommandResult<Order>, DomainError> {
        let result = self
            .handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| order.confirm())
            .await?;

        metrics::counter!("orders_confirmed_total").increment(1);
        Ok(result)
    }

    /// Records that a payment attempt is in flight.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment_pending(
        &self,
        cmd: RecordPaymentPending,
    ) -> Result<CommandResult<Order>, DomainError> {
        let payment_id = cmd.payment_id;

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_payment_pending(payment_id)
            })
            .await
    }

    /// Records a captured payment.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment_success(
        &self,
        cmd: RecordPaymentSuccess,
    ) -> Result<CommandResult<Order>, DomainError> {
        let payment_id = cmd.payment_id;

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_payment_success(payment_id)
            })
            .await
    }

    /// Records a failed payment attempt.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment_failure(
        &self,
        cmd: RecordPaymentFailure,
    ) -> Result<CommandResult<Order>, DomainError> {
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_payment_failure(reason)
            })
            .await
    }

    /// Starts fulfilment of a paid order.
    #[tracing::instrument(skip(self))]
    pub async fn mark_processing(
        &self,
        cmd: MarkProcessing,
    ) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.mark_processing()
            })
            .await
    }

    /// Records a shipment, full or partial.
    #[tracing::instrument(skip(self))]
    pub async fn record_shipment(
        &self,
        cmd: RecordShipment,
    ) -> Result<CommandResult<Order>, DomainError> {
        let carrier = cmd.carrier.clone();
        let tracking_number = cmd.tracking_number.clone();
        let partial = cmd.partial;

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_shipment(carrier, tracking_number, partial)
            })
            .await
    }

    /// Records a carrier delivery confirmation.
    #[tracing::instrument(skip(self))]
    pub async fn record_delivery(
        &self,
        cmd: RecordDelivery,
    ) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_delivery()
            })
            .await
    }

    /// Completes a delivered order.
    #[tracing::instrument(skip(self))]
    pub async fn complete_order(&self, cmd: Complete) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| order.complete())
            .await
    }

    /// Cancels an order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, cmd: Cancel) -> Result<CommandResult<Order>, DomainError> {
        let reason = cmd.reason.clone();

        let result = self
            .handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.cancel(reason)
            })
            .await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(result)
    }

    /// Records a refund on a cancelled or returned order.
    #[tracing::instrument(skip(self))]
    pub async fn refund_order(&self, cmd: Refund) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| order.refund())
            .await
    }

    /// Requests a return of a delivered order.
    #[tracing::instrument(skip(self))]
    pub async fn request_return(
        &self,
        cmd: RequestReturn,
    ) -> Result<CommandResult<Order>, DomainError> {
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.request_return(reason)
            })
            .await
    }

    /// Approves a pending return request.
    #[tracing::instrument(skip(self))]
    pub async fn approve_return(
        &self,
        cmd: ApproveReturn,
    ) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.approve_return()
            })
            .await
    }

    /// Records receipt of returned goods.
    #[tracing::instrument(skip(self))]
    pub async fn record_return(
        &self,
        cmd: RecordReturn,
    ) -> Result<CommandResult<Order>, DomainError> {
        self.handler
            .execute(cmd.order_id, Some(cmd.order_id), |order| {
                order.record_return()
            })
            .await
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: AggregateId) -> Result<Option<Order>, DomainError> {
        self.handler.load_existing(order_id).await
    }

    // Convenience methods

    /// Creates an order and adds items in a single operation.
    pub async fn create_order_with_items(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<CommandResult<Order>, DomainError> {
        let order_id = AggregateId::new();

        self.create_order(CreateOrder::new(order_id, customer_id))
            .await?;

        let mut result = None;
        for item in items {
            result = Some(self.add_item(AddItem::new(order_id, item)).await?);
        }

        // Return the final state, or load if no items were added
        match result {
            Some(r) => Ok(r),
            None => {
                let order = self.handler.load(order_id).await?;
                Ok(CommandResult {
                    aggregate: order,
                    events: vec![],
                    new_version: event_store::Version::first(),
                })
            }
        }
    }

    /// Adds an item using individual fields.
    pub async fn add_item_to_order(
        &self,
        order_id: AggregateId,
        sku: impl Into<Sku>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<CommandResult<Order>, DomainError> {
        let item = OrderItem::new(sku, quantity, unit_price);
        self.add_item(AddItem::new(order_id, item)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::order::OrderStatus;
    use event_store::InMemoryEventStore;

    async fn confirmed_order(service: &OrderService<InMemoryEventStore>) -> AggregateId {
        let cmd = CreateOrder::for_customer(CustomerId::new());
        let order_id = cmd.order_id;
        service.create_order(cmd).await.unwrap();
        service
            .add_item_to_order(order_id, "SKU-001", 2, Money::from_cents(1000))
            .await
            .unwrap();
        service.confirm_order(Confirm::new(order_id)).await.unwrap();
        order_id
    }

    #[tokio::test]
    async fn test_create_order() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);

        let customer_id = CustomerId::new();
        let cmd = CreateOrder::for_customer(customer_id);
        let order_id = cmd.order_id;

        let result = service.create_order(cmd).await.unwrap();

        assert_eq!(result.aggregate.id(), Some(order_id));
        assert_eq!(result.aggregate.customer_id(), Some(customer_id));
        assert_eq!(result.events.len(), 1);
    }

    #[tokio::test]
    async fn test_add_item() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);

        let cmd = CreateOrder::for_customer(CustomerId::new());
        let order_id = cmd.order_id;
        service.create_order(cmd).await.unwrap();

        let result = service
            .add_item_to_order(order_id, "SKU-001", 2, Money::from_cents(1000))
            .await
            .unwrap();

        assert_eq!(result.aggregate.item_count(), 1);
        assert_eq!(result.aggregate.pricing().subtotal.cents(), 2000);
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_completed() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);
        let order_id = confirmed_order(&service).await;

        service
            .record_payment_pending(RecordPaymentPending::new(order_id, None))
            .await
            .unwrap();
        service
            .record_payment_success(RecordPaymentSuccess::new(order_id, None))
            .await
            .unwrap();
        service
            .mark_processing(MarkProcessing::new(order_id))
            .await
            .unwrap();
        service
            .record_shipment(RecordShipment::new(order_id, "UPS", "1Z999", false))
            .await
            .unwrap();
        service
            .record_delivery(RecordDelivery::new(order_id))
            .await
            .unwrap();

        let result = service
            .complete_order(Complete::new(order_id))
            .await
            .unwrap();

        assert_eq!(result.aggregate.status(), OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_payment_failure_allows_retry() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);
        let order_id = confirmed_order(&service).await;

        service
            .record_payment_pending(RecordPaymentPending::new(order_id, None))
            .await
            .unwrap();
        let result = service
            .record_payment_failure(RecordPaymentFailure::new(order_id, "card declined"))
            .await
            .unwrap();
        assert_eq!(result.aggregate.status(), OrderStatus::Confirmed);

        // Second attempt goes through
        service
            .record_payment_pending(RecordPaymentPending::new(order_id, None))
            .await
            .unwrap();
        let result = service
            .record_payment_success(RecordPaymentSuccess::new(order_id, None))
            .await
            .unwrap();
        assert_eq!(result.aggregate.status(), OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_cancel_then_refund() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);
        let order_id = confirmed_order(&service).await;

        let result = service
            .cancel_order(Cancel::new(order_id, "customer changed mind"))
            .await
            .unwrap();
        assert_eq!(result.aggregate.status(), OrderStatus::Cancelled);

        let result = service.refund_order(Refund::new(order_id)).await.unwrap();
        assert_eq!(result.aggregate.status(), OrderStatus::Refunded);
    }

    #[tokio::test]
    async fn test_rejected_command_persists_nothing() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store.clone());

        let cmd = CreateOrder::for_customer(CustomerId::new());
        let order_id = cmd.order_id;
        service.create_order(cmd).await.unwrap();

        // Confirming an empty order is rejected
        let result = service.confirm_order(Confirm::new(order_id)).await;
        assert!(matches!(result, Err(DomainError::Order(_))));

        // Only the creation event exists
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_order() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);

        let result = service.get_order(AggregateId::new()).await.unwrap();
        assert!(result.is_none());

        let cmd = CreateOrder::for_customer(CustomerId::new());
        let order_id = cmd.order_id;
        service.create_order(cmd).await.unwrap();

        let result = service.get_order(order_id).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_create_order_with_items() {
        let store = InMemoryEventStore::new();
        let service = OrderService::new(store);

        let items = vec![
            OrderItem::new("SKU-001", 2, Money::from_cents(1000)),
            OrderItem::new("SKU-002", 1, Money::from_cents(500)),
        ];

        let result = service
            .create_order_with_items(CustomerId::new(), items)
            .await
            .unwrap();

        assert_eq!(result.aggregate.item_count(), 2);
        assert_eq!(result.aggregate.pricing().subtotal.cents(), 2500);
    }
}
