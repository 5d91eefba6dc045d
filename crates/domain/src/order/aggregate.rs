//! Order aggregate implementation.

use std::collections::HashMap;

use common::{AggregateId, Currency, Money, Sku};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    CustomerId, OrderError, OrderEvent, OrderItem, OrderStatus, Pricing,
    events::{
        CouponAppliedData, ItemAddedData, ItemQuantityUpdatedData, OrderCreatedData, PaidData,
        PaymentPendingData, ShippedData,
    },
};

/// Order aggregate root.
///
/// Tracks an order from assembly through confirmation, payment, fulfilment
/// and either completion or one of the cancellation/return paths. All
/// monetary figures live in the pricing breakdown, which is recomputed from
/// the item lines on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// Customer who placed the order.
    customer_id: Option<CustomerId>,

    /// Current status of the order.
    status: OrderStatus,

    /// Items in the order, keyed by SKU.
    items: HashMap<Sku, OrderItem>,

    /// Currency the order is priced in.
    currency: Currency,

    /// Flat shipping charge.
    shipping_cost: Money,

    /// Applied coupon code, if any.
    coupon_code: Option<String>,

    /// Coupon discount amount.
    discount_total: Money,

    /// Pricing breakdown derived from the above.
    pricing: Pricing,

    /// Payment aggregate reference once a payment attempt exists.
    payment_id: Option<AggregateId>,

    /// Carrier from the most recent shipment.
    carrier: Option<String>,

    /// Tracking number from the most recent shipment.
    tracking_number: Option<String>,

    /// Reason recorded on cancellation.
    cancellation_reason: Option<String>,
}

impl Default for Order {
    fn default() -> Self {
        let currency = Currency::default();
        Self {
            id: None,
            version: Version::initial(),
            customer_id: None,
            status: OrderStatus::default(),
            items: HashMap::new(),
            currency,
            shipping_cost: Money::zero(currency),
            coupon_code: None,
            discount_total: Money::zero(currency),
            pricing: Pricing::empty(currency),
            payment_id: None,
            carrier: None,
            tracking_number: None,
            cancellation_reason: None,
        }
    }
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::Created(data) => self.apply_created(data),
            OrderEvent::ItemAdded(data) => self.apply_item_added(data),
            OrderEvent::ItemRemoved(data) => self.apply_item_removed(data.sku),
            OrderEvent::ItemQuantityUpdated(data) => self.apply_item_quantity_updated(data),
            OrderEvent::CouponApplied(data) => self.apply_coupon_applied(data),
            OrderEvent::Confirmed(_) => {
                self.status = OrderStatus::Confirmed;
            }
            OrderEvent::PaymentPending(data) => self.apply_payment_pending(data),
            OrderEvent::Paid(data) => self.apply_paid(data),
            OrderEvent::PaymentFailed(_) => {
                // Back to Confirmed so another attempt can start.
                self.status = OrderStatus::Confirmed;
            }
            OrderEvent::Processing(_) => {
                self.status = OrderStatus::Processing;
            }
            OrderEvent::Shipped(data) => self.apply_shipped(data),
            OrderEvent::Delivered(_) => {
                self.status = OrderStatus::Delivered;
            }
            OrderEvent::Completed(_) => {
                self.status = OrderStatus::Completed;
            }
            OrderEvent::ReturnRequested(_) => {
                self.status = OrderStatus::ReturnRequested;
            }
            OrderEvent::ReturnApproved(_) => {
                self.status = OrderStatus::ReturnApproved;
            }
            OrderEvent::Returned(_) => {
                self.status = OrderStatus::Returned;
            }
            OrderEvent::Cancelled(data) => {
                self.status = OrderStatus::Cancelled;
                self.cancellation_reason = Some(data.reason);
            }
            OrderEvent::Refunded(_) => {
                self.status = OrderStatus::Refunded;
            }
        }
    }
}

// Query methods
impl Order {
    /// Returns the customer ID.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns all items in the order.
    pub fn items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.values()
    }

    /// Returns an item by SKU.
    pub fn get_item(&self, sku: &Sku) -> Option<&OrderItem> {
        self.items.get(sku)
    }

    /// Returns the number of item lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.values().map(|item| item.quantity).sum()
    }

    /// Returns the pricing breakdown.
    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// Returns the grand total payable.
    pub fn grand_total(&self) -> Money {
        self.pricing.grand_total
    }

    /// Returns the applied coupon code, if any.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Returns the payment aggregate reference, if a payment has started.
    pub fn payment_id(&self) -> Option<AggregateId> {
        self.payment_id
    }

    /// Returns the most recent tracking number.
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// Returns true if the order has items.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Order {
    /// Creates a new order for a customer.
    pub fn create(
        &self,
        order_id: AggregateId,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyCreated);
        }

        Ok(vec![OrderEvent::created(
            order_id,
            customer_id,
            Currency::default(),
        )])
    }

    /// Adds an item to the order.
    ///
    /// If the SKU is already on the order, updates the quantity instead.
    pub fn add_item(&self, item: OrderItem) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "add item",
            });
        }

        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        if !item.unit_price.is_positive() {
            return Err(OrderError::InvalidPrice {
                price: item.unit_price.cents(),
            });
        }

        if let Some(existing) = self.items.get(&item.sku) {
            let new_quantity = existing.quantity + item.quantity;
            Ok(vec![OrderEvent::item_quantity_updated(
                item.sku,
                existing.quantity,
                new_quantity,
            )])
        } else {
            Ok(vec![OrderEvent::item_added(
                item.sku,
                item.quantity,
                item.unit_price,
            )])
        }
    }

    /// Removes an item from the order.
    pub fn remove_item(&self, sku: Sku) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "remove item",
            });
        }

        if !self.items.contains_key(&sku) {
            return Err(OrderError::ItemNotFound {
                sku: sku.to_string(),
            });
        }

        Ok(vec![OrderEvent::item_removed(sku)])
    }

    /// Updates the quantity of an existing item.
    pub fn update_item_quantity(
        &self,
        sku: Sku,
        new_quantity: u32,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "update item quantity",
            });
        }

        let existing = self.items.get(&sku).ok_or_else(|| OrderError::ItemNotFound {
            sku: sku.to_string(),
        })?;

        if new_quantity == 0 {
            // Quantity zero means remove the line
            Ok(vec![OrderEvent::item_removed(sku)])
        } else if new_quantity != existing.quantity {
            Ok(vec![OrderEvent::item_quantity_updated(
                sku,
                existing.quantity,
                new_quantity,
            )])
        } else {
            // No change
            Ok(vec![])
        }
    }

    /// Applies a coupon discount.
    ///
    /// The discount may not exceed the current subtotal.
    pub fn apply_coupon(
        &self,
        code: impl Into<String>,
        discount: Money,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "apply coupon",
            });
        }

        if !discount.is_positive() {
            return Err(OrderError::InvalidPrice {
                price: discount.cents(),
            });
        }

        if discount.cents() > self.pricing.subtotal.cents() {
            return Err(OrderError::CouponExceedsSubtotal {
                discount: discount.cents(),
                subtotal: self.pricing.subtotal.cents(),
            });
        }

        Ok(vec![OrderEvent::coupon_applied(code, discount)])
    }

    /// Confirms the order, locking in its contents and pricing.
    pub fn confirm(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_confirm() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "confirm",
            });
        }

        // Item events can only follow Created, so id and customer_id are
        // always set once has_items holds.
        let (Some(order_id), Some(customer_id)) = (self.id, self.customer_id) else {
            return Err(OrderError::NoItems);
        };

        if !self.has_items() {
            return Err(OrderError::NoItems);
        }

        Ok(vec![OrderEvent::confirmed(
            order_id,
            customer_id,
            self.pricing.grand_total,
        )])
    }

    /// Records that a payment attempt is in flight.
    pub fn record_payment_pending(
        &self,
        payment_id: Option<AggregateId>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_payment_pending() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record payment pending",
            });
        }

        Ok(vec![OrderEvent::payment_pending(payment_id)])
    }

    /// Records a captured payment.
    pub fn record_payment_success(
        &self,
        payment_id: Option<AggregateId>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_payment_outcome() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record payment success",
            });
        }

        Ok(vec![OrderEvent::paid(payment_id)])
    }

    /// Records a failed payment attempt, returning the order to Confirmed.
    pub fn record_payment_failure(
        &self,
        reason: impl Into<String>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_payment_outcome() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record payment failure",
            });
        }

        Ok(vec![OrderEvent::payment_failed(reason)])
    }

    /// Starts fulfilment.
    pub fn mark_processing(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_mark_processing() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "mark processing",
            });
        }

        Ok(vec![OrderEvent::processing()])
    }

    /// Records a shipment, full or partial.
    pub fn record_shipment(
        &self,
        carrier: impl Into<String>,
        tracking_number: impl Into<String>,
        partial: bool,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_shipment() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record shipment",
            });
        }

        Ok(vec![OrderEvent::shipped(carrier, tracking_number, partial)])
    }

    /// Records a carrier delivery confirmation.
    pub fn record_delivery(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_delivery() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record delivery",
            });
        }

        Ok(vec![OrderEvent::delivered()])
    }

    /// Completes a delivered order.
    pub fn complete(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_complete() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "complete",
            });
        }

        Ok(vec![OrderEvent::completed()])
    }

    /// Cancels the order. Legal only before shipment.
    pub fn cancel(&self, reason: impl Into<String>) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "cancel",
            });
        }

        Ok(vec![OrderEvent::cancelled(reason)])
    }

    /// Records a refund on a cancelled or returned order.
    pub fn refund(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_refund() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "refund",
            });
        }

        Ok(vec![OrderEvent::refunded()])
    }

    /// Requests a return of a delivered order.
    pub fn request_return(&self, reason: impl Into<String>) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_request_return() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "request return",
            });
        }

        Ok(vec![OrderEvent::return_requested(reason)])
    }

    /// Approves a pending return request.
    pub fn approve_return(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_approve_return() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "approve return",
            });
        }

        Ok(vec![OrderEvent::return_approved()])
    }

    /// Records receipt of returned goods.
    pub fn record_return(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_record_return() {
            return Err(OrderError::InvalidStateTransition {
                current_status: self.status,
                action: "record return",
            });
        }

        Ok(vec![OrderEvent::returned()])
    }
}

// Apply event helpers
impl Order {
    fn recompute_pricing(&mut self) {
        self.pricing = Pricing::compute(
            self.items.values(),
            self.shipping_cost,
            self.discount_total,
            self.currency,
        );
    }

    fn apply_created(&mut self, data: OrderCreatedData) {
        self.id = Some(data.order_id);
        self.customer_id = Some(data.customer_id);
        self.status = OrderStatus::Created;
        self.currency = data.currency;
        self.shipping_cost = Money::zero(data.currency);
        self.discount_total = Money::zero(data.currency);
        self.pricing = Pricing::empty(data.currency);
    }

    fn apply_item_added(&mut self, data: ItemAddedData) {
        let item = OrderItem::new(data.sku.clone(), data.quantity, data.unit_price);
        self.items.insert(data.sku, item);
        self.recompute_pricing();
    }

    fn apply_item_removed(&mut self, sku: Sku) {
        self.items.remove(&sku);
        self.recompute_pricing();
    }

    fn apply_item_quantity_updated(&mut self, data: ItemQuantityUpdatedData) {
        if let Some(item) = self.items.get_mut(&data.sku) {
            item.quantity = data.new_quantity;
        }
        self.recompute_pricing();
    }

    fn apply_coupon_applied(&mut self, data: CouponAppliedData) {
        self.coupon_code = Some(data.code);
        self.discount_total = data.discount;
        self.recompute_pricing();
    }

    fn apply_payment_pending(&mut self, data: PaymentPendingData) {
        self.status = OrderStatus::PaymentPending;
        if data.payment_id.is_some() {
            self.payment_id = data.payment_id;
        }
    }

    fn apply_paid(&mut self, data: PaidData) {
        self.status = OrderStatus::Paid;
        if data.payment_id.is_some() {
            self.payment_id = data.payment_id;
        }
    }

    fn apply_shipped(&mut self, data: ShippedData) {
        self.status = if data.partial {
            OrderStatus::PartiallyShipped
        } else {
            OrderStatus::Shipped
        };
        self.carrier = Some(data.carrier);
        self.tracking_number = Some(data.tracking_number);
    }
}

#[cfg(test)]
mod tests {
    use super::super::TAX_RATE_BPS;
    use super::*;
    use crate::aggregate::Aggregate;

    fn create_order() -> (Order, AggregateId) {
        let mut order = Order::default();
        let order_id = AggregateId::new();
        let customer_id = CustomerId::new();
        let events = order.create(order_id, customer_id).unwrap();
        order.apply_events(events);
        (order, order_id)
    }

    fn order_with_item(cents: i64, quantity: u32) -> (Order, AggregateId) {
        let (mut order, order_id) = create_order();
        let item = OrderItem::new("SKU-001", quantity, Money::from_cents(cents));
        order.apply_events(order.add_item(item).unwrap());
        (order, order_id)
    }

    fn confirmed_order() -> (Order, AggregateId) {
        let (mut order, order_id) = order_with_item(1000, 2);
        order.apply_events(order.confirm().unwrap());
        (order, order_id)
    }

    fn paid_order() -> (Order, AggregateId) {
        let (mut order, order_id) = confirmed_order();
        order.apply_events(order.record_payment_pending(None).unwrap());
        order.apply_events(order.record_payment_success(None).unwrap());
        (order, order_id)
    }

    fn delivered_order() -> (Order, AggregateId) {
        let (mut order, order_id) = paid_order();
        order.apply_events(order.mark_processing().unwrap());
        order.apply_events(order.record_shipment("UPS", "1Z999", false).unwrap());
        order.apply_events(order.record_delivery().unwrap());
        (order, order_id)
    }

    #[test]
    fn test_create_order() {
        let (order, order_id) = create_order();
        assert_eq!(order.id(), Some(order_id));
        assert!(order.customer_id().is_some());
        assert_eq!(order.status(), OrderStatus::Created);
        assert!(!order.has_items());
    }

    #[test]
    fn test_create_order_twice_fails() {
        let (order, _) = create_order();
        let result = order.create(AggregateId::new(), CustomerId::new());
        assert!(matches!(result, Err(OrderError::AlreadyCreated)));
    }

    #[test]
    fn test_add_item_recomputes_pricing() {
        let (order, _) = order_with_item(1000, 2);
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.pricing().subtotal.cents(), 2000);
        let expected_tax = 2000 * TAX_RATE_BPS / 10_000;
        assert_eq!(order.pricing().tax_total.cents(), expected_tax);
        assert_eq!(order.grand_total().cents(), 2000 + expected_tax);
    }

    #[test]
    fn test_add_same_sku_increases_quantity() {
        let (mut order, _) = order_with_item(1000, 2);
        let item = OrderItem::new("SKU-001", 3, Money::from_cents(1000));
        order.apply_events(order.add_item(item).unwrap());

        assert_eq!(order.item_count(), 1);
        let line = order.get_item(&Sku::new("SKU-001")).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(order.pricing().subtotal.cents(), 5000);
    }

    #[test]
    fn test_add_item_zero_quantity_fails() {
        let (order, _) = create_order();
        let item = OrderItem::new("SKU-001", 0, Money::from_cents(1000));
        assert!(matches!(
            order.add_item(item),
            Err(OrderError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_add_item_zero_price_fails() {
        let (order, _) = create_order();
        let item = OrderItem::new("SKU-001", 1, Money::from_cents(0));
        assert!(matches!(
            order.add_item(item),
            Err(OrderError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_remove_item() {
        let (mut order, _) = order_with_item(1000, 2);
        order.apply_events(order.remove_item(Sku::new("SKU-001")).unwrap());

        assert_eq!(order.item_count(), 0);
        assert!(order.grand_total().is_zero());
    }

    #[test]
    fn test_remove_nonexistent_item_fails() {
        let (order, _) = create_order();
        let result = order.remove_item(Sku::new("SKU-999"));
        assert!(matches!(result, Err(OrderError::ItemNotFound { .. })));
    }

    #[test]
    fn test_update_item_quantity_to_zero_removes_item() {
        let (mut order, _) = order_with_item(1000, 2);
        order.apply_events(order.update_item_quantity(Sku::new("SKU-001"), 0).unwrap());
        assert_eq!(order.item_count(), 0);
    }

    #[test]
    fn test_update_item_quantity_unchanged_emits_nothing() {
        let (order, _) = order_with_item(1000, 2);
        let events = order.update_item_quantity(Sku::new("SKU-001"), 2).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_apply_coupon() {
        let (mut order, _) = order_with_item(1000, 2);
        order.apply_events(order.apply_coupon("SAVE5", Money::from_cents(500)).unwrap());

        assert_eq!(order.coupon_code(), Some("SAVE5"));
        assert_eq!(order.pricing().discount_total.cents(), 500);
        let tax = 2000 * TAX_RATE_BPS / 10_000;
        assert_eq!(order.grand_total().cents(), 2000 + tax - 500);
    }

    #[test]
    fn test_coupon_exceeding_subtotal_fails() {
        let (order, _) = order_with_item(1000, 2);
        let result = order.apply_coupon("TOOBIG", Money::from_cents(5000));
        assert!(matches!(
            result,
            Err(OrderError::CouponExceedsSubtotal { .. })
        ));
    }

    #[test]
    fn test_confirm_empty_order_fails() {
        let (order, _) = create_order();
        assert!(matches!(order.confirm(), Err(OrderError::NoItems)));
    }

    #[test]
    fn test_confirm_locks_items() {
        let (order, _) = confirmed_order();
        assert_eq!(order.status(), OrderStatus::Confirmed);

        let item = OrderItem::new("SKU-002", 1, Money::from_cents(500));
        assert!(matches!(
            order.add_item(item),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_confirmed_event_carries_grand_total() {
        let (order, order_id) = order_with_item(1000, 2);
        let events = order.confirm().unwrap();

        match &events[0] {
            OrderEvent::Confirmed(data) => {
                assert_eq!(data.order_id, order_id);
                assert_eq!(data.grand_total, order.grand_total());
            }
            other => panic!("Expected Confirmed, got {other:?}"),
        }
    }

    #[test]
    fn test_payment_failure_returns_to_confirmed() {
        let (mut order, _) = confirmed_order();
        order.apply_events(order.record_payment_pending(None).unwrap());
        assert_eq!(order.status(), OrderStatus::PaymentPending);

        order.apply_events(order.record_payment_failure("card declined").unwrap());
        assert_eq!(order.status(), OrderStatus::Confirmed);

        // A new attempt can be started
        assert!(order.record_payment_pending(None).is_ok());
    }

    #[test]
    fn test_payment_outcome_without_pending_fails() {
        let (order, _) = confirmed_order();
        assert!(matches!(
            order.record_payment_success(None),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_partial_then_full_shipment() {
        let (mut order, _) = paid_order();
        order.apply_events(order.mark_processing().unwrap());

        order.apply_events(order.record_shipment("UPS", "1Z001", true).unwrap());
        assert_eq!(order.status(), OrderStatus::PartiallyShipped);

        // Remaining goods go out from PartiallyShipped
        order.apply_events(order.record_shipment("UPS", "1Z002", false).unwrap());
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.tracking_number(), Some("1Z002"));
    }

    #[test]
    fn test_delivery_from_partially_shipped() {
        let (mut order, _) = paid_order();
        order.apply_events(order.mark_processing().unwrap());
        order.apply_events(order.record_shipment("UPS", "1Z001", true).unwrap());

        order.apply_events(order.record_delivery().unwrap());
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_full_lifecycle_to_completed() {
        let (mut order, _) = delivered_order();
        order.apply_events(order.complete().unwrap());

        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_cancel_before_shipment() {
        let (mut order, _) = paid_order();
        order.apply_events(order.cancel("changed my mind").unwrap());

        assert_eq!(order.status(), OrderStatus::Cancelled);

        // Refund is reachable from Cancelled
        order.apply_events(order.refund().unwrap());
        assert_eq!(order.status(), OrderStatus::Refunded);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_cannot_cancel_after_shipment() {
        let (mut order, _) = paid_order();
        order.apply_events(order.mark_processing().unwrap());
        order.apply_events(order.record_shipment("UPS", "1Z999", false).unwrap());

        assert!(matches!(
            order.cancel("too late"),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_return_flow_to_refund() {
        let (mut order, _) = delivered_order();

        order.apply_events(order.request_return("defective").unwrap());
        assert_eq!(order.status(), OrderStatus::ReturnRequested);

        order.apply_events(order.approve_return().unwrap());
        assert_eq!(order.status(), OrderStatus::ReturnApproved);

        order.apply_events(order.record_return().unwrap());
        assert_eq!(order.status(), OrderStatus::Returned);

        order.apply_events(order.refund().unwrap());
        assert_eq!(order.status(), OrderStatus::Refunded);
    }

    #[test]
    fn test_refund_without_cancel_or_return_fails() {
        let (order, _) = delivered_order();
        assert!(matches!(
            order.refund(),
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let (order, order_id) = order_with_item(1000, 2);

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), Some(order_id));
        assert_eq!(deserialized.item_count(), 1);
        assert_eq!(deserialized.grand_total(), order.grand_total());
    }
}
