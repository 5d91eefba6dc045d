//! Order commands.

use common::{AggregateId, Money, Sku};

use crate::command::Command;

use super::{CustomerId, Order, OrderItem};

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// The order ID to create.
    pub order_id: AggregateId,

    /// The customer placing the order.
    pub customer_id: CustomerId,
}

impl CreateOrder {
    /// Creates a new CreateOrder command.
    pub fn new(order_id: AggregateId, customer_id: CustomerId) -> Self {
        Self {
            order_id,
            customer_id,
        }
    }

    /// Creates a new CreateOrder command with a generated order ID.
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            order_id: AggregateId::new(),
            customer_id,
        }
    }
}

impl Command for CreateOrder {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to add an item to an order.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The order to add the item to.
    pub order_id: AggregateId,

    /// The item to add.
    pub item: OrderItem,
}

impl AddItem {
    /// Creates a new AddItem command.
    pub fn new(order_id: AggregateId, item: OrderItem) -> Self {
        Self { order_id, item }
    }

    /// Creates a new AddItem command from individual fields.
    pub fn with_details(
        order_id: AggregateId,
        sku: impl Into<Sku>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            order_id,
            item: OrderItem::new(sku, quantity, unit_price),
        }
    }
}

impl Command for AddItem {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to remove an item from an order.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The order to remove the item from.
    pub order_id: AggregateId,

    /// The SKU to remove.
    pub sku: Sku,
}

impl RemoveItem {
    /// Creates a new RemoveItem command.
    pub fn new(order_id: AggregateId, sku: impl Into<Sku>) -> Self {
        Self {
            order_id,
            sku: sku.into(),
        }
    }
}

impl Command for RemoveItem {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to update the quantity of an item.
#[derive(Debug, Clone)]
pub struct UpdateItemQuantity {
    /// The order containing the item.
    pub order_id: AggregateId,

    /// The SKU to update.
    pub sku: Sku,

    /// The new quantity.
    pub new_quantity: u32,
}

impl UpdateItemQuantity {
    /// Creates a new UpdateItemQuantity command.
    pub fn new(order_id: AggregateId, sku: impl Into<Sku>, new_quantity: u32) -> Self {
        Self {
            order_id,
            sku: sku.into(),
            new_quantity,
        }
    }
}

impl Command for UpdateItemQuantity {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to apply a coupon discount to an order.
#[derive(Debug, Clone)]
pub struct ApplyCoupon {
    /// The order to discount.
    pub order_id: AggregateId,

    /// Coupon code, recorded for audit.
    pub code: String,

    /// Discount amount.
    pub discount: Money,
}

impl ApplyCoupon {
    /// Creates a new ApplyCoupon command.
    pub fn new(order_id: AggregateId, code: impl Into<String>, discount: Money) -> Self {
        Self {
            order_id,
            code: code.into(),
            discount,
        }
    }
}

impl Command for ApplyCoupon {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to confirm an order, locking in its contents and pricing.
#[derive(Debug, Clone)]
pub struct Confirm {
    /// The order to confirm.
    pub order_id: AggregateId,
}

impl Confirm {
    /// Creates a new Confirm command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for Confirm {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record that a payment attempt is in flight.
#[derive(Debug, Clone)]
pub struct RecordPaymentPending {
    /// The order awaiting payment.
    pub order_id: AggregateId,

    /// Payment aggregate reference, if known.
    pub payment_id: Option<AggregateId>,
}

impl RecordPaymentPending {
    /// Creates a new RecordPaymentPending command.
    pub fn new(order_id: AggregateId, payment_id: Option<AggregateId>) -> Self {
        Self {
            order_id,
            payment_id,
        }
    }
}

impl Command for RecordPaymentPending {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record a captured payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentSuccess {
    /// The order that was paid.
    pub order_id: AggregateId,

    /// Payment aggregate reference, if known.
    pub payment_id: Option<AggregateId>,
}

impl RecordPaymentSuccess {
    /// Creates a new RecordPaymentSuccess command.
    pub fn new(order_id: AggregateId, payment_id: Option<AggregateId>) -> Self {
        Self {
            order_id,
            payment_id,
        }
    }
}

impl Command for RecordPaymentSuccess {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record a failed payment attempt.
///
/// Moves the order back to Confirmed so another attempt can start.
#[derive(Debug, Clone)]
pub struct RecordPaymentFailure {
    /// The order whose payment failed.
    pub order_id: AggregateId,

    /// Why the attempt failed.
    pub reason: String,
}

impl RecordPaymentFailure {
    /// Creates a new RecordPaymentFailure command.
    pub fn new(order_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

impl Command for RecordPaymentFailure {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to start fulfilment.
#[derive(Debug, Clone)]
pub struct MarkProcessing {
    /// The order to start processing.
    pub order_id: AggregateId,
}

impl MarkProcessing {
    /// Creates a new MarkProcessing command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for MarkProcessing {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record a shipment.
#[derive(Debug, Clone)]
pub struct RecordShipment {
    /// The order being shipped.
    pub order_id: AggregateId,

    /// Carrier name.
    pub carrier: String,

    /// Carrier tracking number.
    pub tracking_number: String,

    /// True when only part of the order went out.
    pub partial: bool,
}

impl RecordShipment {
    /// Creates a new RecordShipment command.
    pub fn new(
        order_id: AggregateId,
        carrier: impl Into<String>,
        tracking_number: impl Into<String>,
        partial: bool,
    ) -> Self {
        Self {
            order_id,
            carrier: carrier.into(),
            tracking_number: tracking_number.into(),
            partial,
        }
    }
}

impl Command for RecordShipment {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record a carrier delivery confirmation.
#[derive(Debug, Clone)]
pub struct RecordDelivery {
    /// The order that was delivered.
    pub order_id: AggregateId,
}

impl RecordDelivery {
    /// Creates a new RecordDelivery command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for RecordDelivery {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to complete a delivered order.
#[derive(Debug, Clone)]
pub struct Complete {
    /// The order to complete.
    pub order_id: AggregateId,
}

impl Complete {
    /// Creates a new Complete command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for Complete {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to cancel an order.
#[derive(Debug, Clone)]
pub struct Cancel {
    /// The order to cancel.
    pub order_id: AggregateId,

    /// Reason for cancellation.
    pub reason: String,
}

impl Cancel {
    /// Creates a new Cancel command.
    pub fn new(order_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

impl Command for Cancel {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record a refund on a cancelled or returned order.
#[derive(Debug, Clone)]
pub struct Refund {
    /// The order to refund.
    pub order_id: AggregateId,
}

impl Refund {
    /// Creates a new Refund command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for Refund {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to request a return of a delivered order.
#[derive(Debug, Clone)]
pub struct RequestReturn {
    /// The order to return.
    pub order_id: AggregateId,

    /// Why the customer wants to return it.
    pub reason: String,
}

impl RequestReturn {
    /// Creates a new RequestReturn command.
    pub fn new(order_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            reason: reason.into(),
        }
    }
}

impl Command for RequestReturn {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to approve a pending return request.
#[derive(Debug, Clone)]
pub struct ApproveReturn {
    /// The order whose return is approved.
    pub order_id: AggregateId,
}

impl ApproveReturn {
    /// Creates a new ApproveReturn command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for ApproveReturn {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

/// Command to record receipt of returned goods.
#[derive(Debug, Clone)]
pub struct RecordReturn {
    /// The order whose goods came back.
    pub order_id: AggregateId,
}

impl RecordReturn {
    /// Creates a new RecordReturn command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for RecordReturn {
    type Aggregate = Order;

    fn aggregate_id(&self) -> AggregateId {
        self.order_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_command() {
        let order_id = AggregateId::new();
        let customer_id = CustomerId::new();

        let cmd = CreateOrder::new(order_id, customer_id);
        assert_eq!(cmd.aggregate_id(), order_id);
        assert_eq!(cmd.customer_id, customer_id);
    }

    #[test]
    fn test_create_order_for_customer() {
        let customer_id = CustomerId::new();
        let cmd = CreateOrder::for_customer(customer_id);

        // Order ID should be generated
        assert_ne!(cmd.order_id, AggregateId::new());
        assert_eq!(cmd.customer_id, customer_id);
    }

    #[test]
    fn test_add_item_with_details() {
        let order_id = AggregateId::new();

        let cmd = AddItem::with_details(order_id, "SKU-002", 3, Money::from_cents(500));
        assert_eq!(cmd.aggregate_id(), order_id);
        assert_eq!(cmd.item.sku.as_str(), "SKU-002");
        assert_eq!(cmd.item.quantity, 3);
    }

    #[test]
    fn test_remove_item_command() {
        let order_id = AggregateId::new();

        let cmd = RemoveItem::new(order_id, "SKU-001");
        assert_eq!(cmd.aggregate_id(), order_id);
        assert_eq!(cmd.sku.as_str(), "SKU-001");
    }

    #[test]
    fn test_apply_coupon_command() {
        let order_id = AggregateId::new();

        let cmd = ApplyCoupon::new(order_id, "SAVE10", Money::from_cents(1000));
        assert_eq!(cmd.aggregate_id(), order_id);
        assert_eq!(cmd.code, "SAVE10");
        assert_eq!(cmd.discount.cents(), 1000);
    }

    #[test]
    fn test_cancel_command() {
        let order_id = AggregateId::new();

        let cmd = Cancel::new(order_id, "Customer request");
        assert_eq!(cmd.aggregate_id(), order_id);
        assert_eq!(cmd.reason, "Customer request");
    }

    #[test]
    fn test_record_shipment_command() {
        let order_id = AggregateId::new();

        let cmd = RecordShipment::new(order_id, "UPS", "1Z999", false);
        assert_eq!(cmd.aggregate_id(), order_id);
        assert!(!cmd.partial);
    }
}
