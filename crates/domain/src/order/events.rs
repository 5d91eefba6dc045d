//! Order domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Currency, Money, Sku};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::CustomerId;

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was created for a customer.
    Created(OrderCreatedData),

    /// Item line was added.
    ItemAdded(ItemAddedData),

    /// Item line was removed.
    ItemRemoved(ItemRemovedData),

    /// Item line quantity was changed.
    ItemQuantityUpdated(ItemQuantityUpdatedData),

    /// A coupon discount was applied.
    CouponApplied(CouponAppliedData),

    /// Order contents were locked in; the checkout saga starts here.
    Confirmed(OrderConfirmedData),

    /// A payment attempt went in flight.
    PaymentPending(PaymentPendingData),

    /// Payment was captured.
    Paid(PaidData),

    /// The in-flight payment attempt failed; the order is back at Confirmed.
    PaymentFailed(OrderPaymentFailedData),

    /// Fulfilment started.
    Processing(ProcessingData),

    /// Goods were handed to the carrier (fully or partially).
    Shipped(ShippedData),

    /// Carrier confirmed delivery.
    Delivered(DeliveredData),

    /// Order finished cleanly.
    Completed(CompletedData),

    /// Customer requested a return.
    ReturnRequested(ReturnRequestedData),

    /// Return request was approved.
    ReturnApproved(ReturnApprovedData),

    /// Returned goods were received.
    Returned(ReturnedData),

    /// Order was cancelled.
    Cancelled(OrderCancelledData),

    /// Money was returned to the customer.
    Refunded(RefundedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "Order.Created.v1",
            OrderEvent::ItemAdded(_) => "Order.ItemAdded.v1",
            OrderEvent::ItemRemoved(_) => "Order.ItemRemoved.v1",
            OrderEvent::ItemQuantityUpdated(_) => "Order.ItemQuantityUpdated.v1",
            OrderEvent::CouponApplied(_) => "Order.CouponApplied.v1",
            OrderEvent::Confirmed(_) => "Order.Confirmed.v1",
            OrderEvent::PaymentPending(_) => "Order.PaymentPending.v1",
            OrderEvent::Paid(_) => "Order.Paid.v1",
            OrderEvent::PaymentFailed(_) => "Order.PaymentFailed.v1",
            OrderEvent::Processing(_) => "Order.Processing.v1",
            OrderEvent::Shipped(_) => "Order.Shipped.v1",
            OrderEvent::Delivered(_) => "Order.Delivered.v1",
            OrderEvent::Completed(_) => "Order.Completed.v1",
            OrderEvent::ReturnRequested(_) => "Order.ReturnRequested.v1",
            OrderEvent::ReturnApproved(_) => "Order.ReturnApproved.v1",
            OrderEvent::Returned(_) => "Order.Returned.v1",
            OrderEvent::Cancelled(_) => "Order.Cancelled.v1",
            OrderEvent::Refunded(_) => "Order.Refunded.v1",
        }
    }
}

/// Data for the Created event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAddedData {
    pub sku: Sku,
    pub quantity: u32,
    pub unit_price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub sku: Sku,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemQuantityUpdatedData {
    pub sku: Sku,
    pub old_quantity: u32,
    pub new_quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponAppliedData {
    pub code: String,
    pub discount: Money,
}

/// Data for the Confirmed event.
///
/// Carries the locked-in total so the saga can initiate a payment for
/// exactly this amount without reading order state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedData {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub grand_total: Money,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPendingData {
    pub payment_id: Option<AggregateId>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidData {
    pub payment_id: Option<AggregateId>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaymentFailedData {
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingData {
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippedData {
    pub carrier: String,
    pub tracking_number: String,
    /// True when only part of the order went out.
    pub partial: bool,
    pub shipped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveredData {
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedData {
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnRequestedData {
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnApprovedData {
    pub approved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnedData {
    pub returned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub reason: String,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundedData {
    pub refunded_at: DateTime<Utc>,
}

// Convenience constructors
impl OrderEvent {
    pub fn created(order_id: AggregateId, customer_id: CustomerId, currency: Currency) -> Self {
        OrderEvent::Created(OrderCreatedData {
            order_id,
            customer_id,
            currency,
            created_at: Utc::now(),
        })
    }

    pub fn item_added(sku: Sku, quantity: u32, unit_price: Money) -> Self {
        OrderEvent::ItemAdded(ItemAddedData {
            sku,
            quantity,
            unit_price,
        })
    }

    pub fn item_removed(sku: Sku) -> Self {
        OrderEvent::ItemRemoved(ItemRemovedData { sku })
    }

    pub fn item_quantity_updated(sku: Sku, old_quantity: u32, new_quantity: u32) -> Self {
        OrderEvent::ItemQuantityUpdated(ItemQuantityUpdatedData {
            sku,
            old_quantity,
            new_quantity,
        })
    }

    pub fn coupon_applied(code: impl Into<String>, discount: Money) -> Self {
        OrderEvent::CouponApplied(CouponAppliedData {
            code: code.into(),
            discount,
        })
    }

    pub fn confirmed(order_id: AggregateId, customer_id: CustomerId, grand_total: Money) -> Self {
        OrderEvent::Confirmed(OrderConfirmedData {
            order_id,
            customer_id,
            grand_total,
            confirmed_at: Utc::now(),
        })
    }

    pub fn payment_pending(payment_id: Option<AggregateId>) -> Self {
        OrderEvent::PaymentPending(PaymentPendingData {
            payment_id,
            recorded_at: Utc::now(),
        })
    }

    pub fn paid(payment_id: Option<AggregateId>) -> Self {
        OrderEvent::Paid(PaidData {
            payment_id,
            paid_at: Utc::now(),
        })
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        OrderEvent::PaymentFailed(OrderPaymentFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }

    pub fn processing() -> Self {
        OrderEvent::Processing(ProcessingData {
            started_at: Utc::now(),
        })
    }

    pub fn shipped(
        carrier: impl Into<String>,
        tracking_number: impl Into<String>,
        partial: bool,
    ) -> Self {
        OrderEvent::Shipped(ShippedData {
            carrier: carrier.into(),
            tracking_number: tracking_number.into(),
            partial,
            shipped_at: Utc::now(),
        })
    }

    pub fn delivered() -> Self {
        OrderEvent::Delivered(DeliveredData {
            delivered_at: Utc::now(),
        })
    }

    pub fn completed() -> Self {
        OrderEvent::Completed(CompletedData {
            completed_at: Utc::now(),
        })
    }

    pub fn return_requested(reason: impl Into<String>) -> Self {
        OrderEvent::ReturnRequested(ReturnRequestedData {
            reason: reason.into(),
            requested_at: Utc::now(),
        })
    }

    pub fn return_approved() -> Self {
        OrderEvent::ReturnApproved(ReturnApprovedData {
            approved_at: Utc::now(),
        })
    }

    pub fn returned() -> Self {
        OrderEvent::Returned(ReturnedData {
            returned_at: Utc::now(),
        })
    }

    pub fn cancelled(reason: impl Into<String>) -> Self {
        OrderEvent::Cancelled(OrderCancelledData {
            reason: reason.into(),
            cancelled_at: Utc::now(),
        })
    }

    pub fn refunded() -> Self {
        OrderEvent::Refunded(RefundedData {
            refunded_at: Utc::now(),
        })
    }
}
