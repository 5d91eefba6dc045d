//! Order state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Transitions form a DAG:
/// ```text
/// Created ──► Confirmed ──► PaymentPending ──► Paid ──► Processing
///    │            │ ▲             │ │            │           │
///    │            │ └─────────────┘ │            │     ┌─────┴──────┐
///    │            │  payment failed │            │     ▼            ▼
///    │            │                 │            │  Shipped  PartiallyShipped
///    ▼            ▼                 ▼            ▼     │            │
/// Cancelled ◄────────────────────────────────────┘     └──► Delivered
///    │                                                        │
///    ▼                                      Completed ◄───────┤
/// Refunded ◄── Returned ◄── ReturnApproved ◄── ReturnRequested┘
/// ```
/// Cancellation is legal only before shipment; `Refunded` is reachable only
/// from `Cancelled` or `Returned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order is being assembled; items and coupons can still change.
    #[default]
    Created,

    /// Order contents are locked in and pricing is final.
    Confirmed,

    /// A payment attempt is in flight.
    PaymentPending,

    /// Payment captured.
    Paid,

    /// Order is being picked and packed.
    Processing,

    /// All items handed to the carrier.
    Shipped,

    /// Some items handed to the carrier, the rest still processing.
    PartiallyShipped,

    /// Carrier confirmed delivery.
    Delivered,

    /// Order finished cleanly (terminal).
    Completed,

    /// Customer asked to return the delivered order.
    ReturnRequested,

    /// Return request accepted, awaiting the goods.
    ReturnApproved,

    /// Goods received back (terminal unless refunded).
    Returned,

    /// Order cancelled before shipment (terminal unless refunded).
    Cancelled,

    /// Money returned to the customer (terminal).
    Refunded,
}

impl OrderStatus {
    /// Returns true if items and coupons can be modified in this status.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if the order can be confirmed.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if a payment attempt can be recorded as pending.
    pub fn can_record_payment_pending(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if a payment outcome can be recorded.
    ///
    /// Success moves to `Paid`; failure moves back to `Confirmed` so a new
    /// attempt can be started rather than dead-ending the order.
    pub fn can_record_payment_outcome(&self) -> bool {
        matches!(self, OrderStatus::PaymentPending)
    }

    /// Returns true if fulfilment can start.
    pub fn can_mark_processing(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }

    /// Returns true if a shipment can be recorded.
    pub fn can_record_shipment(&self) -> bool {
        matches!(self, OrderStatus::Processing | OrderStatus::PartiallyShipped)
    }

    /// Returns true if delivery can be recorded.
    pub fn can_record_delivery(&self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::PartiallyShipped)
    }

    /// Returns true if the order can be completed.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns true if the order can be cancelled.
    ///
    /// Never legal once goods have shipped.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created
                | OrderStatus::Confirmed
                | OrderStatus::PaymentPending
                | OrderStatus::Paid
        )
    }

    /// Returns true if a refund can be recorded.
    pub fn can_refund(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    /// Returns true if a return can be requested.
    pub fn can_request_return(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Returns true if a return request can be approved.
    pub fn can_approve_return(&self) -> bool {
        matches!(self, OrderStatus::ReturnRequested)
    }

    /// Returns true if returned goods can be recorded.
    pub fn can_record_return(&self) -> bool {
        matches!(self, OrderStatus::ReturnApproved)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Refunded)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::PaymentPending => "PaymentPending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::PartiallyShipped => "PartiallyShipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::ReturnRequested => "ReturnRequested",
            OrderStatus::ReturnApproved => "ReturnApproved",
            OrderStatus::Returned => "Returned",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }

    #[test]
    fn only_created_can_modify_items() {
        assert!(OrderStatus::Created.can_modify_items());
        assert!(!OrderStatus::Confirmed.can_modify_items());
        assert!(!OrderStatus::PaymentPending.can_modify_items());
        assert!(!OrderStatus::Paid.can_modify_items());
    }

    #[test]
    fn payment_outcome_only_from_payment_pending() {
        assert!(OrderStatus::PaymentPending.can_record_payment_outcome());
        assert!(!OrderStatus::Confirmed.can_record_payment_outcome());
        assert!(!OrderStatus::Paid.can_record_payment_outcome());
    }

    #[test]
    fn cancel_never_legal_after_shipment() {
        assert!(OrderStatus::Created.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(OrderStatus::PaymentPending.can_cancel());
        assert!(OrderStatus::Paid.can_cancel());
        assert!(!OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::PartiallyShipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Completed.can_cancel());
    }

    #[test]
    fn refund_only_from_cancelled_or_returned() {
        assert!(OrderStatus::Cancelled.can_refund());
        assert!(OrderStatus::Returned.can_refund());
        assert!(!OrderStatus::Paid.can_refund());
        assert!(!OrderStatus::Delivered.can_refund());
    }

    #[test]
    fn return_flow_guards() {
        assert!(OrderStatus::Delivered.can_request_return());
        assert!(OrderStatus::ReturnRequested.can_approve_return());
        assert!(OrderStatus::ReturnApproved.can_record_return());
        assert!(!OrderStatus::Shipped.can_request_return());
    }

    #[test]
    fn shipment_from_processing_or_partial() {
        assert!(OrderStatus::Processing.can_record_shipment());
        assert!(OrderStatus::PartiallyShipped.can_record_shipment());
        assert!(!OrderStatus::Paid.can_record_shipment());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Returned.is_terminal());
    }

    #[test]
    fn serialization_roundtrip() {
        let status = OrderStatus::PartiallyShipped;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
