//! Payment domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a payment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    /// A payment was initiated for an order; attempt #1 is in flight.
    Initiated(PaymentInitiatedData),

    /// The gateway captured the charge.
    Succeeded(PaymentSucceededData),

    /// The in-flight attempt failed.
    Failed(PaymentFailedData),

    /// A new attempt went in flight after a failure.
    Retried(PaymentRetriedData),

    /// A refund was requested against the captured amount.
    RefundRequested(RefundRequestedData),

    /// A requested refund settled at the gateway.
    RefundCompleted(RefundCompletedData),
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Initiated(_) => "Payments.PaymentInitiated.v1",
            PaymentEvent::Succeeded(_) => "Payments.PaymentSucceeded.v1",
            PaymentEvent::Failed(_) => "Payments.PaymentFailed.v1",
            PaymentEvent::Retried(_) => "Payments.PaymentRetried.v1",
            PaymentEvent::RefundRequested(_) => "Payments.RefundRequested.v1",
            PaymentEvent::RefundCompleted(_) => "Payments.RefundCompleted.v1",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitiatedData {
    pub payment_id: AggregateId,
    pub order_id: AggregateId,
    pub amount: Money,
    pub initiated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSucceededData {
    pub payment_id: AggregateId,
    pub order_id: AggregateId,
    pub amount: Money,
    pub gateway_txn_id: String,
    pub succeeded_at: DateTime<Utc>,
}

/// Data for the Failed event.
///
/// Carries the retry verdict so the checkout saga can decide between
/// waiting for a retry and cancelling the order without reading payment
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailedData {
    pub payment_id: AggregateId,
    pub order_id: AggregateId,
    pub reason: String,
    pub attempt_number: u32,
    pub can_retry: bool,
    pub failed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRetriedData {
    pub payment_id: AggregateId,
    pub order_id: AggregateId,
    pub attempt_number: u32,
    pub retried_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequestedData {
    pub refund_id: AggregateId,
    pub amount: Money,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCompletedData {
    pub refund_id: AggregateId,
    pub amount: Money,
    pub gateway_ref: String,
    pub completed_at: DateTime<Utc>,
}

// Convenience constructors
impl PaymentEvent {
    pub fn initiated(payment_id: AggregateId, order_id: AggregateId, amount: Money) -> Self {
        PaymentEvent::Initiated(PaymentInitiatedData {
            payment_id,
            order_id,
            amount,
            initiated_at: Utc::now(),
        })
    }

    pub fn succeeded(
        payment_id: AggregateId,
        order_id: AggregateId,
        amount: Money,
        gateway_txn_id: impl Into<String>,
    ) -> Self {
        PaymentEvent::Succeeded(PaymentSucceededData {
            payment_id,
            order_id,
            amount,
            gateway_txn_id: gateway_txn_id.into(),
            succeeded_at: Utc::now(),
        })
    }

    pub fn failed(
        payment_id: AggregateId,
        order_id: AggregateId,
        reason: impl Into<String>,
        attempt_number: u32,
        can_retry: bool,
    ) -> Self {
        PaymentEvent::Failed(PaymentFailedData {
            payment_id,
            order_id,
            reason: reason.into(),
            attempt_number,
            can_retry,
            failed_at: Utc::now(),
        })
    }

    pub fn retried(payment_id: AggregateId, order_id: AggregateId, attempt_number: u32) -> Self {
        PaymentEvent::Retried(PaymentRetriedData {
            payment_id,
            order_id,
            attempt_number,
            retried_at: Utc::now(),
        })
    }

    pub fn refund_requested(
        refund_id: AggregateId,
        amount: Money,
        reason: impl Into<String>,
    ) -> Self {
        PaymentEvent::RefundRequested(RefundRequestedData {
            refund_id,
            amount,
            reason: reason.into(),
            requested_at: Utc::now(),
        })
    }

    pub fn refund_completed(
        refund_id: AggregateId,
        amount: Money,
        gateway_ref: impl Into<String>,
    ) -> Self {
        PaymentEvent::RefundCompleted(RefundCompletedData {
            refund_id,
            amount,
            gateway_ref: gateway_ref.into(),
            completed_at: Utc::now(),
        })
    }
}
