//! Payment status, attempt history, and refund ledger entries.

use common::{AggregateId, Money};
use serde::{Deserialize, Serialize};

/// The status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// An attempt is in flight at the gateway.
    #[default]
    Pending,

    /// Captured. Terminal unless later refunded.
    Succeeded,

    /// The latest attempt failed; a retry may still be possible.
    Failed,

    /// Some, but not all, of the captured amount has been refunded.
    PartiallyRefunded,

    /// The full captured amount has been refunded (terminal).
    Refunded,
}

impl PaymentStatus {
    /// Returns true if refunds can be requested in this status.
    pub fn can_refund(&self) -> bool {
        matches!(self, PaymentStatus::Succeeded | PaymentStatus::PartiallyRefunded)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Succeeded => "Succeeded",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::PartiallyRefunded => "PartiallyRefunded",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single attempt at the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    /// Sent to the gateway, awaiting an outcome.
    Processing,

    /// The gateway captured the charge.
    Succeeded,

    /// The gateway declined or errored.
    Failed,
}

/// One entry in a payment's attempt history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// 1-based attempt number.
    pub number: u32,

    /// Current outcome of this attempt.
    pub status: AttemptStatus,

    /// Gateway reason when the attempt failed.
    pub failure_reason: Option<String>,
}

impl PaymentAttempt {
    /// Creates a new in-flight attempt.
    pub fn processing(number: u32) -> Self {
        Self {
            number,
            status: AttemptStatus::Processing,
            failure_reason: None,
        }
    }
}

/// Status of one refund entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundStatus {
    /// Requested but not yet settled by the gateway.
    Requested,

    /// Settled; the amount counts toward the refunded total.
    Completed,
}

/// One entry in a payment's refund ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundEntry {
    /// Unique refund identifier.
    pub id: AggregateId,

    /// Amount to return.
    pub amount: Money,

    /// Current status.
    pub status: RefundStatus,

    /// Why the refund was requested.
    pub reason: String,

    /// Gateway reference once completed.
    pub gateway_ref: Option<String>,
}

impl RefundEntry {
    /// Creates a new requested refund.
    pub fn requested(id: AggregateId, amount: Money, reason: impl Into<String>) -> Self {
        Self {
            id,
            amount,
            status: RefundStatus::Requested,
            reason: reason.into(),
            gateway_ref: None,
        }
    }

    /// Returns true if this refund has settled.
    pub fn is_completed(&self) -> bool {
        self.status == RefundStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_allowed_from_succeeded_and_partial() {
        assert!(PaymentStatus::Succeeded.can_refund());
        assert!(PaymentStatus::PartiallyRefunded.can_refund());
        assert!(!PaymentStatus::Pending.can_refund());
        assert!(!PaymentStatus::Failed.can_refund());
        assert!(!PaymentStatus::Refunded.can_refund());
    }

    #[test]
    fn new_refund_entry_is_requested() {
        let entry = RefundEntry::requested(AggregateId::new(), Money::from_cents(500), "damaged");
        assert_eq!(entry.status, RefundStatus::Requested);
        assert!(!entry.is_completed());
    }
}
