//! Payment aggregate implementation.

use common::{AggregateId, Money};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    AttemptStatus, PaymentAttempt, PaymentError, PaymentEvent, PaymentStatus, RefundEntry,
    RefundStatus,
    events::{
        PaymentFailedData, PaymentInitiatedData, PaymentRetriedData, PaymentSucceededData,
        RefundCompletedData, RefundRequestedData,
    },
};

/// Hard cap on payment attempts, the initial one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Payment aggregate root.
///
/// Tracks one payment for one order: its attempt history against the
/// gateway, the retry budget, and the refund ledger. The refunded total
/// can never exceed the captured amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The order this payment settles.
    order_id: Option<AggregateId>,

    /// Amount to capture.
    amount: Money,

    /// Current status.
    status: PaymentStatus,

    /// Attempt history, oldest first.
    attempts: Vec<PaymentAttempt>,

    /// Refund ledger, oldest first.
    refunds: Vec<RefundEntry>,

    /// Gateway transaction reference from the successful capture.
    gateway_txn_id: Option<String>,
}

impl Aggregate for Payment {
    type Event = PaymentEvent;
    type Error = PaymentError;

    fn aggregate_type() -> &'static str {
        "Payment"
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
            PaymentEvent::Initiated(data) => self.apply_initiated(data),
            PaymentEvent::Succeeded(data) => self.apply_succeeded(data),
            PaymentEvent::Failed(data) => self.apply_failed(data),
            PaymentEvent::Retried(data) => self.apply_retried(data),
            PaymentEvent::RefundRequested(data) => self.apply_refund_requested(data),
            PaymentEvent::RefundCompleted(data) => self.apply_refund_completed(data),
        }
    }
}

// Query methods
impl Payment {
    /// Returns the order this payment settles.
    pub fn order_id(&self) -> Option<AggregateId> {
        self.order_id
    }

    /// Returns the amount to capture.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the current status.
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Returns the attempt history.
    pub fn attempts(&self) -> &[PaymentAttempt] {
        &self.attempts
    }

    /// Returns how many attempts have been made.
    pub fn attempt_count(&self) -> u32 {
        self.attempts.len() as u32
    }

    /// Returns true if another attempt fits the retry budget.
    pub fn can_retry(&self) -> bool {
        self.attempt_count() < MAX_ATTEMPTS
    }

    /// Returns the refund ledger.
    pub fn refunds(&self) -> &[RefundEntry] {
        &self.refunds
    }

    /// Returns the sum of completed refunds.
    pub fn total_refunded(&self) -> Money {
        self.refunds
            .iter()
            .filter(|r| r.is_completed())
            .fold(Money::zero(self.amount.currency()), |acc, r| acc + r.amount)
    }

    /// Returns the gateway reference from the successful capture.
    pub fn gateway_txn_id(&self) -> Option<&str> {
        self.gateway_txn_id.as_deref()
    }
}

// Command methods (return events)
impl Payment {
    /// Initiates a payment for an order; attempt #1 goes in flight.
    pub fn initiate(
        &self,
        payment_id: AggregateId,
        order_id: AggregateId,
        amount: Money,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        if self.id.is_some() {
            return Err(PaymentError::AlreadyInitiated);
        }

        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount {
                amount: amount.cents(),
            });
        }

        Ok(vec![PaymentEvent::initiated(payment_id, order_id, amount)])
    }

    /// Records a successful capture from the gateway.
    pub fn record_success(
        &self,
        gateway_txn_id: impl Into<String>,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        let (payment_id, order_id) = self.require_initiated()?;

        if self.status != PaymentStatus::Pending {
            return Err(PaymentError::NotPending {
                status: self.status,
            });
        }

        Ok(vec![PaymentEvent::succeeded(
            payment_id,
            order_id,
            self.amount,
            gateway_txn_id,
        )])
    }

    /// Records a failed attempt.
    ///
    /// The emitted event carries the retry verdict so consumers need not
    /// read payment state to decide what happens next.
    pub fn record_failure(
        &self,
        reason: impl Into<String>,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        let (payment_id, order_id) = self.require_initiated()?;

        if self.status != PaymentStatus::Pending {
            return Err(PaymentError::NotPending {
                status: self.status,
            });
        }

        Ok(vec![PaymentEvent::failed(
            payment_id,
            order_id,
            reason,
            self.attempt_count(),
            self.can_retry(),
        )])
    }

    /// Starts another attempt after a failure.
    pub fn retry(&self) -> Result<Vec<PaymentEvent>, PaymentError> {
        let (payment_id, order_id) = self.require_initiated()?;

        if self.status != PaymentStatus::Failed {
            return Err(PaymentError::NotFailed {
                status: self.status,
            });
        }

        if !self.can_retry() {
            return Err(PaymentError::MaxRetriesExceeded {
                attempts: self.attempt_count(),
            });
        }

        Ok(vec![PaymentEvent::retried(
            payment_id,
            order_id,
            self.attempt_count() + 1,
        )])
    }

    /// Requests a refund against the captured amount.
    pub fn request_refund(
        &self,
        amount: Money,
        reason: impl Into<String>,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        self.require_initiated()?;

        if !self.status.can_refund() {
            return Err(PaymentError::RefundNotAllowed {
                status: self.status,
            });
        }

        if !amount.is_positive() {
            return Err(PaymentError::InvalidAmount {
                amount: amount.cents(),
            });
        }

        // Count requested-but-unsettled refunds too, so concurrent requests
        // cannot oversubscribe the captured amount between completions.
        let outstanding = self
            .refunds
            .iter()
            .fold(Money::zero(self.amount.currency()), |acc, r| acc + r.amount);
        let refundable = self.amount - outstanding;
        if amount.cents() > refundable.cents() {
            return Err(PaymentError::RefundExceedsAmount {
                requested: amount.cents(),
                refundable: refundable.cents(),
            });
        }

        Ok(vec![PaymentEvent::refund_requested(
            AggregateId::new(),
            amount,
            reason,
        )])
    }

    /// Completes a requested refund with the gateway's reference.
    pub fn complete_refund(
        &self,
        refund_id: AggregateId,
        gateway_ref: impl Into<String>,
    ) -> Result<Vec<PaymentEvent>, PaymentError> {
        self.require_initiated()?;

        let refund = self
            .refunds
            .iter()
            .find(|r| r.id == refund_id)
            .ok_or_else(|| PaymentError::RefundNotFound {
                refund_id: refund_id.to_string(),
            })?;

        if refund.status != RefundStatus::Requested {
            return Err(PaymentError::RefundAlreadyCompleted {
                refund_id: refund_id.to_string(),
            });
        }

        Ok(vec![PaymentEvent::refund_completed(
            refund_id,
            refund.amount,
            gateway_ref,
        )])
    }
}

// Validation and apply helpers
impl Payment {
    fn require_initiated(&self) -> Result<(AggregateId, AggregateId), PaymentError> {
        match (self.id, self.order_id) {
            (Some(id), Some(order_id)) => Ok((id, order_id)),
            _ => Err(PaymentError::NotInitiated),
        }
    }

    fn apply_initiated(&mut self, data: PaymentInitiatedData) {
        self.id = Some(data.payment_id);
        self.order_id = Some(data.order_id);
        self.amount = data.amount;
        self.status = PaymentStatus::Pending;
        self.attempts.push(PaymentAttempt::processing(1));
    }

    fn apply_succeeded(&mut self, data: PaymentSucceededData) {
        self.status = PaymentStatus::Succeeded;
        self.gateway_txn_id = Some(data.gateway_txn_id);
        if let Some(attempt) = self.attempts.last_mut() {
            attempt.status = AttemptStatus::Succeeded;
        }
    }

    fn apply_failed(&mut self, data: PaymentFailedData) {
        self.status = PaymentStatus::Failed;
        if let Some(attempt) = self.attempts.last_mut() {
            attempt.status = AttemptStatus::Failed;
            attempt.failure_reason = Some(data.reason);
        }
    }

    fn apply_retried(&mut self, data: PaymentRetriedData) {
        self.status = PaymentStatus::Pending;
        self.attempts
            .push(PaymentAttempt::processing(data.attempt_number));
    }

    fn apply_refund_requested(&mut self, data: RefundRequestedData) {
        self.refunds
            .push(RefundEntry::requested(data.refund_id, data.amount, data.reason));
    }

    fn apply_refund_completed(&mut self, data: RefundCompletedData) {
        if let Some(refund) = self.refunds.iter_mut().find(|r| r.id == data.refund_id) {
            refund.status = RefundStatus::Completed;
            refund.gateway_ref = Some(data.gateway_ref);
        }

        self.status = if self.total_refunded().cents() < self.amount.cents() {
            PaymentStatus::PartiallyRefunded
        } else {
            PaymentStatus::Refunded
        };
    }
}
