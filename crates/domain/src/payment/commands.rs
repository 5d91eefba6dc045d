//! Payment commands.

use common::{AggregateId, Money};

use crate::command::Command;

use super::Payment;

/// Command to initiate a payment for an order.
#[derive(Debug, Clone)]
pub struct Initiate {
    /// The payment ID to create.
    pub payment_id: AggregateId,

    /// The order being paid for.
    pub order_id: AggregateId,

    /// Amount to capture.
    pub amount: Money,
}

impl Initiate {
    /// Creates a new Initiate command.
    pub fn new(payment_id: AggregateId, order_id: AggregateId, amount: Money) -> Self {
        Self {
            payment_id,
            order_id,
            amount,
        }
    }

    /// Creates a new Initiate command with a generated payment ID.
    pub fn for_order(order_id: AggregateId, amount: Money) -> Self {
        Self {
            payment_id: AggregateId::new(),
            order_id,
            amount,
        }
    }
}

impl Command for Initiate {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}

/// Command to record a successful capture.
#[derive(Debug, Clone)]
pub struct RecordSuccess {
    /// The payment that was captured.
    pub payment_id: AggregateId,

    /// Gateway transaction reference.
    pub gateway_txn_id: String,
}

impl RecordSuccess {
    /// Creates a new RecordSuccess command.
    pub fn new(payment_id: AggregateId, gateway_txn_id: impl Into<String>) -> Self {
        Self {
            payment_id,
            gateway_txn_id: gateway_txn_id.into(),
        }
    }
}

impl Command for RecordSuccess {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}

/// Command to record a failed attempt.
#[derive(Debug, Clone)]
pub struct RecordFailure {
    /// The payment whose attempt failed.
    pub payment_id: AggregateId,

    /// Gateway failure reason.
    pub reason: String,
}

impl RecordFailure {
    /// Creates a new RecordFailure command.
    pub fn new(payment_id: AggregateId, reason: impl Into<String>) -> Self {
        Self {
            payment_id,
            reason: reason.into(),
        }
    }
}

impl Command for RecordFailure {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}

/// Command to start another attempt after a failure.
#[derive(Debug, Clone)]
pub struct Retry {
    /// The payment to retry.
    pub payment_id: AggregateId,
}

impl Retry {
    /// Creates a new Retry command.
    pub fn new(payment_id: AggregateId) -> Self {
        Self { payment_id }
    }
}

impl Command for Retry {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}

/// Command to request a refund.
#[derive(Debug, Clone)]
pub struct RequestRefund {
    /// The payment to refund against.
    pub payment_id: AggregateId,

    /// Amount to return.
    pub amount: Money,

    /// Why the refund was requested.
    pub reason: String,
}

impl RequestRefund {
    /// Creates a new RequestRefund command.
    pub fn new(payment_id: AggregateId, amount: Money, reason: impl Into<String>) -> Self {
        Self {
            payment_id,
            amount,
            reason: reason.into(),
        }
    }
}

impl Command for RequestRefund {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}

/// Command to complete a requested refund.
#[derive(Debug, Clone)]
pub struct CompleteRefund {
    /// The payment holding the refund.
    pub payment_id: AggregateId,

    /// The refund entry to complete.
    pub refund_id: AggregateId,

    /// Gateway settlement reference.
    pub gateway_ref: String,
}

impl CompleteRefund {
    /// Creates a new CompleteRefund command.
    pub fn new(
        payment_id: AggregateId,
        refund_id: AggregateId,
        gateway_ref: impl Into<String>,
    ) -> Self {
        Self {
            payment_id,
            refund_id,
            gateway_ref: gateway_ref.into(),
        }
    }
}

impl Command for CompleteRefund {
    type Aggregate = Payment;

    fn aggregate_id(&self) -> AggregateId {
        self.payment_id
    }
}
