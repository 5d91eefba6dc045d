//! Payment aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod state;

pub use aggregate::{MAX_ATTEMPTS, Payment};
pub use commands::*;
pub use events::{
    PaymentEvent, PaymentFailedData, PaymentInitiatedData, PaymentRetriedData,
    PaymentSucceededData, RefundCompletedData, RefundRequestedData,
};
pub use service::PaymentService;
pub use state::{AttemptStatus, PaymentAttempt, PaymentStatus, RefundEntry, RefundStatus};

use thiserror::Error;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment is already initiated.
    #[error("Payment already initiated")]
    AlreadyInitiated,

    /// Payment has not been initiated yet.
    #[error("Payment not initiated")]
    NotInitiated,

    /// Amount must be greater than zero.
    #[error("Invalid amount: {amount} (must be greater than 0)")]
    InvalidAmount { amount: i64 },

    /// Operation requires the Pending status.
    #[error("Payment is {status}, expected Pending")]
    NotPending { status: PaymentStatus },

    /// Retry requires the Failed status.
    #[error("Payment is {status}, expected Failed")]
    NotFailed { status: PaymentStatus },

    /// Retry budget is exhausted.
    #[error("Max retries exceeded: {attempts} attempts made")]
    MaxRetriesExceeded { attempts: u32 },

    /// Refunds are only legal against captured payments.
    #[error("Cannot refund a payment in {status} status")]
    RefundNotAllowed { status: PaymentStatus },

    /// Refund would exceed the captured amount.
    #[error("Refund of {requested} exceeds remaining refundable amount {refundable}")]
    RefundExceedsAmount { requested: i64, refundable: i64 },

    /// Refund entry not found.
    #[error("Refund not found: {refund_id}")]
    RefundNotFound { refund_id: String },

    /// Refund entry is not awaiting completion.
    #[error("Refund {refund_id} has already completed")]
    RefundAlreadyCompleted { refund_id: String },
}
