//! Checkout saga status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The status of a checkout saga instance.
///
/// Transitions:
/// ```text
/// New → AwaitingReservation → AwaitingPayment → Completed
///                                  ↓       ↑
///                               Retrying ──┘
///                                  ↓
///                                Failed   (also reachable from any
///                                          non-terminal status via
///                                          a reservation release)
/// ```
///
/// `Completed` and `Failed` are terminal. Once reached, no event handler
/// mutates the instance again; duplicate deliveries are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SagaStatus {
    /// No events have been observed for this order yet.
    #[default]
    New,

    /// The order was confirmed; waiting for stock to be reserved.
    AwaitingReservation,

    /// Stock is reserved; waiting for a payment outcome.
    AwaitingPayment,

    /// A payment attempt failed with retry budget remaining; waiting
    /// for an externally driven retry to produce a new outcome.
    Retrying,

    /// Payment was captured and the order marked paid.
    Completed,

    /// The checkout could not complete; the order was cancelled.
    Failed,
}

impl SagaStatus {
    /// Returns true if a reservation event should advance this saga.
    pub fn awaits_reservation(&self) -> bool {
        matches!(self, SagaStatus::AwaitingReservation)
    }

    /// Returns true if a payment outcome event should advance this saga.
    ///
    /// Both `AwaitingPayment` and `Retrying` accept an outcome: a retry
    /// produces the same succeeded/failed events as the first attempt.
    pub fn awaits_payment_outcome(&self) -> bool {
        matches!(self, SagaStatus::AwaitingPayment | SagaStatus::Retrying)
    }

    /// Returns true if the saga has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaStatus::Completed | SagaStatus::Failed)
    }

    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::New => "New",
            SagaStatus::AwaitingReservation => "AwaitingReservation",
            SagaStatus::AwaitingPayment => "AwaitingPayment",
            SagaStatus::Retrying => "Retrying",
            SagaStatus::Completed => "Completed",
            SagaStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_new() {
        assert_eq!(SagaStatus::default(), SagaStatus::New);
    }

    #[test]
    fn test_awaits_reservation() {
        assert!(SagaStatus::AwaitingReservation.awaits_reservation());

        assert!(!SagaStatus::New.awaits_reservation());
        assert!(!SagaStatus::AwaitingPayment.awaits_reservation());
        assert!(!SagaStatus::Retrying.awaits_reservation());
        assert!(!SagaStatus::Completed.awaits_reservation());
        assert!(!SagaStatus::Failed.awaits_reservation());
    }

    #[test]
    fn test_awaits_payment_outcome() {
        assert!(SagaStatus::AwaitingPayment.awaits_payment_outcome());
        assert!(SagaStatus::Retrying.awaits_payment_outcome());

        assert!(!SagaStatus::New.awaits_payment_outcome());
        assert!(!SagaStatus::AwaitingReservation.awaits_payment_outcome());
        assert!(!SagaStatus::Completed.awaits_payment_outcome());
        assert!(!SagaStatus::Failed.awaits_payment_outcome());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SagaStatus::Completed.is_terminal());
        assert!(SagaStatus::Failed.is_terminal());

        assert!(!SagaStatus::New.is_terminal());
        assert!(!SagaStatus::AwaitingReservation.is_terminal());
        assert!(!SagaStatus::AwaitingPayment.is_terminal());
        assert!(!SagaStatus::Retrying.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaStatus::AwaitingReservation.to_string(), "AwaitingReservation");
        assert_eq!(SagaStatus::Retrying.to_string(), "Retrying");
    }

    #[test]
    fn test_serialization() {
        let status = SagaStatus::AwaitingPayment;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: SagaStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
