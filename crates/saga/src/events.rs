//! Checkout saga progress events.
//!
//! The saga instance is itself event-sourced: every transition of its
//! status is recorded as an event on the saga's own stream, so an
//! instance can be rebuilt after a crash and duplicate deliveries can
//! be detected against replayed state.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use domain::DomainEvent;
use serde::{Deserialize, Serialize};

/// Events recorded on a checkout saga instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// Checkout started for a confirmed order.
    Started(CheckoutStartedData),

    /// Stock was reserved; the order is now awaiting a payment outcome.
    ReservationSecured(ReservationSecuredData),

    /// Payment was captured; the checkout is complete.
    PaymentCaptured(PaymentCapturedData),

    /// A payment attempt failed; the saga either waits for a retry
    /// or gives up depending on the retry budget.
    PaymentAttemptFailed(PaymentAttemptFailedData),

    /// The checkout could not complete.
    Failed(CheckoutFailedData),
}

impl DomainEvent for SagaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::Started(_) => "Saga.CheckoutStarted.v1",
            SagaEvent::ReservationSecured(_) => "Saga.ReservationSecured.v1",
            SagaEvent::PaymentCaptured(_) => "Saga.PaymentCaptured.v1",
            SagaEvent::PaymentAttemptFailed(_) => "Saga.PaymentAttemptFailed.v1",
            SagaEvent::Failed(_) => "Saga.CheckoutFailed.v1",
        }
    }
}

/// Data for the Started event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutStartedData {
    pub saga_id: AggregateId,
    pub order_id: AggregateId,
    pub started_at: DateTime<Utc>,
}

/// Data for the ReservationSecured event.
///
/// The item id is kept alongside the reservation id so the saga can
/// address a release command at the right stream if the checkout fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSecuredData {
    pub reservation_id: AggregateId,
    pub item_id: AggregateId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapturedData {
    pub payment_id: AggregateId,
    pub amount: Money,
    pub completed_at: DateTime<Utc>,
}

/// Data for the PaymentAttemptFailed event.
///
/// `will_retry` is the saga's own verdict: the gateway said the attempt
/// is retryable and the retry budget is not exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAttemptFailedData {
    pub payment_id: AggregateId,
    pub reason: String,
    pub retry_count: u32,
    pub will_retry: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutFailedData {
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    pub fn started(saga_id: AggregateId, order_id: AggregateId) -> Self {
        SagaEvent::Started(CheckoutStartedData {
            saga_id,
            order_id,
            started_at: Utc::now(),
        })
    }

    pub fn reservation_secured(reservation_id: AggregateId, item_id: AggregateId) -> Self {
        SagaEvent::ReservationSecured(ReservationSecuredData {
            reservation_id,
            item_id,
        })
    }

    pub fn payment_captured(payment_id: AggregateId, amount: Money) -> Self {
        SagaEvent::PaymentCaptured(PaymentCapturedData {
            payment_id,
            amount,
            completed_at: Utc::now(),
        })
    }

    pub fn payment_attempt_failed(
        payment_id: AggregateId,
        reason: impl Into<String>,
        retry_count: u32,
        will_retry: bool,
    ) -> Self {
        SagaEvent::PaymentAttemptFailed(PaymentAttemptFailedData {
            payment_id,
            reason: reason.into(),
            retry_count,
            will_retry,
        })
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        SagaEvent::Failed(CheckoutFailedData {
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_versioned() {
        let saga_id = AggregateId::new();
        let order_id = AggregateId::new();

        assert_eq!(
            SagaEvent::started(saga_id, order_id).event_type(),
            "Saga.CheckoutStarted.v1"
        );
        assert_eq!(
            SagaEvent::reservation_secured(AggregateId::new(), AggregateId::new()).event_type(),
            "Saga.ReservationSecured.v1"
        );
        assert_eq!(
            SagaEvent::payment_captured(AggregateId::new(), Money::from_cents(1000)).event_type(),
            "Saga.PaymentCaptured.v1"
        );
        assert_eq!(
            SagaEvent::payment_attempt_failed(AggregateId::new(), "declined", 1, true)
                .event_type(),
            "Saga.PaymentAttemptFailed.v1"
        );
        assert_eq!(SagaEvent::failed("released").event_type(), "Saga.CheckoutFailed.v1");
    }

    #[test]
    fn attempt_failed_carries_retry_verdict() {
        let event = SagaEvent::payment_attempt_failed(AggregateId::new(), "declined", 3, false);

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::PaymentAttemptFailed(data) = deserialized {
            assert_eq!(data.retry_count, 3);
            assert!(!data.will_retry);
        } else {
            panic!("Expected PaymentAttemptFailed event");
        }
    }

    #[test]
    fn started_roundtrip_keeps_correlation() {
        let saga_id = AggregateId::new();
        let order_id = AggregateId::new();
        let event = SagaEvent::started(saga_id, order_id);

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: SagaEvent = serde_json::from_str(&json).unwrap();

        if let SagaEvent::Started(data) = deserialized {
            assert_eq!(data.saga_id, saga_id);
            assert_eq!(data.order_id, order_id);
        } else {
            panic!("Expected Started event");
        }
    }
}
