//! Event-sourced checkout saga instance.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money};
use domain::Aggregate;
use event_store::Version;

use crate::error::SagaError;
use crate::events::SagaEvent;
use crate::state::SagaStatus;

/// The progress record of one checkout, keyed by order.
///
/// The instance owns no business data beyond correlation ids and
/// progress: the order, inventory, and payment machines each own their
/// own state and validate every command the saga issues to them.
#[derive(Debug, Clone, Default)]
pub struct SagaInstance {
    id: Option<AggregateId>,
    version: Version,
    order_id: Option<AggregateId>,
    status: SagaStatus,
    reservation_id: Option<AggregateId>,
    item_id: Option<AggregateId>,
    payment_id: Option<AggregateId>,
    captured_amount: Option<Money>,
    retry_count: u32,
    failure_reason: Option<String>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Aggregate for SagaInstance {
    type Event = SagaEvent;
    type Error = SagaError;

    fn aggregate_type() -> &'static str {
        "CheckoutSaga"
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
            SagaEvent::Started(data) => {
                self.id = Some(data.saga_id);
                self.order_id = Some(data.order_id);
                self.started_at = Some(data.started_at);
                self.status = SagaStatus::AwaitingReservation;
            }
            SagaEvent::ReservationSecured(data) => {
                self.reservation_id = Some(data.reservation_id);
                self.item_id = Some(data.item_id);
                self.status = SagaStatus::AwaitingPayment;
            }
            SagaEvent::PaymentCaptured(data) => {
                self.payment_id = Some(data.payment_id);
                self.captured_amount = Some(data.amount);
                self.completed_at = Some(data.completed_at);
                self.status = SagaStatus::Completed;
            }
            SagaEvent::PaymentAttemptFailed(data) => {
                self.payment_id = Some(data.payment_id);
                self.retry_count = data.retry_count;
                self.failure_reason = Some(data.reason);
                if data.will_retry {
                    self.status = SagaStatus::Retrying;
                }
                // Otherwise a Failed event follows in the same batch.
            }
            SagaEvent::Failed(data) => {
                self.failure_reason = Some(data.reason);
                self.completed_at = Some(data.failed_at);
                self.status = SagaStatus::Failed;
            }
        }
    }
}

// Query methods
impl SagaInstance {
    /// Returns the order this saga coordinates.
    pub fn order_id(&self) -> Option<AggregateId> {
        self.order_id
    }

    /// Returns the current status.
    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Returns the reservation secured for this checkout, if any.
    pub fn reservation_id(&self) -> Option<AggregateId> {
        self.reservation_id
    }

    /// Returns the inventory item holding the reservation, if any.
    pub fn item_id(&self) -> Option<AggregateId> {
        self.item_id
    }

    /// Returns the payment observed for this checkout, if any.
    pub fn payment_id(&self) -> Option<AggregateId> {
        self.payment_id
    }

    /// Returns the captured amount once the checkout completed.
    pub fn captured_amount(&self) -> Option<Money> {
        self.captured_amount
    }

    /// Returns the number of failed payment attempts observed.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the most recent failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns when the saga started.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the saga reached a terminal status.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (SagaInstance, AggregateId, AggregateId) {
        let saga_id = AggregateId::new();
        let order_id = AggregateId::new();
        let mut saga = SagaInstance::default();
        saga.apply(SagaEvent::started(saga_id, order_id));
        (saga, saga_id, order_id)
    }

    #[test]
    fn test_new_instance() {
        let saga = SagaInstance::default();
        assert_eq!(saga.status(), SagaStatus::New);
        assert!(saga.id().is_none());
        assert!(saga.order_id().is_none());
        assert_eq!(saga.version(), Version::initial());
    }

    #[test]
    fn test_started() {
        let (saga, saga_id, order_id) = started();

        assert_eq!(saga.id(), Some(saga_id));
        assert_eq!(saga.order_id(), Some(order_id));
        assert_eq!(saga.status(), SagaStatus::AwaitingReservation);
        assert!(saga.started_at().is_some());
        assert!(saga.completed_at().is_none());
    }

    #[test]
    fn test_happy_path_replay() {
        let (mut saga, _, _) = started();
        let reservation_id = AggregateId::new();
        let item_id = AggregateId::new();
        let payment_id = AggregateId::new();

        saga.apply(SagaEvent::reservation_secured(reservation_id, item_id));
        assert_eq!(saga.status(), SagaStatus::AwaitingPayment);
        assert_eq!(saga.reservation_id(), Some(reservation_id));
        assert_eq!(saga.item_id(), Some(item_id));

        saga.apply(SagaEvent::payment_captured(
            payment_id,
            Money::from_cents(4500),
        ));
        assert_eq!(saga.status(), SagaStatus::Completed);
        assert_eq!(saga.payment_id(), Some(payment_id));
        assert_eq!(saga.captured_amount(), Some(Money::from_cents(4500)));
        assert!(saga.completed_at().is_some());
        assert!(saga.status().is_terminal());
    }

    #[test]
    fn test_retry_path() {
        let (mut saga, _, _) = started();
        let payment_id = AggregateId::new();

        saga.apply(SagaEvent::reservation_secured(AggregateId::new(), AggregateId::new()));
        saga.apply(SagaEvent::payment_attempt_failed(
            payment_id,
            "card declined",
            1,
            true,
        ));

        assert_eq!(saga.status(), SagaStatus::Retrying);
        assert_eq!(saga.retry_count(), 1);
        assert_eq!(saga.failure_reason(), Some("card declined"));
        assert!(saga.status().awaits_payment_outcome());

        // Retry succeeds
        saga.apply(SagaEvent::payment_captured(
            payment_id,
            Money::from_cents(4500),
        ));
        assert_eq!(saga.status(), SagaStatus::Completed);
    }

    #[test]
    fn test_exhausted_retries_replay() {
        let (mut saga, _, _) = started();
        let payment_id = AggregateId::new();

        saga.apply(SagaEvent::reservation_secured(AggregateId::new(), AggregateId::new()));
        saga.apply(SagaEvent::payment_attempt_failed(
            payment_id,
            "card declined",
            3,
            false,
        ));
        saga.apply(SagaEvent::failed("card declined"));

        assert_eq!(saga.status(), SagaStatus::Failed);
        assert_eq!(saga.retry_count(), 3);
        assert_eq!(saga.failure_reason(), Some("card declined"));
        assert!(saga.completed_at().is_some());
    }

    #[test]
    fn test_failed_on_release() {
        let (mut saga, _, _) = started();

        saga.apply(SagaEvent::reservation_secured(AggregateId::new(), AggregateId::new()));
        saga.apply(SagaEvent::failed("reservation expired"));

        assert_eq!(saga.status(), SagaStatus::Failed);
        assert_eq!(saga.failure_reason(), Some("reservation expired"));
    }
}
