//! Payment service providing a simplified API for payment operations.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    CompleteRefund, Initiate, Payment, RecordFailure, RecordSuccess, RequestRefund, Retry,
};

impl From<super::PaymentError> for DomainError {
    fn from(e: super::PaymentError) -> Self {
        DomainError::Payment(e)
    }
}

/// Service for managing payments.
///
/// All payment events are correlated by the order id the payment
/// settles, so the checkout saga can pick them up without knowing the
/// payment's own stream id.
pub struct PaymentService<S: EventStore> {
    handler: CommandHandler<S, Payment>,
}

impl<S: EventStore> PaymentService<S> {
    /// Creates a new payment service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Payment> {
        &self.handler
    }

    /// Initiates a payment for an order.
    #[tracing::instrument(skip(self))]
    pub async fn initiate(&self, cmd: Initiate) -> Result<CommandResult<Payment>, DomainError> {
        let payment_id = cmd.payment_id;
        let order_id = cmd.order_id;
        let amount = cmd.amount;

        let result = self
            .handler
            .execute(payment_id, Some(order_id), |payment| {
                payment.initiate(payment_id, order_id, amount)
            })
            .await?;

        metrics::counter!("payments_initiated_total").increment(1);
        Ok(result)
    }

    /// Records a successful capture.
    #[tracing::instrument(skip(self))]
    pub async fn record_success(
        &self,
        cmd: RecordSuccess,
    ) -> Result<CommandResult<Payment>, DomainError> {
        let gateway_txn_id = cmd.gateway_txn_id.clone();
        let correlation_id = self.order_id_for(cmd.payment_id).await?;

        let result = self
            .handler
            .execute(cmd.payment_id, correlation_id, |payment| {
                payment.record_success(gateway_txn_id)
            })
            .await?;

        metrics::counter!("payments_succeeded_total").increment(1);
        Ok(result)
    }

    /// Records a failed attempt.
    #[tracing::instrument(skip(self))]
    pub async fn record_failure(
        &self,
        cmd: RecordFailure,
    ) -> Result<CommandResult<Payment>, DomainError> {
        let reason = cmd.reason.clone();
        let correlation_id = self.order_id_for(cmd.payment_id).await?;

        let result = self
            .handler
            .execute(cmd.payment_id, correlation_id, |payment| {
                payment.record_failure(reason)
            })
            .await?;

        metrics::counter!("payments_failed_total").increment(1);
        Ok(result)
    }

    /// Starts another attempt after a failure.
    #[tracing::instrument(skip(self))]
    pub async fn retry(&self, cmd: Retry) -> Result<CommandResult<Payment>, DomainError> {
        let correlation_id = self.order_id_for(cmd.payment_id).await?;

        self.handler
            .execute(cmd.payment_id, correlation_id, |payment| payment.retry())
            .await
    }

    /// Requests a refund.
    #[tracing::instrument(skip(self))]
    pub async fn request_refund(
        &self,
        cmd: RequestRefund,
    ) -> Result<CommandResult<Payment>, DomainError> {
        let amount = cmd.amount;
        let reason = cmd.reason.clone();
        let correlation_id = self.order_id_for(cmd.payment_id).await?;

        self.handler
            .execute(cmd.payment_id, correlation_id, |payment| {
                payment.request_refund(amount, reason)
            })
            .await
    }

    /// Completes a requested refund.
    #[tracing::instrument(skip(self))]
    pub async fn complete_refund(
        &self,
        cmd: CompleteRefund,
    ) -> Result<CommandResult<Payment>, DomainError> {
        let refund_id = cmd.refund_id;
        let gateway_ref = cmd.gateway_ref.clone();
        let correlation_id = self.order_id_for(cmd.payment_id).await?;

        self.handler
            .execute(cmd.payment_id, correlation_id, |payment| {
                payment.complete_refund(refund_id, gateway_ref)
            })
            .await
    }

    /// Loads a payment by ID.
    ///
    /// Returns None if the payment doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_payment(
        &self,
        payment_id: AggregateId,
    ) -> Result<Option<Payment>, DomainError> {
        self.handler.load_existing(payment_id).await
    }

    async fn order_id_for(
        &self,
        payment_id: AggregateId,
    ) -> Result<Option<AggregateId>, DomainError> {
        let payment = self.handler.load(payment_id).await?;
        Ok(payment.order_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{PaymentEvent, PaymentStatus};
    use common::Money;
    use event_store::InMemoryEventStore;

    async fn initiated(
        service: &PaymentService<InMemoryEventStore>,
        order_id: AggregateId,
    ) -> AggregateId {
        let cmd = Initiate::for_order(order_id, Money::from_cents(2500));
        let payment_id = cmd.payment_id;
        service.initiate(cmd).await.unwrap();
        payment_id
    }

    #[tokio::test]
    async fn test_initiate_and_succeed() {
        let store = InMemoryEventStore::new();
        let service = PaymentService::new(store);
        let payment_id = initiated(&service, AggregateId::new()).await;

        let result = service
            .record_success(RecordSuccess::new(payment_id, "txn-1"))
            .await
            .unwrap();

        assert_eq!(result.aggregate.status(), PaymentStatus::Succeeded);
        assert_eq!(result.aggregate.attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let store = InMemoryEventStore::new();
        let service = PaymentService::new(store);
        let payment_id = initiated(&service, AggregateId::new()).await;

        service
            .record_failure(RecordFailure::new(payment_id, "card declined"))
            .await
            .unwrap();

        let result = service.retry(Retry::new(payment_id)).await.unwrap();
        assert_eq!(result.aggregate.status(), PaymentStatus::Pending);
        assert_eq!(result.aggregate.attempt_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retry_budget_rejected() {
        let store = InMemoryEventStore::new();
        let service = PaymentService::new(store);
        let payment_id = initiated(&service, AggregateId::new()).await;

        for _ in 0..2 {
            service
                .record_failure(RecordFailure::new(payment_id, "declined"))
                .await
                .unwrap();
            service.retry(Retry::new(payment_id)).await.unwrap();
        }
        service
            .record_failure(RecordFailure::new(payment_id, "declined"))
            .await
            .unwrap();

        let result = service.retry(Retry::new(payment_id)).await;
        assert!(matches!(result, Err(DomainError::Payment(_))));
    }

    #[tokio::test]
    async fn test_refund_cycle() {
        let store = InMemoryEventStore::new();
        let service = PaymentService::new(store);
        let payment_id = initiated(&service, AggregateId::new()).await;
        service
            .record_success(RecordSuccess::new(payment_id, "txn-1"))
            .await
            .unwrap();

        let result = service
            .request_refund(RequestRefund::new(
                payment_id,
                Money::from_cents(2500),
                "order returned",
            ))
            .await
            .unwrap();
        let refund_id = match &result.events[0] {
            PaymentEvent::RefundRequested(data) => data.refund_id,
            other => panic!("Expected RefundRequested, got {other:?}"),
        };

        let result = service
            .complete_refund(CompleteRefund::new(payment_id, refund_id, "rfn-1"))
            .await
            .unwrap();

        assert_eq!(result.aggregate.status(), PaymentStatus::Refunded);
        assert_eq!(result.aggregate.total_refunded().cents(), 2500);
    }

    #[tokio::test]
    async fn test_payment_events_correlated_by_order() {
        let store = InMemoryEventStore::new();
        let service = PaymentService::new(store.clone());
        let order_id = AggregateId::new();
        let payment_id = initiated(&service, order_id).await;

        service
            .record_success(RecordSuccess::new(payment_id, "txn-1"))
            .await
            .unwrap();

        let events = store.get_events_for_aggregate(payment_id).await.unwrap();
        assert!(events
            .iter()
            .all(|e| e.correlation_id == Some(order_id)));
    }
}
