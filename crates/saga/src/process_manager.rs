//! Event-driven checkout saga.

use common::AggregateId;
use domain::inventory::{ReservationReleasedData, StockReservedData};
use domain::order::OrderConfirmedData;
use domain::payment::{PaymentFailedData, PaymentSucceededData};
use domain::{
    Aggregate, Cancel, DomainError, InventoryEvent, InventoryService, OrderEvent, OrderService,
    PaymentEvent, RecordPaymentPending, RecordPaymentSuccess, Release,
};
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};
use uuid::Uuid;

use crate::aggregate::SagaInstance;
use crate::error::SagaError;
use crate::events::SagaEvent;
use crate::state::SagaStatus;

/// Maximum number of failed payment attempts before the saga gives up
/// and cancels the order.
pub const MAX_RETRIES: u32 = 3;

/// Returns the saga stream id for an order.
///
/// The id is derived deterministically from the order id, so a
/// redelivered `Order.Confirmed.v1` maps to the same stream instead of
/// spawning a second instance.
pub fn saga_id_for(order_id: AggregateId) -> AggregateId {
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, order_id.as_uuid().as_bytes());
    AggregateId::from_uuid(uuid)
}

/// Orchestrates checkout across the order, inventory, and payment machines.
///
/// The saga subscribes to events from the three machines, correlates them
/// by order id, and issues follow-up commands. It never reads machine
/// state directly and never assumes a command it issues will be accepted:
/// its own event-sourced status is the sole source of truth for what
/// happens next.
///
/// Handlers are idempotent. Each re-checks the expected status against
/// replayed state before acting, so at-least-once delivery of the same
/// event is a no-op once the saga has advanced past it.
pub struct CheckoutSaga<S: EventStore> {
    store: S,
    orders: OrderService<S>,
    inventory: InventoryService<S>,
}

impl<S: EventStore + Clone> CheckoutSaga<S> {
    /// Creates a new checkout saga over the given event store.
    pub fn new(store: S) -> Self {
        let orders = OrderService::new(store.clone());
        let inventory = InventoryService::new(store.clone());
        Self {
            store,
            orders,
            inventory,
        }
    }

    /// Routes one event envelope to the matching handler.
    ///
    /// Envelopes the saga doesn't care about are ignored.
    #[tracing::instrument(skip(self, envelope), fields(event_type = %envelope.event_type))]
    pub async fn handle(&self, envelope: &EventEnvelope) -> Result<(), SagaError> {
        match envelope.event_type.as_str() {
            "Order.Confirmed.v1" => {
                let event: OrderEvent = serde_json::from_value(envelope.payload.clone())?;
                if let OrderEvent::Confirmed(data) = event {
                    self.on_order_confirmed(data).await?;
                }
            }
            "Inventory.StockReserved.v1" => {
                let event: InventoryEvent = serde_json::from_value(envelope.payload.clone())?;
                if let InventoryEvent::StockReserved(data) = event {
                    self.on_stock_reserved(envelope.aggregate_id, data).await?;
                }
            }
            "Inventory.ReservationReleased.v1" => {
                let event: InventoryEvent = serde_json::from_value(envelope.payload.clone())?;
                if let InventoryEvent::ReservationReleased(data) = event {
                    self.on_reservation_released(data).await?;
                }
            }
            "Payments.PaymentSucceeded.v1" => {
                let event: PaymentEvent = serde_json::from_value(envelope.payload.clone())?;
                if let PaymentEvent::Succeeded(data) = event {
                    self.on_payment_succeeded(data).await?;
                }
            }
            "Payments.PaymentFailed.v1" => {
                let event: PaymentEvent = serde_json::from_value(envelope.payload.clone())?;
                if let PaymentEvent::Failed(data) = event {
                    self.on_payment_failed(data).await?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Routes a batch of envelopes in order.
    pub async fn handle_all(&self, envelopes: &[EventEnvelope]) -> Result<(), SagaError> {
        for envelope in envelopes {
            self.handle(envelope).await?;
        }
        Ok(())
    }

    /// Loads the saga instance for an order, if one has started.
    pub async fn get_saga(
        &self,
        order_id: AggregateId,
    ) -> Result<Option<SagaInstance>, SagaError> {
        let saga = self.load(saga_id_for(order_id)).await?;
        if saga.id().is_some() {
            Ok(Some(saga))
        } else {
            Ok(None)
        }
    }

    // Event handlers

    /// Step 1: an order was confirmed; open a saga instance for it.
    async fn on_order_confirmed(&self, data: OrderConfirmedData) -> Result<(), SagaError> {
        let saga_id = saga_id_for(data.order_id);
        let saga = self.load(saga_id).await?;

        if saga.status() != SagaStatus::New {
            return self.ignore(&saga, "OrderConfirmed");
        }

        self.append(
            saga_id,
            data.order_id,
            &saga,
            vec![SagaEvent::started(saga_id, data.order_id)],
        )
        .await?;

        metrics::counter!("saga_started_total").increment(1);
        tracing::info!(%saga_id, order_id = %data.order_id, "checkout saga started");
        Ok(())
    }

    /// Step 2: stock was reserved; move the order into payment.
    async fn on_stock_reserved(
        &self,
        item_id: AggregateId,
        data: StockReservedData,
    ) -> Result<(), SagaError> {
        let saga_id = saga_id_for(data.order_id);
        let saga = self.load(saga_id).await?;

        if !saga.status().awaits_reservation() {
            return self.ignore(&saga, "StockReserved");
        }

        self.append(
            saga_id,
            data.order_id,
            &saga,
            vec![SagaEvent::reservation_secured(data.reservation_id, item_id)],
        )
        .await?;

        let result = self
            .orders
            .record_payment_pending(RecordPaymentPending::new(data.order_id, None))
            .await;
        self.tolerate_rejection(result, data.order_id, "RecordPaymentPending")?;

        tracing::info!(
            %saga_id,
            order_id = %data.order_id,
            reservation_id = %data.reservation_id,
            "reservation secured, awaiting payment"
        );
        Ok(())
    }

    /// Step 3a: payment was captured; the checkout is complete.
    async fn on_payment_succeeded(&self, data: PaymentSucceededData) -> Result<(), SagaError> {
        let saga_id = saga_id_for(data.order_id);
        let saga = self.load(saga_id).await?;

        if !saga.status().awaits_payment_outcome() {
            return self.ignore(&saga, "PaymentSucceeded");
        }

        self.append(
            saga_id,
            data.order_id,
            &saga,
            vec![SagaEvent::payment_captured(data.payment_id, data.amount)],
        )
        .await?;

        let result = self
            .orders
            .record_payment_success(RecordPaymentSuccess::new(
                data.order_id,
                Some(data.payment_id),
            ))
            .await;
        self.tolerate_rejection(result, data.order_id, "RecordPaymentSuccess")?;

        if let Some(started_at) = saga.started_at() {
            let duration = (chrono::Utc::now() - started_at)
                .to_std()
                .unwrap_or_default()
                .as_secs_f64();
            metrics::histogram!("saga_duration_seconds").record(duration);
        }
        metrics::counter!("saga_completed_total").increment(1);
        tracing::info!(%saga_id, order_id = %data.order_id, "checkout saga completed");
        Ok(())
    }

    /// Step 3b: a payment attempt failed; wait for a retry or give up.
    async fn on_payment_failed(&self, data: PaymentFailedData) -> Result<(), SagaError> {
        let saga_id = saga_id_for(data.order_id);
        let saga = self.load(saga_id).await?;

        // The attempt number dedupes redelivery: a failure the saga has
        // already counted never counts twice.
        if !saga.status().awaits_payment_outcome() || data.attempt_number <= saga.retry_count() {
            return self.ignore(&saga, "PaymentFailed");
        }

        let retry_count = data.attempt_number;
        let will_retry = data.can_retry && retry_count < MAX_RETRIES;

        let mut events = vec![SagaEvent::payment_attempt_failed(
            data.payment_id,
            data.reason.clone(),
            retry_count,
            will_retry,
        )];
        if !will_retry {
            events.push(SagaEvent::failed(data.reason.clone()));
        }
        self.append(saga_id, data.order_id, &saga, events).await?;

        if will_retry {
            metrics::counter!("saga_retries_total").increment(1);
            tracing::info!(
                %saga_id,
                order_id = %data.order_id,
                retry_count,
                reason = %data.reason,
                "payment attempt failed, awaiting retry"
            );
            return Ok(());
        }

        let result = self
            .orders
            .cancel_order(Cancel::new(
                data.order_id,
                format!("Payment failed: {}", data.reason),
            ))
            .await;
        self.tolerate_rejection(result, data.order_id, "CancelOrder")?;

        // Give the stock back rather than waiting for the expiry sweeper.
        // The echoed ReservationReleased hits a terminal saga and no-ops.
        if let (Some(item_id), Some(reservation_id)) = (saga.item_id(), saga.reservation_id()) {
            let result = self
                .inventory
                .release_reservation(Release::new(item_id, reservation_id, "payment failed"))
                .await;
            self.tolerate_rejection(result, data.order_id, "ReleaseReservation")?;
        }

        metrics::counter!("saga_failed_total").increment(1);
        tracing::warn!(
            %saga_id,
            order_id = %data.order_id,
            retry_count,
            reason = %data.reason,
            "checkout saga failed, order cancelled"
        );
        Ok(())
    }

    /// Step 4: the reservation was released out from under the checkout.
    async fn on_reservation_released(
        &self,
        data: ReservationReleasedData,
    ) -> Result<(), SagaError> {
        let saga_id = saga_id_for(data.order_id);
        let saga = self.load(saga_id).await?;

        if saga.id().is_none() || saga.status().is_terminal() {
            return self.ignore(&saga, "ReservationReleased");
        }

        let reason = format!("Reservation released: {}", data.reason);
        self.append(
            saga_id,
            data.order_id,
            &saga,
            vec![SagaEvent::failed(reason.clone())],
        )
        .await?;

        let result = self
            .orders
            .cancel_order(Cancel::new(data.order_id, reason))
            .await;
        self.tolerate_rejection(result, data.order_id, "CancelOrder")?;

        metrics::counter!("saga_failed_total").increment(1);
        tracing::warn!(
            %saga_id,
            order_id = %data.order_id,
            reason = %data.reason,
            "reservation released, checkout saga failed"
        );
        Ok(())
    }

    // Infrastructure

    /// Loads a saga instance by replaying its stream.
    async fn load(&self, saga_id: AggregateId) -> Result<SagaInstance, SagaError> {
        let envelopes = self.store.get_events_for_aggregate(saga_id).await?;

        let mut saga = SagaInstance::default();
        for envelope in envelopes {
            let event: SagaEvent = serde_json::from_value(envelope.payload)?;
            saga.apply(event);
            saga.set_version(envelope.version);
        }
        Ok(saga)
    }

    /// Appends saga events against the loaded version.
    ///
    /// A concurrent handler on the same instance loses the version check
    /// and surfaces a conflict; redelivery of its triggering event will
    /// then no-op against the refreshed state.
    async fn append(
        &self,
        saga_id: AggregateId,
        order_id: AggregateId,
        saga: &SagaInstance,
        events: Vec<SagaEvent>,
    ) -> Result<Version, SagaError> {
        use domain::DomainEvent;

        let current_version = saga.version();
        let mut envelopes = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in &events {
            version = version.next();
            let envelope = EventEnvelope::builder()
                .event_type(event.event_type())
                .aggregate_id(saga_id)
                .aggregate_type(SagaInstance::aggregate_type())
                .version(version)
                .payload(event)?
                .correlation_id(order_id)
                .build();
            envelopes.push(envelope);
        }

        let options = if current_version == Version::initial() {
            AppendOptions::expect_new()
        } else {
            AppendOptions::expect_version(current_version)
        };

        Ok(self.store.append(envelopes, options).await?)
    }

    /// Records a duplicate or late event as a no-op.
    fn ignore(&self, saga: &SagaInstance, event: &'static str) -> Result<(), SagaError> {
        metrics::counter!("saga_events_ignored_total").increment(1);
        tracing::debug!(
            status = %saga.status(),
            event,
            "ignoring event, saga already past this step"
        );
        Ok(())
    }

    /// Swallows machine-level rejections of saga-issued commands.
    ///
    /// The target machine validates independently. If it rejects, the
    /// saga's recorded status still stands; infrastructure errors
    /// propagate.
    fn tolerate_rejection<T>(
        &self,
        result: Result<T, DomainError>,
        order_id: AggregateId,
        command: &'static str,
    ) -> Result<(), SagaError> {
        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_rejection() => {
                metrics::counter!("saga_commands_rejected_total").increment(1);
                tracing::warn!(%order_id, command, error = %e, "machine rejected saga command");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
