//! Inventory service providing a simplified API for stock operations.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    Adjust, Commit, Confirm, InventoryItem, MarkDamaged, RegisterItem, Release, Reserve,
    WriteOffDamaged,
};

impl From<super::InventoryError> for DomainError {
    fn from(e: super::InventoryError) -> Self {
        DomainError::Inventory(e)
    }
}

/// Service for managing inventory items.
///
/// Reservation events are correlated by the order id that caused them;
/// stock-keeping operations (register, adjust, damage) carry no
/// correlation because no order drives them.
pub struct InventoryService<S: EventStore> {
    handler: CommandHandler<S, InventoryItem>,
}

impl<S: EventStore> InventoryService<S> {
    /// Creates a new inventory service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, InventoryItem> {
        &self.handler
    }

    /// Registers a SKU at a warehouse with initial stock.
    #[tracing::instrument(skip(self))]
    pub async fn register_item(
        &self,
        cmd: RegisterItem,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let item_id = cmd.item_id;
        let sku = cmd.sku.clone();
        let warehouse = cmd.warehouse.clone();
        let initial_on_hand = cmd.initial_on_hand;
        let reorder_point = cmd.reorder_point;

        self.handler
            .execute(item_id, None, |item| {
                item.register(item_id, sku, warehouse, initial_on_hand, reorder_point)
            })
            .await
    }

    /// Reserves stock for an order.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(
        &self,
        cmd: Reserve,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let order_id = cmd.order_id;
        let quantity = cmd.quantity;

        let result = self
            .handler
            .execute(cmd.item_id, Some(order_id), |item| {
                item.reserve(order_id, quantity)
            })
            .await?;

        metrics::counter!("inventory_reservations_total").increment(1);
        Ok(result)
    }

    /// Confirms an active reservation.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_reservation(
        &self,
        cmd: Confirm,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let reservation_id = cmd.reservation_id;
        let correlation_id = self
            .order_id_for_reservation(cmd.item_id, reservation_id)
            .await?;

        self.handler
            .execute(cmd.item_id, correlation_id, |item| {
                item.confirm_reservation(reservation_id)
            })
            .await
    }

    /// Commits a confirmed reservation.
    #[tracing::instrument(skip(self))]
    pub async fn commit_reservation(
        &self,
        cmd: Commit,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let reservation_id = cmd.reservation_id;
        let correlation_id = self
            .order_id_for_reservation(cmd.item_id, reservation_id)
            .await?;

        self.handler
            .execute(cmd.item_id, correlation_id, |item| {
                item.commit_reservation(reservation_id)
            })
            .await
    }

    /// Releases a reservation back to available stock.
    #[tracing::instrument(skip(self))]
    pub async fn release_reservation(
        &self,
        cmd: Release,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let reservation_id = cmd.reservation_id;
        let reason = cmd.reason.clone();
        let correlation_id = self
            .order_id_for_reservation(cmd.item_id, reservation_id)
            .await?;

        let result = self
            .handler
            .execute(cmd.item_id, correlation_id, |item| {
                item.release_reservation(reservation_id, reason)
            })
            .await?;

        metrics::counter!("inventory_releases_total").increment(1);
        Ok(result)
    }

    /// Adjusts on-hand stock by a signed delta.
    #[tracing::instrument(skip(self))]
    pub async fn adjust(&self, cmd: Adjust) -> Result<CommandResult<InventoryItem>, DomainError> {
        let delta = cmd.delta;
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.item_id, None, |item| item.adjust(delta, reason))
            .await
    }

    /// Marks available stock as damaged.
    #[tracing::instrument(skip(self))]
    pub async fn mark_damaged(
        &self,
        cmd: MarkDamaged,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let quantity = cmd.quantity;
        let reason = cmd.reason.clone();

        self.handler
            .execute(cmd.item_id, None, |item| item.mark_damaged(quantity, reason))
            .await
    }

    /// Writes off damaged stock.
    #[tracing::instrument(skip(self))]
    pub async fn write_off_damaged(
        &self,
        cmd: WriteOffDamaged,
    ) -> Result<CommandResult<InventoryItem>, DomainError> {
        let quantity = cmd.quantity;

        self.handler
            .execute(cmd.item_id, None, |item| item.write_off_damaged(quantity))
            .await
    }

    /// Loads an inventory item by ID.
    ///
    /// Returns None if the item doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_item(
        &self,
        item_id: AggregateId,
    ) -> Result<Option<InventoryItem>, DomainError> {
        self.handler.load_existing(item_id).await
    }

    /// Looks up the order id behind a reservation so follow-up events
    /// stay correlated with the originating order.
    async fn order_id_for_reservation(
        &self,
        item_id: AggregateId,
        reservation_id: AggregateId,
    ) -> Result<Option<AggregateId>, DomainError> {
        let item = self.handler.load(item_id).await?;
        Ok(item
            .get_reservation(&reservation_id)
            .map(|reservation| reservation.order_id))
    }
}
