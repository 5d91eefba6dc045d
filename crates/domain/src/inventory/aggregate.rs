//! Inventory item aggregate implementation.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use common::{AggregateId, Sku};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    InventoryError, InventoryEvent, Reservation, ReservationStatus,
    events::{
        DamagedWrittenOffData, ItemRegisteredData, ReservationConfirmedData,
        ReservationReleasedData, StockAdjustedData, StockCommittedData, StockDamagedData,
        StockReservedData,
    },
};

/// How long a reservation holds stock before an external sweeper may
/// release it.
pub const RESERVATION_TTL_MINUTES: i64 = 30;

/// Inventory item aggregate root, one per SKU and warehouse.
///
/// Owns the stock counters and every reservation taken against them.
/// The counters obey `on_hand >= reserved` at all times, with
/// `available` derived as `on_hand - reserved`. Commands that would
/// break that are rejected before any event is emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique item identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The SKU this item tracks.
    sku: Option<Sku>,

    /// Warehouse holding the stock.
    warehouse: String,

    /// Physical units on the shelf.
    on_hand: u32,

    /// Units held by non-terminal reservations.
    reserved: u32,

    /// Units set aside as damaged.
    damaged: u32,

    /// Threshold at or below which low stock is signalled.
    reorder_point: u32,

    /// Reservations taken against this item, keyed by reservation id.
    reservations: HashMap<AggregateId, Reservation>,
}

impl Aggregate for InventoryItem {
    type Event = InventoryEvent;
    type Error = InventoryError;

    fn aggregate_type() -> &'static str {
        "InventoryItem"
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
            InventoryEvent::ItemRegistered(data) => self.apply_registered(data),
            InventoryEvent::StockReserved(data) => self.apply_reserved(data),
            InventoryEvent::ReservationConfirmed(data) => self.apply_confirmed(data),
            InventoryEvent::StockCommitted(data) => self.apply_committed(data),
            InventoryEvent::ReservationReleased(data) => self.apply_released(data),
            InventoryEvent::StockAdjusted(data) => self.apply_adjusted(data),
            InventoryEvent::StockDamaged(data) => self.apply_damaged(data),
            InventoryEvent::DamagedWrittenOff(data) => self.apply_written_off(data),
            InventoryEvent::LowStockDetected(_) => {
                // Informational; no state change.
            }
        }
    }
}

// Query methods
impl InventoryItem {
    /// Returns the SKU, if registered.
    pub fn sku(&self) -> Option<&Sku> {
        self.sku.as_ref()
    }

    /// Returns the warehouse name.
    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    /// Returns units physically on the shelf.
    pub fn on_hand(&self) -> u32 {
        self.on_hand
    }

    /// Returns units held by non-terminal reservations.
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    /// Returns units free to reserve.
    pub fn available(&self) -> u32 {
        self.on_hand - self.reserved
    }

    /// Returns units set aside as damaged.
    pub fn damaged(&self) -> u32 {
        self.damaged
    }

    /// Returns the reorder threshold.
    pub fn reorder_point(&self) -> u32 {
        self.reorder_point
    }

    /// Returns a reservation by id.
    pub fn get_reservation(&self, reservation_id: &AggregateId) -> Option<&Reservation> {
        self.reservations.get(reservation_id)
    }

    /// Returns all reservations that still hold stock.
    pub fn active_reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values().filter(|r| r.holds_stock())
    }

    /// Returns true if available stock is at or below the reorder point.
    pub fn is_low_stock(&self) -> bool {
        self.available() <= self.reorder_point
    }
}

// Command methods (return events)
impl InventoryItem {
    /// Registers this item with initial stock.
    pub fn register(
        &self,
        item_id: AggregateId,
        sku: Sku,
        warehouse: impl Into<String>,
        initial_on_hand: u32,
        reorder_point: u32,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        if self.id.is_some() {
            return Err(InventoryError::AlreadyRegistered);
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::item_registered(
            item_id,
            sku,
            warehouse,
            initial_on_hand,
            reorder_point,
        )]))
    }

    /// Reserves stock for an order.
    ///
    /// The reservation starts Active and carries an expiry timestamp an
    /// external sweeper can act on.
    pub fn reserve(
        &self,
        order_id: AggregateId,
        quantity: u32,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        let sku = self.require_registered()?;

        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity { quantity });
        }

        if quantity > self.available() {
            return Err(InventoryError::InsufficientStock {
                requested: quantity,
                available: self.available(),
            });
        }

        let reservation_id = AggregateId::new();
        let expires_at = Utc::now() + Duration::minutes(RESERVATION_TTL_MINUTES);

        Ok(self.with_low_stock_check(vec![InventoryEvent::stock_reserved(
            reservation_id,
            order_id,
            sku.clone(),
            quantity,
            expires_at,
        )]))
    }

    /// Confirms an active reservation, making it eligible for commit.
    ///
    /// No level change; stock stays reserved.
    pub fn confirm_reservation(
        &self,
        reservation_id: AggregateId,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;
        let reservation = self.require_reservation(reservation_id)?;

        if reservation.status != ReservationStatus::Active {
            return Err(InventoryError::ReservationNotActive {
                reservation_id: reservation_id.to_string(),
                status: reservation.status,
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::reservation_confirmed(
            reservation_id,
            reservation.order_id,
        )]))
    }

    /// Commits a confirmed reservation; the stock leaves on-hand for good.
    pub fn commit_reservation(
        &self,
        reservation_id: AggregateId,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;
        let reservation = self.require_reservation(reservation_id)?;

        if reservation.status != ReservationStatus::Confirmed {
            return Err(InventoryError::ReservationNotConfirmed {
                reservation_id: reservation_id.to_string(),
                status: reservation.status,
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::stock_committed(
            reservation_id,
            reservation.order_id,
            reservation.quantity,
        )]))
    }

    /// Releases a reservation, returning its quantity to available.
    ///
    /// Legal from Active or Confirmed.
    pub fn release_reservation(
        &self,
        reservation_id: AggregateId,
        reason: impl Into<String>,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;
        let reservation = self.require_reservation(reservation_id)?;

        if reservation.status.is_terminal() {
            return Err(InventoryError::ReservationTerminal {
                reservation_id: reservation_id.to_string(),
                status: reservation.status,
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::reservation_released(
            reservation_id,
            reservation.order_id,
            reservation.quantity,
            reason,
        )]))
    }

    /// Adjusts on-hand stock by a signed delta, leaving reserved untouched.
    pub fn adjust(
        &self,
        delta: i64,
        reason: impl Into<String>,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;

        let new_on_hand = self.on_hand as i64 + delta;
        if new_on_hand < self.reserved as i64 {
            return Err(InventoryError::NegativeStock {
                delta,
                on_hand: self.on_hand,
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::stock_adjusted(delta, reason)]))
    }

    /// Marks available stock as damaged.
    pub fn mark_damaged(
        &self,
        quantity: u32,
        reason: impl Into<String>,
    ) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;

        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity { quantity });
        }

        if quantity > self.available() {
            return Err(InventoryError::InsufficientAvailable {
                requested: quantity,
                available: self.available(),
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::stock_damaged(quantity, reason)]))
    }

    /// Writes off damaged stock; on-hand is untouched.
    pub fn write_off_damaged(&self, quantity: u32) -> Result<Vec<InventoryEvent>, InventoryError> {
        self.require_registered()?;

        if quantity == 0 {
            return Err(InventoryError::InvalidQuantity { quantity });
        }

        if quantity > self.damaged {
            return Err(InventoryError::InsufficientDamaged {
                requested: quantity,
                damaged: self.damaged,
            });
        }

        Ok(self.with_low_stock_check(vec![InventoryEvent::damaged_written_off(quantity)]))
    }
}

// Validation and event helpers
impl InventoryItem {
    fn require_registered(&self) -> Result<&Sku, InventoryError> {
        self.sku.as_ref().ok_or(InventoryError::NotRegistered)
    }

    fn require_reservation(
        &self,
        reservation_id: AggregateId,
    ) -> Result<&Reservation, InventoryError> {
        self.reservations
            .get(&reservation_id)
            .ok_or_else(|| InventoryError::ReservationNotFound {
                reservation_id: reservation_id.to_string(),
            })
    }

    /// Appends a LowStockDetected event if, after applying the given
    /// events, available stock sits at or below the reorder point.
    fn with_low_stock_check(&self, mut events: Vec<InventoryEvent>) -> Vec<InventoryEvent> {
        let mut projected = self.clone();
        for event in &events {
            projected.apply(event.clone());
        }

        if let Some(sku) = projected.sku.clone() {
            if projected.is_low_stock() {
                events.push(InventoryEvent::low_stock_detected(
                    sku,
                    projected.available(),
                    projected.reorder_point,
                ));
            }
        }

        events
    }

    fn apply_registered(&mut self, data: ItemRegisteredData) {
        self.id = Some(data.item_id);
        self.sku = Some(data.sku);
        self.warehouse = data.warehouse;
        self.on_hand = data.initial_on_hand;
        self.reorder_point = data.reorder_point;
    }

    fn apply_reserved(&mut self, data: StockReservedData) {
        self.reserved += data.quantity;
        self.reservations.insert(
            data.reservation_id,
            Reservation::new(
                data.reservation_id,
                data.order_id,
                data.quantity,
                data.expires_at,
            ),
        );
    }

    fn apply_confirmed(&mut self, data: ReservationConfirmedData) {
        if let Some(reservation) = self.reservations.get_mut(&data.reservation_id) {
            reservation.status = ReservationStatus::Confirmed;
        }
    }

    fn apply_committed(&mut self, data: StockCommittedData) {
        self.on_hand -= data.quantity;
        self.reserved -= data.quantity;
        if let Some(reservation) = self.reservations.get_mut(&data.reservation_id) {
            reservation.status = ReservationStatus::Committed;
        }
    }

    fn apply_released(&mut self, data: ReservationReleasedData) {
        self.reserved -= data.quantity;
        if let Some(reservation) = self.reservations.get_mut(&data.reservation_id) {
            reservation.status = ReservationStatus::Released;
        }
    }

    fn apply_adjusted(&mut self, data: StockAdjustedData) {
        self.on_hand = (self.on_hand as i64 + data.delta) as u32;
    }

    fn apply_damaged(&mut self, data: StockDamagedData) {
        self.on_hand -= data.quantity;
        self.damaged += data.quantity;
    }

    fn apply_written_off(&mut self, data: DamagedWrittenOffData) {
        self.damaged -= data.quantity;
    }
}
