//! Inventory domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Sku};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on an inventory item aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InventoryEvent {
    /// A SKU was registered at a warehouse with initial stock.
    ItemRegistered(ItemRegisteredData),

    /// Stock was reserved for an order.
    StockReserved(StockReservedData),

    /// A reservation was confirmed, making it eligible for commit.
    ReservationConfirmed(ReservationConfirmedData),

    /// A confirmed reservation was committed; stock left the building.
    StockCommitted(StockCommittedData),

    /// A reservation was released and its quantity returned to available.
    ReservationReleased(ReservationReleasedData),

    /// On-hand stock was adjusted by a signed delta.
    StockAdjusted(StockAdjustedData),

    /// Available stock was marked as damaged.
    StockDamaged(StockDamagedData),

    /// Damaged stock was written off.
    DamagedWrittenOff(DamagedWrittenOffData),

    /// Available stock fell to or below the reorder point.
    ///
    /// Informational only; never blocks the operation that caused it.
    LowStockDetected(LowStockDetectedData),
}

impl DomainEvent for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemRegistered(_) => "Inventory.ItemRegistered.v1",
            InventoryEvent::StockReserved(_) => "Inventory.StockReserved.v1",
            InventoryEvent::ReservationConfirmed(_) => "Inventory.ReservationConfirmed.v1",
            InventoryEvent::StockCommitted(_) => "Inventory.StockCommitted.v1",
            InventoryEvent::ReservationReleased(_) => "Inventory.ReservationReleased.v1",
            InventoryEvent::StockAdjusted(_) => "Inventory.StockAdjusted.v1",
            InventoryEvent::StockDamaged(_) => "Inventory.StockDamaged.v1",
            InventoryEvent::DamagedWrittenOff(_) => "Inventory.DamagedWrittenOff.v1",
            InventoryEvent::LowStockDetected(_) => "Inventory.LowStockDetected.v1",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRegisteredData {
    pub item_id: AggregateId,
    pub sku: Sku,
    pub warehouse: String,
    pub initial_on_hand: u32,
    pub reorder_point: u32,
    pub registered_at: DateTime<Utc>,
}

/// Data for the StockReserved event.
///
/// Carries the order id so the checkout saga can correlate the
/// reservation with the order that caused it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReservedData {
    pub reservation_id: AggregateId,
    pub order_id: AggregateId,
    pub sku: Sku,
    pub quantity: u32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfirmedData {
    pub reservation_id: AggregateId,
    pub order_id: AggregateId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCommittedData {
    pub reservation_id: AggregateId,
    pub order_id: AggregateId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationReleasedData {
    pub reservation_id: AggregateId,
    pub order_id: AggregateId,
    pub quantity: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustedData {
    pub delta: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDamagedData {
    pub quantity: u32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamagedWrittenOffData {
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockDetectedData {
    pub sku: Sku,
    pub available: u32,
    pub reorder_point: u32,
}

// Convenience constructors
impl InventoryEvent {
    pub fn item_registered(
        item_id: AggregateId,
        sku: Sku,
        warehouse: impl Into<String>,
        initial_on_hand: u32,
        reorder_point: u32,
    ) -> Self {
        InventoryEvent::ItemRegistered(ItemRegisteredData {
            item_id,
            sku,
            warehouse: warehouse.into(),
            initial_on_hand,
            reorder_point,
            registered_at: Utc::now(),
        })
    }

    pub fn stock_reserved(
        reservation_id: AggregateId,
        order_id: AggregateId,
        sku: Sku,
        quantity: u32,
        expires_at: DateTime<Utc>,
    ) -> Self {
        InventoryEvent::StockReserved(StockReservedData {
            reservation_id,
            order_id,
            sku,
            quantity,
            expires_at,
        })
    }

    pub fn reservation_confirmed(reservation_id: AggregateId, order_id: AggregateId) -> Self {
        InventoryEvent::ReservationConfirmed(ReservationConfirmedData {
            reservation_id,
            order_id,
        })
    }

    pub fn stock_committed(
        reservation_id: AggregateId,
        order_id: AggregateId,
        quantity: u32,
    ) -> Self {
        InventoryEvent::StockCommitted(StockCommittedData {
            reservation_id,
            order_id,
            quantity,
        })
    }

    pub fn reservation_released(
        reservation_id: AggregateId,
        order_id: AggregateId,
        quantity: u32,
        reason: impl Into<String>,
    ) -> Self {
        InventoryEvent::ReservationReleased(ReservationReleasedData {
            reservation_id,
            order_id,
            quantity,
            reason: reason.into(),
        })
    }

    pub fn stock_adjusted(delta: i64, reason: impl Into<String>) -> Self {
        InventoryEvent::StockAdjusted(StockAdjustedData {
            delta,
            reason: reason.into(),
        })
    }

    pub fn stock_damaged(quantity: u32, reason: impl Into<String>) -> Self {
        InventoryEvent::StockDamaged(StockDamagedData {
            quantity,
            reason: reason.into(),
        })
    }

    pub fn damaged_written_off(quantity: u32) -> Self {
        InventoryEvent::DamagedWrittenOff(DamagedWrittenOffData { quantity })
    }

    pub fn low_stock_detected(sku: Sku, available: u32, reorder_point: u32) -> Self {
        InventoryEvent::LowStockDetected(LowStockDetectedData {
            sku,
            available,
            reorder_point,
        })
    }
}
