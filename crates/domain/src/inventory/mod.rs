//! Inventory item aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod reservation;
mod service;

pub use aggregate::{InventoryItem, RESERVATION_TTL_MINUTES};
pub use commands::*;
pub use events::{
    DamagedWrittenOffData, InventoryEvent, ItemRegisteredData, LowStockDetectedData,
    ReservationConfirmedData, ReservationReleasedData, StockAdjustedData, StockCommittedData,
    StockDamagedData, StockReservedData,
};
pub use reservation::{Reservation, ReservationStatus};
pub use service::InventoryService;

use thiserror::Error;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Item is already registered.
    #[error("Item already registered")]
    AlreadyRegistered,

    /// Item has not been registered yet.
    #[error("Item not registered")]
    NotRegistered,

    /// Not enough available stock to reserve.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// Reservation not found on this item.
    #[error("Reservation not found: {reservation_id}")]
    ReservationNotFound { reservation_id: String },

    /// Reservation is not in the Active status.
    #[error("Reservation {reservation_id} is {status}, expected Active")]
    ReservationNotActive {
        reservation_id: String,
        status: ReservationStatus,
    },

    /// Reservation must be Confirmed before it can be committed.
    #[error("Reservation {reservation_id} is {status}, expected Confirmed")]
    ReservationNotConfirmed {
        reservation_id: String,
        status: ReservationStatus,
    },

    /// Reservation is already in a terminal status.
    #[error("Reservation {reservation_id} is already {status}")]
    ReservationTerminal {
        reservation_id: String,
        status: ReservationStatus,
    },

    /// Adjustment would make on-hand stock negative.
    #[error("Adjustment of {delta} would make on-hand stock negative (on hand: {on_hand})")]
    NegativeStock { delta: i64, on_hand: u32 },

    /// Not enough unreserved stock to mark as damaged.
    #[error("Cannot damage {requested} units, only {available} available")]
    InsufficientAvailable { requested: u32, available: u32 },

    /// Not enough damaged stock to write off.
    #[error("Cannot write off {requested} units, only {damaged} damaged")]
    InsufficientDamaged { requested: u32, damaged: u32 },

    /// Quantity must be greater than zero.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },
}
