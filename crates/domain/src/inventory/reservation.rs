//! Reservation records owned by an inventory item.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

/// Lifecycle of a single reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Holding stock; can be confirmed or released.
    Active,

    /// Eligible for commit; can still be released.
    Confirmed,

    /// Quantity returned to available (terminal).
    Released,

    /// Stock left on-hand for good (terminal).
    Committed,
}

impl ReservationStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Released | ReservationStatus::Committed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "Active",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Released => "Released",
            ReservationStatus::Committed => "Committed",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hold on stock for one order.
///
/// The expiry timestamp is carried as data; an external sweeper is
/// expected to release reservations past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: AggregateId,

    /// The order this reservation belongs to.
    pub order_id: AggregateId,

    /// Quantity held.
    pub quantity: u32,

    /// Current status.
    pub status: ReservationStatus,

    /// When the hold lapses if neither committed nor released.
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a new active reservation.
    pub fn new(
        id: AggregateId,
        order_id: AggregateId,
        quantity: u32,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id,
            quantity,
            status: ReservationStatus::Active,
            expires_at,
        }
    }

    /// Returns true if this reservation still holds stock.
    pub fn holds_stock(&self) -> bool {
        !self.status.is_terminal()
    }
}
