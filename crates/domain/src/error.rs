//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::order::OrderError;
use crate::payment::PaymentError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The order machine rejected a command.
    #[error("Order error: {0}")]
    Order(OrderError),

    /// The inventory ledger rejected a command.
    #[error("Inventory error: {0}")]
    Inventory(InventoryError),

    /// The payment machine rejected a command.
    #[error("Payment error: {0}")]
    Payment(PaymentError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if this error is a machine-level validation rejection
    /// rather than an infrastructure failure.
    ///
    /// The saga logs rejections of its own commands without treating them as
    /// failures, because the target machine's validation is authoritative.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::Order(_) | DomainError::Inventory(_) | DomainError::Payment(_)
        )
    }
}
