//! Saga error types.

use domain::DomainError;
use event_store::EventStoreError;
use thiserror::Error;

/// Errors that can occur while handling events in the checkout saga.
///
/// Machine-level rejections of saga-issued commands are not errors here:
/// the saga tolerates them and keeps its own status as the source of
/// truth. Only infrastructure failures surface through this type.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Domain error from a command issued to one of the machines.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Event store error.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
