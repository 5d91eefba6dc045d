//! Event log seam for the checkout system.
//!
//! The durable log substrate is assumed to exist externally and to provide
//! at-least-once delivery with per-stream ordering. This crate defines the
//! seam the machines write through: envelopes, versions, the `EventStore`
//! trait with optimistic concurrency, and an in-memory implementation used
//! by command handlers in tests.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use store::{AppendOptions, EventStore};
