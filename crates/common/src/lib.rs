//! Shared types used across the checkout system crates.

pub mod types;

pub use types::{AggregateId, Currency, Money, Sku};
