//! Checkout saga for the order-to-cash flow.
//!
//! This crate provides the process manager that coordinates a checkout
//! across the order, inventory, and payment machines:
//! 1. `Order.Confirmed` opens a saga instance awaiting a reservation
//! 2. `Inventory.StockReserved` moves the order into payment
//! 3. `Payments.PaymentSucceeded` completes the checkout;
//!    `Payments.PaymentFailed` waits for a retry or cancels the order
//! 4. `Inventory.ReservationReleased` cancels the order at any
//!    non-terminal point
//!
//! The saga is itself event-sourced and keyed deterministically by order
//! id. All handlers are idempotent under at-least-once delivery.

pub mod aggregate;
pub mod error;
pub mod events;
pub mod process_manager;
pub mod state;

pub use aggregate::SagaInstance;
pub use error::SagaError;
pub use events::SagaEvent;
pub use process_manager::{CheckoutSaga, MAX_RETRIES, saga_id_for};
pub use state::SagaStatus;
