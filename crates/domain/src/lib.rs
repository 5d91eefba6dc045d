//! Domain layer for the checkout coordination system.
//!
//! This crate provides the three transactional state machines the checkout
//! saga drives, each an event-sourced aggregate behind a typed command API:
//! - Order lifecycle machine (`order`)
//! - Inventory reservation ledger (`inventory`)
//! - Payment attempt machine (`payment`)
//!
//! Each machine validates a command against its current state, and on
//! success emits events that are the only channel through which other
//! components (the saga, projections) learn of the change. Rejections are
//! typed errors with no partial mutation and no event.

pub mod aggregate;
pub mod command;
pub mod error;
pub mod inventory;
pub mod order;
pub mod payment;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult};
pub use error::DomainError;
pub use inventory::{
    Adjust, Commit, Confirm as ConfirmReservation, InventoryError, InventoryEvent, InventoryItem,
    InventoryService, MarkDamaged, Release, RegisterItem, Reservation, ReservationStatus, Reserve,
    WriteOffDamaged,
};
pub use order::{
    AddItem, ApplyCoupon, ApproveReturn, Cancel, Complete, Confirm, CreateOrder, CustomerId,
    MarkProcessing, Order, OrderError, OrderEvent, OrderItem, OrderService, OrderStatus, Pricing,
    RecordDelivery, RecordPaymentFailure, RecordPaymentPending, RecordPaymentSuccess, RecordReturn,
    RecordShipment, Refund, RemoveItem, RequestReturn, UpdateItemQuantity,
};
pub use payment::{
    CompleteRefund, Initiate, Payment, PaymentAttempt, PaymentError, PaymentEvent, PaymentService,
    PaymentStatus, RecordFailure, RecordSuccess, RefundEntry, RequestRefund, Retry,
};
