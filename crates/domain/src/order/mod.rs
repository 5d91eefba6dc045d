//! Order aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use commands::*;
pub use events::{
    CompletedData, CouponAppliedData, DeliveredData, ItemAddedData, ItemQuantityUpdatedData,
    ItemRemovedData, OrderCancelledData, OrderConfirmedData, OrderCreatedData, OrderEvent,
    OrderPaymentFailedData, PaidData, PaymentPendingData, ProcessingData, RefundedData,
    ReturnApprovedData, ReturnRequestedData, ReturnedData, ShippedData,
};
pub use service::OrderService;
pub use state::OrderStatus;
pub use value_objects::{CustomerId, OrderItem, Pricing, TAX_RATE_BPS};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: OrderStatus,
        action: &'static str,
    },

    /// Item not found in order.
    #[error("Item not found: {sku}")]
    ItemNotFound { sku: String },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// Order is already created.
    #[error("Order already created")]
    AlreadyCreated,

    /// Coupon discount would exceed the order subtotal.
    #[error("Coupon discount {discount} exceeds subtotal {subtotal}")]
    CouponExceedsSubtotal { discount: i64, subtotal: i64 },
}
