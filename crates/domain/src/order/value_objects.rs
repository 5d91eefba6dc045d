//! Value objects for the order domain.

use common::{Currency, Money, Sku};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales tax rate applied at pricing time, in basis points.
pub const TAX_RATE_BPS: i64 = 825;

/// Unique identifier for a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new random customer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a customer ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The stock keeping unit.
    pub sku: Sku,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit at the time of adding.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(sku: impl Into<Sku>, quantity: u32, unit_price: Money) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Pricing breakdown for an order.
///
/// Always a deterministic function of the items and adjustments; every
/// mutating operation on the order recomputes it so `grand_total` can
/// never drift from the lines it is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Sum of all line totals.
    pub subtotal: Money,

    /// Flat shipping charge.
    pub shipping_cost: Money,

    /// Tax computed on the subtotal.
    pub tax_total: Money,

    /// Coupon discount.
    pub discount_total: Money,

    /// subtotal + shipping + tax - discount.
    pub grand_total: Money,

    /// Currency of every component.
    pub currency: Currency,
}

impl Pricing {
    /// Computes the pricing breakdown from order lines and adjustments.
    pub fn compute<'a>(
        items: impl IntoIterator<Item = &'a OrderItem>,
        shipping_cost: Money,
        discount_total: Money,
        currency: Currency,
    ) -> Self {
        let subtotal = items
            .into_iter()
            .fold(Money::zero(currency), |acc, item| acc + item.line_total());
        let tax_total = subtotal.apply_bps(TAX_RATE_BPS);
        let grand_total = subtotal + shipping_cost + tax_total - discount_total;

        Self {
            subtotal,
            shipping_cost,
            tax_total,
            discount_total,
            grand_total,
            currency,
        }
    }

    /// Returns an empty breakdown in the given currency.
    pub fn empty(currency: Currency) -> Self {
        Self::compute([], Money::zero(currency), Money::zero(currency), currency)
    }
}
