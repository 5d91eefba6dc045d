//! Inventory commands.

use common::{AggregateId, Sku};

use crate::command::Command;

use super::InventoryItem;

/// Command to register a SKU at a warehouse with initial stock.
#[derive(Debug, Clone)]
pub struct RegisterItem {
    /// The item ID to create.
    pub item_id: AggregateId,

    /// The SKU to track.
    pub sku: Sku,

    /// Warehouse holding the stock.
    pub warehouse: String,

    /// Starting on-hand quantity.
    pub initial_on_hand: u32,

    /// Threshold at or below which low stock is signalled.
    pub reorder_point: u32,
}

impl RegisterItem {
    /// Creates a new RegisterItem command with a generated item ID.
    pub fn new(
        sku: impl Into<Sku>,
        warehouse: impl Into<String>,
        initial_on_hand: u32,
        reorder_point: u32,
    ) -> Self {
        Self {
            item_id: AggregateId::new(),
            sku: sku.into(),
            warehouse: warehouse.into(),
            initial_on_hand,
            reorder_point,
        }
    }
}

impl Command for RegisterItem {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to reserve stock for an order.
#[derive(Debug, Clone)]
pub struct Reserve {
    /// The item to reserve from.
    pub item_id: AggregateId,

    /// The order the reservation belongs to.
    pub order_id: AggregateId,

    /// Quantity to hold.
    pub quantity: u32,
}

impl Reserve {
    /// Creates a new Reserve command.
    pub fn new(item_id: AggregateId, order_id: AggregateId, quantity: u32) -> Self {
        Self {
            item_id,
            order_id,
            quantity,
        }
    }
}

impl Command for Reserve {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to confirm an active reservation.
#[derive(Debug, Clone)]
pub struct Confirm {
    /// The item holding the reservation.
    pub item_id: AggregateId,

    /// The reservation to confirm.
    pub reservation_id: AggregateId,
}

impl Confirm {
    /// Creates a new Confirm command.
    pub fn new(item_id: AggregateId, reservation_id: AggregateId) -> Self {
        Self {
            item_id,
            reservation_id,
        }
    }
}

impl Command for Confirm {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to commit a confirmed reservation.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The item holding the reservation.
    pub item_id: AggregateId,

    /// The reservation to commit.
    pub reservation_id: AggregateId,
}

impl Commit {
    /// Creates a new Commit command.
    pub fn new(item_id: AggregateId, reservation_id: AggregateId) -> Self {
        Self {
            item_id,
            reservation_id,
        }
    }
}

impl Command for Commit {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to release a reservation back to available stock.
#[derive(Debug, Clone)]
pub struct Release {
    /// The item holding the reservation.
    pub item_id: AggregateId,

    /// The reservation to release.
    pub reservation_id: AggregateId,

    /// Why the hold is being dropped.
    pub reason: String,
}

impl Release {
    /// Creates a new Release command.
    pub fn new(
        item_id: AggregateId,
        reservation_id: AggregateId,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            item_id,
            reservation_id,
            reason: reason.into(),
        }
    }
}

impl Command for Release {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to adjust on-hand stock by a signed delta.
#[derive(Debug, Clone)]
pub struct Adjust {
    /// The item to adjust.
    pub item_id: AggregateId,

    /// Signed quantity change.
    pub delta: i64,

    /// Why the adjustment happened.
    pub reason: String,
}

impl Adjust {
    /// Creates a new Adjust command.
    pub fn new(item_id: AggregateId, delta: i64, reason: impl Into<String>) -> Self {
        Self {
            item_id,
            delta,
            reason: reason.into(),
        }
    }
}

impl Command for Adjust {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to mark available stock as damaged.
#[derive(Debug, Clone)]
pub struct MarkDamaged {
    /// The item with damaged stock.
    pub item_id: AggregateId,

    /// Quantity to set aside.
    pub quantity: u32,

    /// What happened.
    pub reason: String,
}

impl MarkDamaged {
    /// Creates a new MarkDamaged command.
    pub fn new(item_id: AggregateId, quantity: u32, reason: impl Into<String>) -> Self {
        Self {
            item_id,
            quantity,
            reason: reason.into(),
        }
    }
}

impl Command for MarkDamaged {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

/// Command to write off damaged stock.
#[derive(Debug, Clone)]
pub struct WriteOffDamaged {
    /// The item with damaged stock.
    pub item_id: AggregateId,

    /// Quantity to write off.
    pub quantity: u32,
}

impl WriteOffDamaged {
    /// Creates a new WriteOffDamaged command.
    pub fn new(item_id: AggregateId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

impl Command for WriteOffDamaged {
    type Aggregate = InventoryItem;

    fn aggregate_id(&self) -> AggregateId {
        self.item_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_item_command() {
        let cmd = RegisterItem::new("SKU-001", "WH-EAST", 100, 10);
        assert_eq!(cmd.aggregate_id(), cmd.item_id);
        assert_eq!(cmd.sku.as_str(), "SKU-001");
        assert_eq!(cmd.initial_on_hand, 100);
    }

    #[test]
    fn test_reserve_command() {
        let item_id = AggregateId::new();
        let order_id = AggregateId::new();

        let cmd = Reserve::new(item_id, order_id, 20);
        assert_eq!(cmd.aggregate_id(), item_id);
        assert_eq!(cmd.order_id, order_id);
        assert_eq!(cmd.quantity, 20);
    }

    #[test]
    fn test_release_command() {
        let item_id = AggregateId::new();
        let reservation_id = AggregateId::new();

        let cmd = Release::new(item_id, reservation_id, "order cancelled");
        assert_eq!(cmd.aggregate_id(), item_id);
        assert_eq!(cmd.reason, "order cancelled");
    }

    #[test]
    fn test_adjust_command_signed_delta() {
        let item_id = AggregateId::new();

        let cmd = Adjust::new(item_id, -15, "shrinkage");
        assert_eq!(cmd.delta, -15);
    }
}
