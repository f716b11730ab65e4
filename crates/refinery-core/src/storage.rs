//! Capacity-bounded multi-type resource store.
//!
//! The capacity is an aggregate ceiling shared by every resource type held
//! in one [`Storage`], not a per-type limit.

use std::collections::BTreeMap;

use crate::error::{ensure_non_negative, InvalidArgument};
use crate::id::{ItemTypeId, Quantity};

/// Non-negative resource counts keyed by type, with
/// `total() <= capacity()` at all times.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Storage {
    /// Absent key means zero. Zero counts are never stored.
    counts: BTreeMap<ItemTypeId, Quantity>,
    capacity: Quantity,
}

impl Storage {
    /// Create an empty storage with a fixed capacity.
    pub fn new(capacity: Quantity) -> Result<Self, InvalidArgument> {
        if capacity < 0 {
            return Err(InvalidArgument::NegativeCapacity { capacity });
        }
        Ok(Self {
            counts: BTreeMap::new(),
            capacity,
        })
    }

    /// Add items, absorbing as many as fit. Returns the amount that didn't fit.
    #[must_use = "overflow count indicates items that did not fit"]
    pub fn add(&mut self, item_type: ItemTypeId, quantity: Quantity) -> Result<Quantity, InvalidArgument> {
        ensure_non_negative(quantity)?;

        let space = (self.capacity - self.total()).max(0);
        let to_add = quantity.min(space);
        let overflow = quantity - to_add;

        if to_add > 0 {
            *self.counts.entry(item_type).or_insert(0) += to_add;
        }

        tracing::trace!(item = item_type.0, absorbed = to_add, overflow, "storage add");
        Ok(overflow)
    }

    /// Remove exactly `quantity` items of one type. Returns `false` without
    /// touching anything when fewer than `quantity` are stored.
    #[must_use = "removal fails when not enough items are stored"]
    pub fn remove(&mut self, item_type: ItemTypeId, quantity: Quantity) -> Result<bool, InvalidArgument> {
        ensure_non_negative(quantity)?;

        let held = self.quantity(item_type);
        if quantity > held {
            return Ok(false);
        }

        if quantity == held {
            self.counts.remove(&item_type);
        } else if let Some(count) = self.counts.get_mut(&item_type) {
            *count -= quantity;
        }

        tracing::trace!(item = item_type.0, removed = quantity, "storage remove");
        Ok(true)
    }

    /// Get quantity of a specific item type.
    pub fn quantity(&self, item_type: ItemTypeId) -> Quantity {
        self.counts.get(&item_type).copied().unwrap_or(0)
    }

    /// Total items across all types.
    pub fn total(&self) -> Quantity {
        self.counts.values().sum()
    }

    pub fn capacity(&self) -> Quantity {
        self.capacity
    }

    /// Remaining room before the aggregate ceiling is reached.
    pub fn free_space(&self) -> Quantity {
        self.capacity - self.total()
    }

    /// Check if storage has room for a specific quantity.
    pub fn has_space_for(&self, quantity: Quantity) -> bool {
        quantity <= self.free_space()
    }

    /// Iterate stored `(type, count)` pairs in type order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemTypeId, Quantity)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }
}
