use std::fmt;

use crate::error::{ensure_positive_duration, InvalidArgument};
use crate::fixed::Fixed64;
use crate::id::{ItemTypeId, Quantity};

/// One side of a recipe: which item and how many per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecipeEntry {
    pub item_type: ItemTypeId,
    pub quantity: Quantity,
}

/// Immutable conversion description: `source` is withdrawn when a batch
/// starts, `target` is deposited when it completes `cycle_time` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Recipe {
    source: RecipeEntry,
    target: RecipeEntry,
    cycle_time: Fixed64,
}

impl Recipe {
    /// Build a recipe. Both quantities and the cycle time must be positive.
    pub fn new(
        source_type: ItemTypeId,
        source_count: Quantity,
        target_type: ItemTypeId,
        target_count: Quantity,
        cycle_time: Fixed64,
    ) -> Result<Self, InvalidArgument> {
        if source_count <= 0 {
            return Err(InvalidArgument::NonPositiveQuantity {
                what: "source count",
                quantity: source_count,
            });
        }
        if target_count <= 0 {
            return Err(InvalidArgument::NonPositiveQuantity {
                what: "target count",
                quantity: target_count,
            });
        }
        ensure_positive_duration("cycle time", cycle_time)?;

        Ok(Self {
            source: RecipeEntry {
                item_type: source_type,
                quantity: source_count,
            },
            target: RecipeEntry {
                item_type: target_type,
                quantity: target_count,
            },
            cycle_time,
        })
    }

    pub fn source(&self) -> RecipeEntry {
        self.source
    }

    pub fn target(&self) -> RecipeEntry {
        self.target
    }

    pub fn source_type(&self) -> ItemTypeId {
        self.source.item_type
    }

    pub fn source_count(&self) -> Quantity {
        self.source.quantity
    }

    pub fn target_type(&self) -> ItemTypeId {
        self.target.item_type
    }

    pub fn target_count(&self) -> Quantity {
        self.target.quantity
    }

    pub fn cycle_time(&self) -> Fixed64 {
        self.cycle_time
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: {} -> #{}: {}; time: {}",
            self.source.item_type.0,
            self.source.quantity,
            self.target.item_type.0,
            self.target.quantity,
            self.cycle_time
        )
    }
}
