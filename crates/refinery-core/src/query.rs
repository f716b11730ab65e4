//! Read-only query API for inspecting converter state.
//!
//! Snapshot types are owned copies, with no references into the converter,
//! suitable for handing to rendering or UI code.

use crate::converter::ConverterState;
use crate::fixed::Fixed64;
use crate::id::{ItemTypeId, Quantity};
use crate::recipe::Recipe;

/// An aggregated, read-only view of a single converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSnapshot {
    /// Disabled, Idle, or Converting.
    pub state: ConverterState,
    pub recipe: Recipe,
    /// Units held by the batch in flight.
    pub in_progress_count: Quantity,
    /// Input store contents in type order.
    pub source_contents: Vec<(ItemTypeId, Quantity)>,
    /// Output store contents in type order.
    pub target_contents: Vec<(ItemTypeId, Quantity)>,
    pub max_size: Quantity,
    pub timer_elapsed: Fixed64,
    /// Cycle progress as a 0..1 fraction. 0 unless converting.
    pub progress: Fixed64,
}

impl ConverterSnapshot {
    /// Total units across the input store.
    pub fn source_total(&self) -> Quantity {
        self.source_contents.iter().map(|(_, q)| q).sum()
    }

    /// Total units across the output store.
    pub fn target_total(&self) -> Quantity {
        self.target_contents.iter().map(|(_, q)| q).sum()
    }
}
