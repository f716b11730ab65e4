//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Besides item
//! and recipe shorthands this module exposes [`ConverterInternals`], the
//! narrow surface through which tests drive a converter's internal
//! transitions directly.

use crate::converter::Converter;
use crate::fixed::{f64_to_fixed64, Fixed64};
use crate::id::{ItemTypeId, Quantity};
use crate::recipe::Recipe;
use crate::storage::Storage;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

// ===========================================================================
// Item constructors
// ===========================================================================

pub fn wood() -> ItemTypeId {
    ItemTypeId(0)
}
pub fn plank() -> ItemTypeId {
    ItemTypeId(1)
}
pub fn iron_ore() -> ItemTypeId {
    ItemTypeId(2)
}
pub fn iron_ingot() -> ItemTypeId {
    ItemTypeId(3)
}

// ===========================================================================
// Recipe & converter builders
// ===========================================================================

/// Build a recipe from `(item, quantity)` pairs and a cycle time in seconds.
pub fn make_recipe(
    source: (ItemTypeId, Quantity),
    target: (ItemTypeId, Quantity),
    cycle_time: f64,
) -> Recipe {
    Recipe::new(source.0, source.1, target.0, target.1, fixed(cycle_time))
        .expect("test recipe must be valid")
}

/// 5 wood -> 1 plank, one second per batch.
pub fn wood_plank_recipe() -> Recipe {
    make_recipe((wood(), 5), (plank(), 1), 1.0)
}

pub fn wood_plank_converter(capacity: Quantity) -> Converter {
    Converter::new(capacity, wood_plank_recipe()).expect("test converter must be valid")
}

/// Storage pre-filled with the given contents.
pub fn filled_storage(capacity: Quantity, contents: &[(ItemTypeId, Quantity)]) -> Storage {
    let mut storage = Storage::new(capacity).expect("test storage must be valid");
    for &(item, quantity) in contents {
        let overflow = storage.add(item, quantity).expect("non-negative quantity");
        assert_eq!(overflow, 0, "test storage overfilled");
    }
    storage
}

// ===========================================================================
// Internal transitions
// ===========================================================================

/// Internal converter transitions, for tests that need to drive them
/// without going through the timer or the public commands.
pub trait ConverterInternals {
    /// Complete the batch in flight. Returns false if completion is not
    /// currently allowed.
    fn convert(&mut self) -> bool;

    /// Cancel the batch in flight, refunding (and possibly burning) it.
    fn stop(&mut self);

    /// Start a batch if every start condition holds.
    fn check_start_converting(&mut self);

    /// Whether a full batch is in flight and its output fits.
    fn can_convert(&self) -> bool;

    /// Whether a new batch could start right now.
    fn can_convert_next(&self) -> bool;
}

impl ConverterInternals for Converter {
    fn convert(&mut self) -> bool {
        self.complete_batch()
    }

    fn stop(&mut self) {
        self.cancel_batch();
    }

    fn check_start_converting(&mut self) {
        self.try_start_batch();
    }

    fn can_convert(&self) -> bool {
        self.batch_can_complete()
    }

    fn can_convert_next(&self) -> bool {
        self.batch_can_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ConverterState;

    #[test]
    fn convert_requires_batch_in_flight() {
        let mut converter = wood_plank_converter(10);
        converter.set_enabled(true);
        assert!(!converter.can_convert());
        assert!(!converter.convert());
        assert_eq!(converter.target_count(), 0);
    }

    #[test]
    fn convert_with_injected_batch() {
        let mut converter = Converter::from_parts(
            wood_plank_recipe(),
            filled_storage(10, &[]),
            filled_storage(10, &[]),
            5,
        )
        .unwrap();
        converter.set_enabled(true);

        assert!(converter.can_convert());
        assert!(converter.convert());
        assert_eq!(converter.target_count(), 1);
        assert_eq!(converter.state(), ConverterState::Idle);
    }

    #[test]
    fn check_start_respects_disabled() {
        let mut converter = Converter::from_parts(
            wood_plank_recipe(),
            filled_storage(10, &[(wood(), 5)]),
            filled_storage(10, &[]),
            0,
        )
        .unwrap();

        assert!(!converter.can_convert_next());
        converter.check_start_converting();
        assert_eq!(converter.in_progress_count(), 0);
    }

    #[test]
    fn stop_refunds_injected_batch_into_full_store() {
        let mut converter = Converter::from_parts(
            wood_plank_recipe(),
            filled_storage(5, &[(wood(), 5)]),
            filled_storage(5, &[]),
            5,
        )
        .unwrap();

        converter.stop();
        assert_eq!(converter.source_count(), 5);
        assert_eq!(converter.in_progress_count(), 0);
    }
}
