//! Caller-error taxonomy shared by storage, timer, recipe, and converter.
//!
//! Only invalid input is an error. Running out of source material or
//! output space is reported through return values, never through `Err`.

use crate::fixed::Fixed64;
use crate::id::Quantity;

/// An argument that can never be valid for the operation it was passed to.
/// Returned before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("quantity must not be negative, got {quantity}")]
    NegativeQuantity { quantity: Quantity },

    #[error("{what} must be positive, got {quantity}")]
    NonPositiveQuantity { what: &'static str, quantity: Quantity },

    #[error("{what} must be positive, got {value}")]
    NonPositiveDuration { what: &'static str, value: Fixed64 },

    #[error("capacity must not be negative, got {capacity}")]
    NegativeCapacity { capacity: Quantity },

    #[error("in-progress count must be 0 or the batch size {batch}, got {quantity}")]
    InvalidInProgress { quantity: Quantity, batch: Quantity },
}

/// Reject negative quantities.
pub(crate) fn ensure_non_negative(quantity: Quantity) -> Result<(), InvalidArgument> {
    if quantity < 0 {
        return Err(InvalidArgument::NegativeQuantity { quantity });
    }
    Ok(())
}

/// Reject zero or negative durations.
pub(crate) fn ensure_positive_duration(
    what: &'static str,
    value: Fixed64,
) -> Result<(), InvalidArgument> {
    if value <= Fixed64::ZERO {
        return Err(InvalidArgument::NonPositiveDuration { what, value });
    }
    Ok(())
}
