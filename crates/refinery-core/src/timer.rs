//! Repeating interval timer with catch-up.
//!
//! Hosts may deliver large or irregular deltas, so one [`IntervalTimer::advance`]
//! call reports every full interval it consumed, not just the first.

use crate::error::{ensure_positive_duration, InvalidArgument};
use crate::fixed::Fixed64;

/// Accumulates elapsed time and completes once per full interval.
///
/// `elapsed < interval` holds after every successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntervalTimer {
    interval: Fixed64,
    elapsed: Fixed64,
}

impl IntervalTimer {
    pub fn new(interval: Fixed64) -> Result<Self, InvalidArgument> {
        ensure_positive_duration("interval", interval)?;
        Ok(Self {
            interval,
            elapsed: Fixed64::ZERO,
        })
    }

    /// Add `delta` and return how many completions fired.
    ///
    /// A delta of three intervals fires three completions in one call.
    /// Zero or negative deltas are rejected without touching the accumulator.
    pub fn advance(&mut self, delta: Fixed64) -> Result<u64, InvalidArgument> {
        ensure_positive_duration("delta time", delta)?;
        self.elapsed = self.elapsed.saturating_add(delta);

        // Both operands are positive, so whole intervals are an exact
        // integer quotient of the raw bits.
        let elapsed = self.elapsed.to_bits();
        let interval = self.interval.to_bits();
        self.elapsed = Fixed64::from_bits(elapsed % interval);
        Ok((elapsed / interval) as u64)
    }

    /// Like [`advance`](Self::advance) but invokes `on_complete` once per
    /// completion, synchronously, before returning.
    pub fn advance_with(
        &mut self,
        delta: Fixed64,
        mut on_complete: impl FnMut(),
    ) -> Result<(), InvalidArgument> {
        for _ in 0..self.advance(delta)? {
            on_complete();
        }
        Ok(())
    }

    /// Drop accumulated time without firing.
    pub fn reset(&mut self) {
        self.elapsed = Fixed64::ZERO;
    }

    pub fn interval(&self) -> Fixed64 {
        self.interval
    }

    pub fn elapsed(&self) -> Fixed64 {
        self.elapsed
    }
}
