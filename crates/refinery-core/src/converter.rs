//! The batch converter state machine.
//!
//! A [`Converter`] withdraws `recipe.source_count()` units of the source type
//! from its input [`Storage`], holds them for one cycle of its
//! [`IntervalTimer`], then deposits `recipe.target_count()` units of the
//! target type into its output [`Storage`]. It chains into the next batch
//! automatically while supply and space permit.
//!
//! # States
//!
//! The state is derived from `enabled` and the in-flight count, never stored:
//!
//! - **Disabled** -- `!enabled`.
//! - **Idle** -- enabled, no batch in flight.
//! - **Converting** -- enabled, `in_progress_count() == recipe.source_count()`.
//!
//! Commands that can unblock a batch (enabling, adding source, removing
//! target, completing a batch) attempt to start one immediately inside the
//! same call, so one external call may emit several events before returning.
//!
//! # Cancellation
//!
//! Disabling while Converting refunds the held batch to the input store.
//! Whatever no longer fits is burned.

use crate::error::{ensure_non_negative, ensure_positive_duration, InvalidArgument};
use crate::event::{Event, EventBus, EventKind, Listener};
use crate::fixed::Fixed64;
use crate::id::{ItemTypeId, Quantity, SubscriptionId};
use crate::query::ConverterSnapshot;
use crate::recipe::Recipe;
use crate::storage::Storage;
use crate::timer::IntervalTimer;

/// Derived lifecycle state of a [`Converter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ConverterState {
    #[default]
    Disabled,
    Idle,
    Converting,
}

/// Converts one resource type into another in fixed-size, fixed-duration batches.
///
/// Owns both stores and the timer exclusively; hosts observe it through
/// queries, [`snapshot`](Self::snapshot), and event subscriptions.
#[derive(Debug)]
pub struct Converter {
    recipe: Recipe,
    source: Storage,
    target: Storage,
    enabled: bool,
    /// 0 or `recipe.source_count()`. At most one batch is ever in flight.
    in_progress: Quantity,
    timer: IntervalTimer,
    events: EventBus,
}

impl Converter {
    /// Create a disabled converter whose input and output stores both hold
    /// up to `capacity` units.
    pub fn new(capacity: Quantity, recipe: Recipe) -> Result<Self, InvalidArgument> {
        Ok(Self {
            recipe,
            source: Storage::new(capacity)?,
            target: Storage::new(capacity)?,
            enabled: false,
            in_progress: 0,
            timer: IntervalTimer::new(recipe.cycle_time())?,
            events: EventBus::default(),
        })
    }

    /// Build a converter around pre-populated stores and an in-flight count.
    ///
    /// The output store's capacity becomes [`max_size`](Self::max_size).
    /// The converter starts disabled.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn from_parts(
        recipe: Recipe,
        source: Storage,
        target: Storage,
        in_progress: Quantity,
    ) -> Result<Self, InvalidArgument> {
        if in_progress != 0 && in_progress != recipe.source_count() {
            return Err(InvalidArgument::InvalidInProgress {
                quantity: in_progress,
                batch: recipe.source_count(),
            });
        }
        Ok(Self {
            recipe,
            source,
            target,
            enabled: false,
            in_progress,
            timer: IntervalTimer::new(recipe.cycle_time())?,
            events: EventBus::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Advance the cycle timer by `delta`. Only Converting converters move;
    /// each completed interval completes the batch in flight and may chain
    /// into the next one.
    pub fn advance(&mut self, delta: Fixed64) -> Result<(), InvalidArgument> {
        ensure_positive_duration("delta time", delta)?;
        if !self.is_in_progress() {
            return Ok(());
        }

        let completions = self.timer.advance(delta)?;
        for _ in 0..completions {
            // State is unchanged between fires, so once one fails the
            // rest would too.
            if !self.complete_batch() {
                break;
            }
        }
        Ok(())
    }

    /// Switch the converter on or off. Setting the current value again is a
    /// no-op and emits nothing.
    ///
    /// Enabling tries to start a batch right away. Disabling cancels the
    /// batch in flight and refunds it, burning whatever does not fit.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        tracing::debug!(enabled, recipe = %self.recipe, "converter enabled changed");
        self.events.emit(Event::EnabledChanged { enabled });

        if enabled {
            self.try_start_batch();
        } else {
            self.cancel_batch();
        }
    }

    /// Offer source material. Returns the amount that was not absorbed.
    ///
    /// Items of any type other than the recipe's source type are refused
    /// whole. If this addition lets a batch start, the batch is withdrawn
    /// first and the freed room absorbs more of the offer, so the returned
    /// overflow reflects the post-start store.
    pub fn add_source_item(
        &mut self,
        item_type: ItemTypeId,
        quantity: Quantity,
    ) -> Result<Quantity, InvalidArgument> {
        ensure_non_negative(quantity)?;
        if item_type != self.recipe.source_type() {
            return Ok(quantity);
        }

        let mut overflow = self.source.add(item_type, quantity)?;

        let was_in_progress = self.is_in_progress();
        self.try_start_batch();

        if overflow > 0 && self.is_in_progress() && !was_in_progress {
            overflow = self.source.add(item_type, overflow)?;
        }

        let added = quantity - overflow;
        if added > 0 {
            self.events.emit(Event::SourceAdded {
                item_type,
                quantity: added,
            });
        }
        Ok(overflow)
    }

    /// Take source material back out. Fails (returns false) for foreign
    /// types or when fewer than `quantity` units are stored.
    pub fn remove_source_item(
        &mut self,
        item_type: ItemTypeId,
        quantity: Quantity,
    ) -> Result<bool, InvalidArgument> {
        ensure_non_negative(quantity)?;
        if item_type != self.recipe.source_type() {
            return Ok(false);
        }

        let removed = self.source.remove(item_type, quantity)?;
        if removed {
            self.events.emit(Event::SourceRemoved {
                item_type,
                quantity,
            });
        }
        Ok(removed)
    }

    /// [`remove_source_item`](Self::remove_source_item) for the recipe's source type.
    pub fn remove_source(&mut self, quantity: Quantity) -> Result<bool, InvalidArgument> {
        self.remove_source_item(self.recipe.source_type(), quantity)
    }

    /// Collect finished goods. Freed room may let a pending batch start.
    pub fn remove_target_item(
        &mut self,
        item_type: ItemTypeId,
        quantity: Quantity,
    ) -> Result<bool, InvalidArgument> {
        ensure_non_negative(quantity)?;
        if item_type != self.recipe.target_type() {
            return Ok(false);
        }

        let removed = self.target.remove(item_type, quantity)?;
        if removed {
            self.events.emit(Event::TargetRemoved {
                item_type,
                quantity,
            });
        }

        self.try_start_batch();
        Ok(removed)
    }

    /// [`remove_target_item`](Self::remove_target_item) for the recipe's target type.
    pub fn remove_target(&mut self, quantity: Quantity) -> Result<bool, InvalidArgument> {
        self.remove_target_item(self.recipe.target_type(), quantity)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Register a listener for one kind of notification.
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_in_progress(&self) -> bool {
        self.enabled && self.in_progress != 0
    }

    /// Units withdrawn and held by the batch in flight (0 when none).
    pub fn in_progress_count(&self) -> Quantity {
        self.in_progress
    }

    pub fn state(&self) -> ConverterState {
        match (self.enabled, self.in_progress) {
            (false, _) => ConverterState::Disabled,
            (true, 0) => ConverterState::Idle,
            (true, _) => ConverterState::Converting,
        }
    }

    /// Stored units of the recipe's source type.
    pub fn source_count(&self) -> Quantity {
        self.source.quantity(self.recipe.source_type())
    }

    pub fn source_item_count(&self, item_type: ItemTypeId) -> Quantity {
        self.source.quantity(item_type)
    }

    /// Stored units of the recipe's target type.
    pub fn target_count(&self) -> Quantity {
        self.target.quantity(self.recipe.target_type())
    }

    pub fn target_item_count(&self, item_type: ItemTypeId) -> Quantity {
        self.target.quantity(item_type)
    }

    pub fn max_size(&self) -> Quantity {
        self.target.capacity()
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Time accumulated toward the current cycle.
    pub fn timer_elapsed(&self) -> Fixed64 {
        self.timer.elapsed()
    }

    pub fn source_storage(&self) -> &Storage {
        &self.source
    }

    pub fn target_storage(&self) -> &Storage {
        &self.target
    }

    /// Owned, read-only view for rendering and inspection.
    pub fn snapshot(&self) -> ConverterSnapshot {
        let state = self.state();
        let progress = if state == ConverterState::Converting {
            crate::fixed::checked_div_64(self.timer.elapsed(), self.recipe.cycle_time())
                .unwrap_or(Fixed64::ZERO)
                .clamp(Fixed64::ZERO, Fixed64::ONE)
        } else {
            Fixed64::ZERO
        };

        ConverterSnapshot {
            state,
            recipe: self.recipe,
            in_progress_count: self.in_progress,
            source_contents: self.source.iter().collect(),
            target_contents: self.target.iter().collect(),
            max_size: self.max_size(),
            timer_elapsed: self.timer.elapsed(),
            progress,
        }
    }

    // -----------------------------------------------------------------------
    // Internal transitions
    // -----------------------------------------------------------------------

    /// Finish the batch in flight. The output room is re-checked at fire
    /// time; when it is missing the batch stays in flight and is retried
    /// only on the next completion.
    pub(crate) fn complete_batch(&mut self) -> bool {
        if !self.batch_can_complete() {
            if self.is_in_progress() {
                tracing::warn!(
                    recipe = %self.recipe,
                    target_total = self.target.total(),
                    max_size = self.max_size(),
                    "output full at completion, batch held"
                );
            }
            return false;
        }

        let target = self.recipe.target();
        let overflow = self
            .target
            .add(target.item_type, target.quantity)
            .unwrap_or(target.quantity);
        debug_assert_eq!(overflow, 0, "completion precondition guarantees room");

        self.in_progress = 0;
        tracing::debug!(recipe = %self.recipe, "batch converted");
        self.events.emit(Event::Converted {
            recipe: self.recipe,
        });

        self.try_start_batch();
        true
    }

    /// Cancel the batch in flight and refund it to the input store.
    pub(crate) fn cancel_batch(&mut self) {
        self.timer.reset();

        if self.in_progress > 0 {
            let refund = self.in_progress;
            let item_type = self.recipe.source_type();
            let burned = self.source.add(item_type, refund).unwrap_or(refund);
            if burned > 0 {
                tracing::warn!(item = item_type.0, refund, burned, "refund overflowed input store");
            }

            self.in_progress = 0;
            tracing::debug!(recipe = %self.recipe, refund, burned, "batch cancelled");
            self.events.emit(Event::StoppedConverting {
                recipe: self.recipe,
            });
        }
    }

    /// Withdraw one batch if the converter is idle and both stores allow it.
    pub(crate) fn try_start_batch(&mut self) {
        if !self.batch_can_start() {
            return;
        }

        let source = self.recipe.source();
        match self.source.remove(source.item_type, source.quantity) {
            Ok(true) => {}
            _ => return,
        }

        self.in_progress = source.quantity;
        tracing::debug!(
            recipe = %self.recipe,
            in_progress = self.in_progress,
            "batch started"
        );
        self.events.emit(Event::StartedConverting {
            recipe: self.recipe,
        });
    }

    /// Idle, enough source stored, and room for one batch of output.
    pub(crate) fn batch_can_start(&self) -> bool {
        self.enabled
            && !self.is_in_progress()
            && self.source_count() >= self.recipe.source_count()
            && self.output_has_room()
    }

    /// A full batch is in flight and its output still fits.
    pub(crate) fn batch_can_complete(&self) -> bool {
        self.enabled && self.in_progress == self.recipe.source_count() && self.output_has_room()
    }

    fn output_has_room(&self) -> bool {
        self.recipe.target_count() <= self.max_size() - self.target.total()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
