//! Refinery Core -- a batch resource converter.
//!
//! A [`converter::Converter`] withdraws a fixed batch of one resource type
//! from a capacity-bounded input store, holds it for one cycle, then
//! deposits a fixed quantity of another type into a capacity-bounded output
//! store, repeating while supply and space permit.
//!
//! # Driving a converter
//!
//! The host owns the converter and calls it serially from one thread:
//!
//! ```rust,ignore
//! let recipe = Recipe::new(wood, 5, plank, 1, Fixed64::from_num(2))?;
//! let mut converter = Converter::new(10, recipe)?;
//! converter.set_enabled(true);
//! let overflow = converter.add_source_item(wood, 7)?;
//! converter.advance(frame_delta)?;
//! ```
//!
//! Every command runs to completion before returning. Notifications are
//! delivered synchronously through [`event::EventBus`].
//!
//! # Key Types
//!
//! - [`converter::Converter`] -- The conversion state machine.
//! - [`storage::Storage`] -- Aggregate-capacity multi-type store.
//! - [`timer::IntervalTimer`] -- Repeating timer with catch-up.
//! - [`recipe::Recipe`] -- Immutable source/target/duration description.
//! - [`event::EventBus`] -- Per-kind listener registry and recent-event log.
//! - [`query::ConverterSnapshot`] -- Owned read-only view for hosts.
//! - [`registry::ItemRegistry`] -- Item names for data files and display.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for time.

pub mod converter;
pub mod error;
pub mod event;
pub mod fixed;
pub mod id;
pub mod query;
pub mod recipe;
pub mod registry;
pub mod storage;
pub mod timer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
