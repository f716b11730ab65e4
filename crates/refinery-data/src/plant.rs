//! A loaded set of converters sharing one item vocabulary.

use refinery_core::converter::Converter;
use refinery_core::error::InvalidArgument;
use refinery_core::fixed::Fixed64;
use refinery_core::query::ConverterSnapshot;
use refinery_core::registry::ItemRegistry;

/// A converter together with the name it was declared under.
#[derive(Debug)]
pub struct NamedConverter {
    pub name: String,
    pub converter: Converter,
}

/// Everything a plant file describes, resolved into core types.
#[derive(Debug)]
pub struct Plant {
    pub registry: ItemRegistry,
    pub converters: Vec<NamedConverter>,
}

impl Plant {
    /// Advance every converter by the same delta, in declaration order.
    ///
    /// A non-positive delta is rejected before any converter moves.
    pub fn advance(&mut self, delta: Fixed64) -> Result<(), InvalidArgument> {
        if delta <= Fixed64::ZERO {
            return Err(InvalidArgument::NonPositiveDuration {
                what: "delta",
                value: delta,
            });
        }
        for named in &mut self.converters {
            named.converter.advance(delta)?;
        }
        Ok(())
    }

    pub fn converter(&self, name: &str) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.converter)
    }

    pub fn converter_mut(&mut self, name: &str) -> Option<&mut Converter> {
        self.converters
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.converter)
    }

    /// Snapshots of every converter, paired with its name.
    pub fn snapshots(&self) -> Vec<(&str, ConverterSnapshot)> {
        self.converters
            .iter()
            .map(|c| (c.name.as_str(), c.converter.snapshot()))
            .collect()
    }
}
