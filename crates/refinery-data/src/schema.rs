//! Serde data file structs for plant definitions.
//!
//! These structs define the on-disk format for items and converters. They
//! are deserialized from RON, JSON, or TOML and then resolved into core
//! types by the loader.

use serde::Deserialize;

/// Top-level plant file: the item vocabulary plus every converter.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantData {
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub converters: Vec<ConverterData>,
}

/// An item type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
}

/// A converter definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterData {
    pub name: String,
    /// Shared by the input and output stores.
    pub capacity: i64,
    pub recipe: RecipeData,
    /// Whether the converter is switched on after loading.
    #[serde(default)]
    pub enabled: bool,
}

/// A recipe definition. Items are referenced by name:
/// `source: ("wood", 5)`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub source: (String, i64),
    pub target: (String, i64),
    /// Seconds per batch.
    pub cycle_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plant_ron() {
        let ron_str = r#"(
            items: [(name: "wood"), (name: "plank")],
            converters: [
                (
                    name: "sawmill",
                    capacity: 10,
                    recipe: (source: ("wood", 5), target: ("plank", 1), cycle_time: 2.0),
                    enabled: true,
                ),
            ],
        )"#;
        let plant: PlantData = ron::from_str(ron_str).unwrap();
        assert_eq!(plant.items.len(), 2);
        assert_eq!(plant.converters[0].name, "sawmill");
        assert_eq!(plant.converters[0].recipe.source, ("wood".to_string(), 5));
        assert!(plant.converters[0].enabled);
    }

    #[test]
    fn parse_plant_json_defaults() {
        let json = r#"{
            "converters": [
                {
                    "name": "sawmill",
                    "capacity": 5,
                    "recipe": {"source": ["wood", 5], "target": ["plank", 1], "cycle_time": 1.0}
                }
            ]
        }"#;
        let plant: PlantData = serde_json::from_str(json).unwrap();
        assert!(plant.items.is_empty());
        assert!(!plant.converters[0].enabled);
        assert_eq!(plant.converters[0].recipe.cycle_time, 1.0);
    }

    #[test]
    fn parse_plant_toml() {
        let toml_str = r#"
[[items]]
name = "wood"

[[items]]
name = "plank"

[[converters]]
name = "sawmill"
capacity = 10
enabled = true

[converters.recipe]
source = ["wood", 5]
target = ["plank", 1]
cycle_time = 0.5
"#;
        let plant: PlantData = toml::from_str(toml_str).unwrap();
        assert_eq!(plant.items.len(), 2);
        assert_eq!(plant.converters[0].capacity, 10);
        assert_eq!(plant.converters[0].recipe.target, ("plank".to_string(), 1));
    }
}
