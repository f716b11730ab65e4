use std::collections::HashMap;

use crate::id::ItemTypeId;
use crate::recipe::Recipe;

/// An item type definition in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTypeDef {
    pub name: String,
}

/// Builder for an immutable [`ItemRegistry`]. Ids are handed out in
/// registration order starting at 0.
#[derive(Debug, Default)]
pub struct ItemRegistryBuilder {
    items: Vec<ItemTypeDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
}

impl ItemRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item type. Returns its ID.
    pub fn register_item(&mut self, name: &str) -> Result<ItemTypeId, RegistryError> {
        if self.item_name_to_id.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        let id = Self::next_id(self.items.len())?;
        self.items.push(ItemTypeDef {
            name: name.to_string(),
        });
        self.item_name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Lookup item type ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    fn next_id(registered: usize) -> Result<ItemTypeId, RegistryError> {
        u32::try_from(registered)
            .map(ItemTypeId)
            .map_err(|_| RegistryError::TooManyItems(registered))
    }

    pub fn build(self) -> ItemRegistry {
        ItemRegistry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
        }
    }
}

/// Immutable name <-> id mapping for item types. Frozen after build().
#[derive(Debug, Default)]
pub struct ItemRegistry {
    items: Vec<ItemTypeDef>,
    item_name_to_id: HashMap<String, ItemTypeId>,
}

impl ItemRegistry {
    pub fn get_item(&self, id: ItemTypeId) -> Option<&ItemTypeDef> {
        self.items.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemTypeId> {
        self.item_name_to_id.get(name).copied()
    }

    /// Name of an item, or `None` for ids this registry never issued.
    pub fn item_name(&self, id: ItemTypeId) -> Option<&str> {
        self.get_item(id).map(|item| item.name.as_str())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Human-readable recipe line, e.g. `wood: 5 -> plank: 1; time: 2`.
    /// Unknown ids fall back to `#<id>`.
    pub fn describe_recipe(&self, recipe: &Recipe) -> String {
        let name = |id: ItemTypeId| {
            self.item_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", id.0))
        };
        format!(
            "{}: {} -> {}: {}; time: {}",
            name(recipe.source_type()),
            recipe.source_count(),
            name(recipe.target_type()),
            recipe.target_count(),
            recipe.cycle_time()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate item name: {0}")]
    DuplicateName(String),
    #[error("item id space exhausted after {0} items")]
    TooManyItems(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed64;

    fn setup_builder() -> ItemRegistryBuilder {
        let mut b = ItemRegistryBuilder::new();
        b.register_item("wood").unwrap();
        b.register_item("plank").unwrap();
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build();
        assert_eq!(reg.item_count(), 2);
        assert_eq!(reg.item_id("wood"), Some(ItemTypeId(0)));
        assert_eq!(reg.item_id("plank"), Some(ItemTypeId(1)));
        assert!(reg.item_id("nonexistent").is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut b = setup_builder();
        assert!(matches!(
            b.register_item("wood"),
            Err(RegistryError::DuplicateName(ref name)) if name == "wood"
        ));
        assert_eq!(b.build().item_count(), 2);
    }

    #[test]
    fn name_lookup_by_id() {
        let reg = setup_builder().build();
        assert_eq!(reg.item_name(ItemTypeId(1)), Some("plank"));
        assert_eq!(reg.item_name(ItemTypeId(9)), None);
    }

    #[test]
    fn describe_recipe_uses_names() {
        let reg = setup_builder().build();
        let recipe =
            Recipe::new(ItemTypeId(0), 5, ItemTypeId(7), 1, Fixed64::from_num(2)).unwrap();
        let text = reg.describe_recipe(&recipe);
        assert!(text.starts_with("wood: 5 -> #7: 1; time: "), "got {text}");
    }

    #[test]
    fn ids_past_u32_range_are_rejected() {
        assert_eq!(ItemRegistryBuilder::next_id(7).unwrap(), ItemTypeId(7));
        assert_eq!(
            ItemRegistryBuilder::next_id(u32::MAX as usize).unwrap(),
            ItemTypeId(u32::MAX)
        );
        assert!(matches!(
            ItemRegistryBuilder::next_id(u32::MAX as usize + 1),
            Err(RegistryError::TooManyItems(_))
        ));
    }
}
