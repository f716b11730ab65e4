//! Loading pipeline: reads a plant file, resolves item names, builds converters.
//!
//! Format is picked from the file extension (RON/JSON/TOML). Names are
//! resolved against the file's own `items` list; converters start disabled
//! unless the file says otherwise.

use refinery_core::converter::Converter;
use refinery_core::error::InvalidArgument;
use refinery_core::fixed::Fixed64;
use refinery_core::id::ItemTypeId;
use refinery_core::recipe::Recipe;
use refinery_core::registry::{ItemRegistryBuilder, RegistryError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::plant::{NamedConverter, Plant};
use crate::schema::{ConverterData, PlantData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The item registry refused an entry.
    #[error("item registry error in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    /// A cycle time that cannot be represented as a fixed-point duration.
    #[error("converter '{name}' in {file}: cycle time {value} is not representable")]
    InvalidCycleTime {
        file: PathBuf,
        name: String,
        value: f64,
    },

    /// The converter definition was rejected by the core.
    #[error("converter '{name}' in {file}: {source}")]
    InvalidConverter {
        file: PathBuf,
        name: String,
        #[source]
        source: InvalidArgument,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

/// Deserialize already-read content. `path` is only used in error messages.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    path: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

/// Look up a name in a map, returning an `UnresolvedRef` error if not found.
pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

// ===========================================================================
// Plant assembly
// ===========================================================================

/// Load a plant file and build every converter it declares.
pub fn load_plant(path: &Path) -> Result<Plant, DataLoadError> {
    let data: PlantData = deserialize_file(path)?;
    let plant = build_plant(data, path)?;
    tracing::info!(
        file = %path.display(),
        items = plant.registry.item_count(),
        converters = plant.converters.len(),
        "plant loaded"
    );
    Ok(plant)
}

/// Resolve deserialized plant data. `file` is only used in error messages.
pub fn build_plant(data: PlantData, file: &Path) -> Result<Plant, DataLoadError> {
    let mut builder = ItemRegistryBuilder::new();
    let mut item_ids: HashMap<String, ItemTypeId> = HashMap::new();
    for item in &data.items {
        check_duplicate(&item_ids, &item.name, file)?;
        let id = builder
            .register_item(&item.name)
            .map_err(|source| DataLoadError::Registry {
                file: file.to_path_buf(),
                source,
            })?;
        item_ids.insert(item.name.clone(), id);
    }

    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut converters = Vec::with_capacity(data.converters.len());
    for def in data.converters {
        check_duplicate(&seen, &def.name, file)?;
        seen.insert(def.name.clone(), ());

        let converter = build_converter(&def, &item_ids, file)?;
        tracing::debug!(
            converter = %def.name,
            enabled = converter.is_enabled(),
            "converter built"
        );
        converters.push(NamedConverter {
            name: def.name,
            converter,
        });
    }

    Ok(Plant {
        registry: builder.build(),
        converters,
    })
}

fn build_converter(
    def: &ConverterData,
    item_ids: &HashMap<String, ItemTypeId>,
    file: &Path,
) -> Result<Converter, DataLoadError> {
    let (source_name, source_count) = &def.recipe.source;
    let (target_name, target_count) = &def.recipe.target;
    let source_type = *resolve_name(item_ids, source_name, file, "item")?;
    let target_type = *resolve_name(item_ids, target_name, file, "item")?;

    let cycle_time = def
        .recipe
        .cycle_time
        .is_finite()
        .then(|| Fixed64::checked_from_num(def.recipe.cycle_time))
        .flatten()
        .ok_or_else(|| DataLoadError::InvalidCycleTime {
            file: file.to_path_buf(),
            name: def.name.clone(),
            value: def.recipe.cycle_time,
        })?;

    let invalid = |source: InvalidArgument| DataLoadError::InvalidConverter {
        file: file.to_path_buf(),
        name: def.name.clone(),
        source,
    };
    let recipe = Recipe::new(
        source_type,
        *source_count,
        target_type,
        *target_count,
        cycle_time,
    )
    .map_err(invalid)?;
    let mut converter = Converter::new(def.capacity, recipe).map_err(invalid)?;
    converter.set_enabled(def.enabled);
    Ok(converter)
}
