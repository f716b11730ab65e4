pub mod loader;
pub mod plant;
pub mod schema;

pub use loader::{load_plant, DataLoadError};
pub use plant::{NamedConverter, Plant};
