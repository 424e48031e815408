//! Data formats for the farm world.
//!
//! This module contains pure data structures: the entity catalog (JSON,
//! authored alongside the map) and the simulation config (RON).
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. File loading is handled by `farm_headless`.

mod catalog;
mod sim_config;

pub use catalog::{
    AnimalRecord, CatalogId, CropRecord, EntityCatalog, EntitySpec, FruitTreeRecord, RockRecord,
    TreeRecord,
};
pub use sim_config::{PlayerConfig, SimulationConfig, WorldBounds};
