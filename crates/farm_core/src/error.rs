//! Error types for the farm simulation.
//!
//! Only data loading can fail. Rejected gameplay actions are modelled as
//! values (see [`crate::simulation::InteractOutcome`]), not errors.

use thiserror::Error;

/// Result type alias using [`FarmError`].
pub type Result<T> = std::result::Result<T, FarmError>;

/// Top-level error type for all farm simulation errors.
#[derive(Debug, Error)]
pub enum FarmError {
    /// Entity catalog JSON could not be parsed.
    #[error("Failed to parse entity catalog: {0}")]
    CatalogParse(#[source] serde_json::Error),

    /// Obstacle area JSON could not be parsed.
    #[error("Failed to parse obstacle areas: {0}")]
    ObstacleParse(#[source] serde_json::Error),

    /// Simulation config RON could not be parsed.
    #[error("Failed to parse simulation config: {0}")]
    ConfigParse(#[source] ron::error::SpannedError),

    /// Catalog parsed but describes an impossible initial state.
    #[error("Invalid entity catalog: {errors:?}")]
    InvalidCatalog {
        /// One message per offending record.
        errors: Vec<String>,
    },

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Invalid simulation state.
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),
}
