//! Loading world data files from disk.
//!
//! `farm_core` only parses strings; this module owns the file IO and
//! attaches paths to every failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use farm_core::data::{EntityCatalog, SimulationConfig};
use farm_core::error::FarmError;
use farm_core::geometry::ObstacleSet;
use farm_core::simulation::Simulation;
use thiserror::Error;

use crate::script::Script;

/// Error type for loading world data.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// File exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// File was read but its contents are invalid.
    #[error("Invalid data in {}: {source}", path.display())]
    Data {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: FarmError,
    },

    /// Script file could not be parsed.
    #[error("Failed to parse script {}: {source}", path.display())]
    Script {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// Files parsed individually but do not form a valid world.
    #[error("World setup rejected: {0}")]
    Setup(#[from] FarmError),
}

/// Where the world files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldPaths {
    /// Simulation config (RON); defaults apply when absent.
    pub config: Option<PathBuf>,
    /// Entity catalog (JSON).
    pub catalog: PathBuf,
    /// Obstacle areas (JSON); an empty set when absent.
    pub obstacles: Option<PathBuf>,
}

impl WorldPaths {
    /// The conventional file names inside a data directory.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: Some(dir.join("sim_config.ron")),
            catalog: dir.join("catalog.json"),
            obstacles: Some(dir.join("obstacles.json")),
        }
    }
}

/// Parsed world files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    /// Simulation config.
    pub config: SimulationConfig,
    /// Entity catalog.
    pub catalog: EntityCatalog,
    /// Obstacle areas.
    pub obstacles: ObstacleSet,
}

impl World {
    /// Load every file named in `paths`.
    pub fn load(paths: &WorldPaths) -> Result<Self, LoadError> {
        let config = match &paths.config {
            Some(path) => load_config(path)?,
            None => SimulationConfig::default(),
        };
        let catalog = load_catalog(&paths.catalog)?;
        let obstacles = match &paths.obstacles {
            Some(path) => load_obstacles(path)?,
            None => ObstacleSet::default(),
        };

        tracing::info!(
            entities = catalog.len(),
            obstacle_areas = obstacles.areas.len(),
            active_areas = obstacles.active_count(),
            seed = config.seed,
            "Loaded world data"
        );
        Ok(Self {
            config,
            catalog,
            obstacles,
        })
    }

    /// Every consistency problem in the config and catalog.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.config.validate();
        errors.extend(self.catalog.validate());
        errors
    }

    /// Build the simulation.
    pub fn build(self) -> Result<Simulation, LoadError> {
        Ok(Simulation::from_parts(
            self.config,
            &self.catalog,
            self.obstacles,
        )?)
    }
}

/// Read a whole file, distinguishing "missing" from other IO failures.
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn with_path<T>(path: &Path, result: farm_core::error::Result<T>) -> Result<T, LoadError> {
    result.map_err(|source| LoadError::Data {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a simulation config from RON.
pub fn load_config(path: &Path) -> Result<SimulationConfig, LoadError> {
    let text = read_text(path)?;
    with_path(path, SimulationConfig::from_ron_str(&text))
}

/// Load an entity catalog from JSON.
pub fn load_catalog(path: &Path) -> Result<EntityCatalog, LoadError> {
    let text = read_text(path)?;
    with_path(path, EntityCatalog::from_json_str(&text))
}

/// Load obstacle areas from JSON.
pub fn load_obstacles(path: &Path) -> Result<ObstacleSet, LoadError> {
    let text = read_text(path)?;
    let set = with_path(path, ObstacleSet::from_json_str(&text))?;
    let inactive = set.areas.len() - set.active_count();
    if inactive > 0 {
        tracing::warn!(path = %path.display(), inactive, "Ignoring areas with fewer than 3 points");
    }
    Ok(set)
}

/// Load a command script from RON.
pub fn load_script(path: &Path) -> Result<Script, LoadError> {
    let text = read_text(path)?;
    Script::from_ron_str(&text).map_err(|source| LoadError::Script {
        path: path.to_path_buf(),
        source,
    })
}
