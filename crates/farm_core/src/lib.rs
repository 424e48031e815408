//! # Farm Core
//!
//! Deterministic simulation core for a real-time farm world.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (data formats parse from strings)
//! - No wall clock (every operation takes an injected `now`)
//! - No system randomness (wander decisions use seeded per-entity streams)
//!
//! This separation enables:
//! - Headless runs and scripted scenarios
//! - Determinism testing
//! - Hot-replacing obstacle data from an authoring tool
//!
//! ## Crate Structure
//!
//! - [`geometry`] - Obstacle regions and point-in-polygon
//! - [`collision`] - Point and path blocking queries
//! - [`lifecycle`] - Per-entity state machines
//! - [`movement`] - Facing, movers and per-frame interpolation
//! - [`wander`] - Autonomous animal walk decisions
//! - [`interaction`] - Player reach gate
//! - [`scheduler`] - Single timer queue keyed by simulation time
//! - [`data`] - Entity catalog and simulation config formats
//! - [`simulation`] - The simulation context
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod collision;
pub mod data;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod lifecycle;
pub mod math;
pub mod movement;
pub mod scheduler;
pub mod simulation;
pub mod wander;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collision::{CollisionMap, SamplingPolicy};
    pub use crate::data::{EntityCatalog, SimulationConfig};
    pub use crate::entity::{EntityId, EntityKind};
    pub use crate::error::{FarmError, Result};
    pub use crate::geometry::{ObstacleRegion, ObstacleSet};
    pub use crate::lifecycle::{Action, Lifecycle, LifecycleState};
    pub use crate::math::{Fixed, Millis, Vec2Fixed};
    pub use crate::movement::{Facing, MoveDirection};
    pub use crate::simulation::{
        EntitySnapshot, InteractOutcome, PlayerMove, PlayerSnapshot, Rejection, Simulation,
        TickEvents,
    };
}
