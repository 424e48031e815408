//! Test fixtures and helpers.
//!
//! Pre-built obstacle layouts, catalogs and simulations for consistent
//! testing.

use farm_core::data::{EntityCatalog, SimulationConfig};
use farm_core::geometry::{ObstacleRegion, ObstacleSet};
use farm_core::math::{Fixed, Vec2Fixed};
use farm_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Integer point.
#[must_use]
pub fn pt(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_num(x, y)
}

/// Axis-aligned rectangle region, clockwise from the top-left corner.
#[must_use]
pub fn rect(name: &str, x: i32, y: i32, w: i32, h: i32) -> ObstacleRegion {
    ObstacleRegion::new(
        name,
        vec![pt(x, y), pt(x + w, y), pt(x + w, y + h), pt(x, y + h)],
    )
}

/// The 10x10 square used for containment edge cases.
#[must_use]
pub fn unit_square() -> Vec<Vec2Fixed> {
    vec![pt(0, 0), pt(10, 0), pt(10, 10), pt(0, 10)]
}

/// A small farm layout: pond, fence line, barn and one inactive stub.
#[must_use]
pub fn farm_obstacles() -> ObstacleSet {
    ObstacleSet::new(vec![
        rect("pond", 700, 200, 120, 80),
        rect("fence_north", 500, 100, 400, 8),
        ObstacleRegion::new(
            "barn",
            vec![pt(900, 300), pt(1000, 300), pt(1000, 380), pt(950, 420), pt(900, 380)],
        ),
        ObstacleRegion::new("unfinished", vec![pt(0, 0), pt(50, 50)]),
    ])
}

/// Catalog with one of each category placed around the default spawn.
pub const SAMPLE_CATALOG: &str = r#"{
    "trees": [{ "id": "tree_1", "position": { "x": 460, "y": 300 } }],
    "fruitTrees": [{
        "id": "apple_1", "position": { "x": 400, "y": 360 },
        "fruitType": "apple", "fruitGrowthTime": 10000, "maxFruits": 3, "currentFruits": 1
    }],
    "rocks": [{
        "id": "rock_1", "position": { "x": 340, "y": 300 },
        "dropItems": ["stone"], "health": 3, "respawnTime": 30000
    }],
    "crops": [{ "id": "crop_1", "position": { "x": 400, "y": 250 }, "growthTime": 10000 }],
    "cows": [{
        "id": "cow_1", "position": { "x": 600, "y": 450 }, "direction": "left",
        "product": "milk", "productionTime": 60000
    }],
    "chickens": [{
        "id": "chicken_1", "position": { "x": 250, "y": 450 },
        "product": "egg", "productionTime": 30000
    }]
}"#;

/// Parsed [`SAMPLE_CATALOG`].
///
/// # Panics
///
/// Panics if the embedded catalog no longer parses.
#[must_use]
pub fn sample_catalog() -> EntityCatalog {
    EntityCatalog::from_json_str(SAMPLE_CATALOG).expect("sample catalog parses")
}

/// Config with a fixed seed.
#[must_use]
pub fn seeded_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        seed,
        ..SimulationConfig::default()
    }
}

/// Sample catalog on the farm layout.
///
/// # Panics
///
/// Panics if the sample data stops validating.
#[must_use]
pub fn sample_simulation(seed: u64) -> Simulation {
    Simulation::from_parts(seeded_config(seed), &sample_catalog(), farm_obstacles())
        .expect("sample simulation builds")
}

/// Squared distance as an `f64`, for readable assertions.
#[must_use]
pub fn dist_sq_f(a: Vec2Fixed, b: Vec2Fixed) -> f64 {
    let d: Fixed = a.distance_squared(b);
    d.to_num::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_helpers() {
        assert_eq!(fixed(5), I32F32::from_num(5));
        assert_eq!(fixed_f(2.5), I32F32::from_num(2.5));
    }

    #[test]
    fn test_farm_obstacles_have_one_inactive_region() {
        let set = farm_obstacles();
        assert_eq!(set.areas.len(), 4);
        assert_eq!(set.active_count(), 3);
    }

    #[test]
    fn test_sample_simulation_spawns_everything() {
        let sim = sample_simulation(1);
        assert_eq!(sim.entity_count(), 6);
    }
}
