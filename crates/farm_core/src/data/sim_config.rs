//! Simulation parameters loaded from RON.

use serde::{Deserialize, Serialize};

use crate::collision::SamplingPolicy;
use crate::error::{FarmError, Result};
use crate::interaction::DEFAULT_INTERACTION_RADIUS;
use crate::lifecycle::DEFAULT_WITHER_AFTER_MS;
use crate::math::{float_serde, Fixed, Millis, Vec2Fixed, WORLD_LIMIT};
use crate::wander::WanderProfile;

/// Map edge used for the default player bounds.
const WORLD_WIDTH: i32 = 6_000;
const WORLD_HEIGHT: i32 = 3_000;
const EDGE_MARGIN: i32 = 32;

/// Axis-aligned rectangle the player is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Top-left corner.
    pub min: Vec2Fixed,
    /// Bottom-right corner.
    pub max: Vec2Fixed,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: Vec2Fixed::from_num(EDGE_MARGIN, EDGE_MARGIN),
            max: Vec2Fixed::from_num(WORLD_WIDTH - EDGE_MARGIN, WORLD_HEIGHT - EDGE_MARGIN),
        }
    }
}

impl WorldBounds {
    /// Clamp `point` into the rectangle.
    #[must_use]
    pub fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Player tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Start position.
    pub spawn: Vec2Fixed,
    /// Distance per move command.
    #[serde(with = "float_serde")]
    pub speed: Fixed,
    /// Half-width of the collision footprint.
    #[serde(with = "float_serde")]
    pub body_radius: Fixed,
    /// Movement clamp.
    pub bounds: WorldBounds,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2Fixed::from_num(400, 300),
            speed: Fixed::from_num(5),
            body_radius: Fixed::ZERO,
            bounds: WorldBounds::default(),
        }
    }
}

/// Everything the simulation needs besides the catalog and obstacles.
///
/// # Example RON
///
/// ```ron
/// SimulationConfig(
///     seed: 7,
///     lifecycle_tick_ms: 1000,
///     cow: (
///         decision_interval_ms: 2000,
///         move_chance_percent: 70,
///         min_distance: 20,
///         max_distance: 50,
///         wander_radius: Some(150.0),
///         move_duration_ms: 1000,
///         step: 1,
///         body_radius: 8,
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every wander RNG stream.
    pub seed: u64,
    /// Period of per-entity lifecycle ticks.
    pub lifecycle_tick_ms: Millis,
    /// Period of the movement interpolation frame.
    pub frame_ms: Millis,
    /// Reach of the interaction gate.
    #[serde(with = "float_serde")]
    pub interaction_radius: Fixed,
    /// Time a planted crop may go unwatered.
    pub wither_after_ms: Millis,
    /// Path sampling constants.
    pub sampling: SamplingPolicy,
    /// Player tuning.
    pub player: PlayerConfig,
    /// Cow wander tuning.
    pub cow: WanderProfile,
    /// Chicken wander tuning.
    pub chicken: WanderProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            lifecycle_tick_ms: 1_000,
            frame_ms: 16,
            interaction_radius: Fixed::from_num(DEFAULT_INTERACTION_RADIUS),
            wither_after_ms: DEFAULT_WITHER_AFTER_MS,
            sampling: SamplingPolicy::default(),
            player: PlayerConfig::default(),
            cow: WanderProfile::cow(),
            chicken: WanderProfile::chicken(),
        }
    }
}

impl SimulationConfig {
    /// Parse a config from RON; omitted fields take their defaults.
    pub fn from_ron_str(ron_text: &str) -> Result<Self> {
        ron::from_str(ron_text).map_err(FarmError::ConfigParse)
    }

    /// Check values that would stall or break the simulation.
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.lifecycle_tick_ms == 0 {
            errors.push("lifecycle_tick_ms must be positive".to_string());
        }
        if self.frame_ms == 0 {
            errors.push("frame_ms must be positive".to_string());
        }
        if self.sampling.path_steps == 0 {
            errors.push("sampling.path_steps must be positive".to_string());
        }
        if self.player.bounds.min.x > self.player.bounds.max.x
            || self.player.bounds.min.y > self.player.bounds.max.y
        {
            errors.push("player.bounds min exceeds max".to_string());
        }
        for (name, point) in [
            ("player.spawn", self.player.spawn),
            ("player.bounds.min", self.player.bounds.min),
            ("player.bounds.max", self.player.bounds.max),
        ] {
            if !point.within_world_limit() {
                errors.push(format!("{name} lies beyond the world limit of {WORLD_LIMIT}"));
            }
        }
        for (name, length) in [
            ("interaction_radius", self.interaction_radius),
            ("player.speed", self.player.speed),
            ("player.body_radius", self.player.body_radius),
        ] {
            if !within_length_limit(length) {
                errors.push(format!("{name} must be between 0 and {WORLD_LIMIT}"));
            }
        }
        for (name, profile) in [("cow", &self.cow), ("chicken", &self.chicken)] {
            if profile.decision_interval_ms == 0 {
                errors.push(format!("{name}.decision_interval_ms must be positive"));
            }
            if profile.min_distance > profile.max_distance {
                errors.push(format!("{name}.min_distance exceeds max_distance"));
            }
            if profile.move_chance_percent > 100 {
                errors.push(format!("{name}.move_chance_percent exceeds 100"));
            }
            if profile.step == 0 {
                errors.push(format!("{name}.step must be positive"));
            }
            if profile.wander_radius.is_some_and(|r| !within_length_limit(r)) {
                errors.push(format!("{name}.wander_radius must be between 0 and {WORLD_LIMIT}"));
            }
            if [profile.max_distance, profile.step, profile.body_radius]
                .into_iter()
                .any(|v| v > WORLD_LIMIT.unsigned_abs())
            {
                errors.push(format!("{name} distances exceed the world limit of {WORLD_LIMIT}"));
            }
        }

        errors
    }
}

fn within_length_limit(length: Fixed) -> bool {
    length >= Fixed::ZERO && length <= Fixed::from_num(WORLD_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimulationConfig::from_ron_str("()").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.cow.wander_radius, Some(Fixed::from_num(150)));
        assert_eq!(config.chicken.wander_radius, None);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_override() {
        let config = SimulationConfig::from_ron_str(
            "SimulationConfig(seed: 42, wither_after_ms: 1000, player: (speed: 3.5))",
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.wither_after_ms, 1_000);
        assert_eq!(config.player.speed, Fixed::from_num(3.5));
        assert_eq!(config.player.spawn, Vec2Fixed::from_num(400, 300));
    }

    #[test]
    fn test_bad_ron_is_config_error() {
        let err = SimulationConfig::from_ron_str("SimulationConfig(seed: \"x\")").unwrap_err();
        assert!(matches!(err, FarmError::ConfigParse(_)));
    }

    #[test]
    fn test_validate_flags_bad_profile() {
        let mut config = SimulationConfig::default();
        config.chicken.min_distance = 99;
        config.frame_ms = 0;
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_validate_flags_values_beyond_world_limit() {
        let config = SimulationConfig::from_ron_str(
            "SimulationConfig(cow: (decision_interval_ms: 2000, move_chance_percent: 70, \
             min_distance: 20, max_distance: 50, wander_radius: Some(50000.0), \
             move_duration_ms: 1000, step: 1, body_radius: 8))",
        )
        .unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("cow.wander_radius"));

        let mut config = SimulationConfig::default();
        config.player.spawn = Vec2Fixed::from_num(50_000, 300);
        config.interaction_radius = Fixed::from_num(-1);
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = WorldBounds::default();
        assert_eq!(
            bounds.clamp(Vec2Fixed::from_num(-10, 9_000)),
            Vec2Fixed::from_num(32, 2_968)
        );
    }
}
