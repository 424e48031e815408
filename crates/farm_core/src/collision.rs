//! Collision service shared by the player and every wandering animal.
//!
//! Answers two questions against the current obstacle snapshot:
//! is a point blocked, and is a straight move blocked. Moves are checked by
//! sampling the segment and probing a small square footprint at each sample.
//! This is a conservative approximation rather than swept-shape collision;
//! it holds up because movers are small next to obstacle regions and every
//! individual step is short.

use serde::{Deserialize, Serialize};

use crate::geometry::ObstacleSet;
use crate::math::{Fixed, Vec2Fixed};

/// Reference number of interpolation samples along a path.
pub const DEFAULT_PATH_STEPS: u32 = 20;

/// Sampling constants for path checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    /// Number of samples between start (exclusive) and end (inclusive).
    pub path_steps: u32,
    /// Probe the four footprint corners at each sample, not just the centre.
    pub probe_corners: bool,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            path_steps: DEFAULT_PATH_STEPS,
            probe_corners: true,
        }
    }
}

/// Obstacle snapshot plus the sampling policy used to query it.
#[derive(Debug, Clone, Default)]
pub struct CollisionMap {
    obstacles: ObstacleSet,
    policy: SamplingPolicy,
}

impl CollisionMap {
    /// Create a collision map over an obstacle set.
    #[must_use]
    pub fn new(obstacles: ObstacleSet, policy: SamplingPolicy) -> Self {
        Self { obstacles, policy }
    }

    /// The current obstacle snapshot.
    #[must_use]
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    /// Swap in a new obstacle snapshot wholesale.
    ///
    /// Returns the previous set. Checks already completed are unaffected;
    /// movers in transit see the new regions on their next frame.
    pub fn replace(&mut self, obstacles: ObstacleSet) -> ObstacleSet {
        tracing::info!(
            regions = obstacles.areas.len(),
            active = obstacles.active_count(),
            "Obstacle regions replaced"
        );
        std::mem::replace(&mut self.obstacles, obstacles)
    }

    /// True if `point` lies inside any active region.
    #[must_use]
    pub fn is_blocked(&self, point: Vec2Fixed) -> bool {
        self.obstacles.active().any(|area| area.contains(point))
    }

    /// True if a body of half-width `body_radius` cannot travel in a straight
    /// line from `start` to `end`.
    ///
    /// A blocked endpoint short-circuits without sampling, and a zero-length
    /// path reports whatever [`is_blocked`](Self::is_blocked) says for `start`.
    #[must_use]
    pub fn is_path_blocked(&self, start: Vec2Fixed, end: Vec2Fixed, body_radius: Fixed) -> bool {
        if start == end {
            return self.is_blocked(start);
        }
        if self.is_blocked(start) || self.is_blocked(end) {
            return true;
        }

        let steps = self.policy.path_steps.max(1);
        let step_count = Fixed::from_num(steps);
        (1..=steps).any(|i| {
            let t = Fixed::from_num(i) / step_count;
            self.footprint_blocked(start.lerp(end, t), body_radius)
        })
    }

    /// Probe the sample centre and, when enabled, the four footprint corners.
    fn footprint_blocked(&self, center: Vec2Fixed, body_radius: Fixed) -> bool {
        if self.is_blocked(center) {
            return true;
        }
        if !self.policy.probe_corners || body_radius <= Fixed::ZERO {
            return false;
        }

        let r = body_radius;
        [(-r, -r), (r, -r), (-r, r), (r, r)]
            .into_iter()
            .any(|(dx, dy)| self.is_blocked(center + Vec2Fixed::new(dx, dy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ObstacleRegion;

    fn square_map() -> CollisionMap {
        let square = ObstacleRegion::new(
            "square",
            vec![
                Vec2Fixed::from_num(0, 0),
                Vec2Fixed::from_num(10, 0),
                Vec2Fixed::from_num(10, 10),
                Vec2Fixed::from_num(0, 10),
            ],
        );
        CollisionMap::new(ObstacleSet::new(vec![square]), SamplingPolicy::default())
    }

    #[test]
    fn test_is_blocked() {
        let map = square_map();
        assert!(map.is_blocked(Vec2Fixed::from_num(5, 5)));
        assert!(!map.is_blocked(Vec2Fixed::from_num(15, 5)));
    }

    #[test]
    fn test_path_into_square_is_blocked() {
        let map = square_map();
        assert!(map.is_path_blocked(
            Vec2Fixed::from_num(-5, 5),
            Vec2Fixed::from_num(5, 5),
            Fixed::ZERO
        ));
    }

    #[test]
    fn test_path_outside_square_is_clear() {
        let map = square_map();
        assert!(!map.is_path_blocked(
            Vec2Fixed::from_num(-5, -5),
            Vec2Fixed::from_num(-5, 20),
            Fixed::ZERO
        ));
    }

    #[test]
    fn test_path_through_square_is_blocked_even_with_clear_endpoints() {
        let map = square_map();
        assert!(map.is_path_blocked(
            Vec2Fixed::from_num(-5, 5),
            Vec2Fixed::from_num(15, 5),
            Fixed::ZERO
        ));
    }

    #[test]
    fn test_body_radius_widens_footprint() {
        let map = square_map();
        // Travels 3 px left of the square: clear as a point, blocked with a 4 px body.
        let start = Vec2Fixed::from_num(-3, -5);
        let end = Vec2Fixed::from_num(-3, 20);
        assert!(!map.is_path_blocked(start, end, Fixed::ZERO));
        assert!(map.is_path_blocked(start, end, Fixed::from_num(4)));
    }

    #[test]
    fn test_corner_probes_can_be_disabled() {
        let mut map = square_map();
        map.policy.probe_corners = false;
        let start = Vec2Fixed::from_num(-3, -5);
        let end = Vec2Fixed::from_num(-3, 20);
        assert!(!map.is_path_blocked(start, end, Fixed::from_num(4)));
    }

    #[test]
    fn test_zero_length_path_reports_point() {
        let map = square_map();
        let inside = Vec2Fixed::from_num(5, 5);
        let outside = Vec2Fixed::from_num(50, 50);
        assert!(map.is_path_blocked(inside, inside, Fixed::ZERO));
        assert!(!map.is_path_blocked(outside, outside, Fixed::from_num(3)));
    }

    #[test]
    fn test_blocked_start_short_circuits() {
        let map = square_map();
        assert!(map.is_path_blocked(
            Vec2Fixed::from_num(5, 5),
            Vec2Fixed::from_num(50, 5),
            Fixed::ZERO
        ));
    }

    #[test]
    fn test_inactive_regions_never_block() {
        let map = CollisionMap::new(
            ObstacleSet::new(vec![ObstacleRegion::new(
                "draft",
                vec![Vec2Fixed::from_num(0, 0), Vec2Fixed::from_num(100, 100)],
            )]),
            SamplingPolicy::default(),
        );
        assert!(!map.is_path_blocked(
            Vec2Fixed::from_num(0, 50),
            Vec2Fixed::from_num(100, 50),
            Fixed::from_num(5)
        ));
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let mut map = square_map();
        let previous = map.replace(ObstacleSet::default());
        assert_eq!(previous.active_count(), 1);
        assert!(!map.is_blocked(Vec2Fixed::from_num(5, 5)));
    }
}
