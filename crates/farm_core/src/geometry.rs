//! Obstacle polygons and the point-in-polygon test.
//!
//! Obstacle regions are authored as named, closed polygons in world pixel
//! coordinates. A region with fewer than three points is treated as "not yet
//! defined" and takes no part in collision tests.

use serde::{Deserialize, Serialize};

use crate::error::{FarmError, Result};
use crate::math::Vec2Fixed;

/// Minimum number of points for a region to block movement.
pub const MIN_ACTIVE_POINTS: usize = 3;

/// Even-odd crossing-number test.
///
/// Casts a horizontal ray from `point` toward +x and counts edge crossings.
/// Edges use the half-open rule `(yi > p.y) != (yj > p.y)`, so a vertex lying
/// exactly on the ray is counted once. A consequence worth knowing: for an
/// axis-aligned square, points on the left and top edges report inside and
/// points on the right and bottom edges report outside.
///
/// The caller must pass at least three points.
#[must_use]
pub fn point_in_polygon(point: Vec2Fixed, polygon: &[Vec2Fixed]) -> bool {
    debug_assert!(polygon.len() >= MIN_ACTIVE_POINTS);

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];

        if (pi.y > point.y) != (pj.y > point.y) {
            let crossing_x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

/// A named closed polygon that blocks movable entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleRegion {
    /// Author-facing name ("farmhouse", "pond", ...).
    pub name: String,
    /// Ordered outline; the closing edge back to the first point is implicit.
    #[serde(default)]
    pub points: Vec<Vec2Fixed>,
}

impl ObstacleRegion {
    /// Create a region from its outline.
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<Vec2Fixed>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Whether the region has enough points to take part in collision tests.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.points.len() >= MIN_ACTIVE_POINTS
    }

    /// Containment test; inactive regions contain nothing.
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        self.is_active() && point_in_polygon(point, &self.points)
    }
}

/// The full set of obstacle regions, in the authored file format
/// `{ "areas": [{ "name": ..., "points": [{ "x": .., "y": .. }] }] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSet {
    /// All regions, active or not.
    #[serde(default)]
    pub areas: Vec<ObstacleRegion>,
}

impl ObstacleSet {
    /// Create a set from a list of regions.
    #[must_use]
    pub fn new(areas: Vec<ObstacleRegion>) -> Self {
        Self { areas }
    }

    /// Parse the authored JSON format.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ObstacleParse`] if the text is not a valid area file.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FarmError::ObstacleParse)
    }

    /// Export in the authored JSON format.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::ObstacleParse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(FarmError::ObstacleParse)
    }

    /// Iterate over the regions that take part in collision tests.
    pub fn active(&self) -> impl Iterator<Item = &ObstacleRegion> {
        self.areas.iter().filter(|area| area.is_active())
    }

    /// Number of active regions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}
