//! Proximity gate for player interactions.

use crate::math::{Fixed, Vec2Fixed};

/// Reference interaction radius in world pixels.
pub const DEFAULT_INTERACTION_RADIUS: i32 = 100;

/// True iff the actor is strictly within `radius` of the entity.
///
/// Compared on squared distance so no square root is taken.
#[must_use]
pub fn can_interact(entity: Vec2Fixed, actor: Vec2Fixed, radius: Fixed) -> bool {
    entity.distance_squared(actor) < radius.saturating_mul(radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius() -> Fixed {
        Fixed::from_num(DEFAULT_INTERACTION_RADIUS)
    }

    #[test]
    fn test_within_radius() {
        assert!(can_interact(
            Vec2Fixed::from_num(100, 100),
            Vec2Fixed::from_num(150, 170),
            radius()
        ));
    }

    #[test]
    fn test_exactly_on_radius_is_excluded() {
        // 60² + 80² = 100²
        assert!(!can_interact(
            Vec2Fixed::from_num(0, 0),
            Vec2Fixed::from_num(60, 80),
            radius()
        ));
    }

    #[test]
    fn test_far_beyond_world_limit_is_out_of_range() {
        assert!(!can_interact(
            Vec2Fixed::from_num(50_000, 300),
            Vec2Fixed::from_num(400, 300),
            radius()
        ));
        assert!(!can_interact(
            Vec2Fixed::from_num(-2_000_000, 0),
            Vec2Fixed::from_num(2_000_000, 0),
            Fixed::from_num(60_000)
        ));
    }

    #[test]
    fn test_far_away() {
        assert!(!can_interact(
            Vec2Fixed::from_num(0, 0),
            Vec2Fixed::from_num(500, 0),
            radius()
        ));
    }
}
