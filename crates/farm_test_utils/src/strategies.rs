//! Proptest strategies for farm types.

use farm_core::lifecycle::Action;
use farm_core::math::{Fixed, Vec2Fixed};
use farm_core::movement::MoveDirection;
use farm_core::wander::WanderProfile;
use proptest::prelude::*;

/// Integer world point inside `-extent..=extent` on both axes.
pub fn arb_point(extent: i32) -> impl Strategy<Value = Vec2Fixed> {
    (-extent..=extent, -extent..=extent).prop_map(|(x, y)| Vec2Fixed::from_num(x, y))
}

/// Arbitrary (possibly self-intersecting) polygon with 3 to `max_points`
/// vertices.
pub fn arb_polygon(max_points: usize) -> impl Strategy<Value = Vec<Vec2Fixed>> {
    prop::collection::vec(arb_point(200), 3..=max_points.max(3))
}

/// Any of the eight player move directions.
pub fn arb_move_direction() -> impl Strategy<Value = MoveDirection> {
    prop_oneof![
        Just(MoveDirection::Up),
        Just(MoveDirection::Down),
        Just(MoveDirection::Left),
        Just(MoveDirection::Right),
        Just(MoveDirection::UpLeft),
        Just(MoveDirection::UpRight),
        Just(MoveDirection::DownLeft),
        Just(MoveDirection::DownRight),
    ]
}

/// Any player action tag.
pub fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Use),
        Just(Action::Water),
        Just(Action::Harvest),
        Just(Action::Remove),
        Just(Action::Hit),
        Just(Action::Produce),
        Just(Action::Shake),
        Just(Action::Chop),
    ]
}

/// Wander profile that always tries to move, with a bounded radius.
pub fn arb_bounded_profile() -> impl Strategy<Value = WanderProfile> {
    (10u32..=200, 1u32..=40, 0u32..=60, 1u32..=5, 0u32..=8).prop_map(
        |(radius, min, extra, step, body)| WanderProfile {
            decision_interval_ms: 1_000,
            move_chance_percent: 100,
            min_distance: min,
            max_distance: min + extra,
            wander_radius: Some(Fixed::from_num(radius)),
            move_duration_ms: 1_000,
            step,
            body_radius: body,
        },
    )
}
