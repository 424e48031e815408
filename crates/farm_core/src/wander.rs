//! Autonomous wandering for farm animals.
//!
//! Two cadences run independently: an infrequent, probabilistic decision
//! ("should I start a short walk, and where to?") and the per-frame
//! interpolation in [`crate::movement`]. The decision validates the whole
//! path up front; the frame step re-validates every increment so regions
//! replaced mid-walk are still respected.

use serde::{Deserialize, Serialize};

use crate::collision::CollisionMap;
use crate::math::{option_float_serde, Fixed, Millis, Vec2Fixed};
use crate::movement::{Facing, Mover};

/// Per-species wander tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WanderProfile {
    /// Time between decisions.
    pub decision_interval_ms: Millis,
    /// Chance, out of 100, that an idle animal starts a walk.
    pub move_chance_percent: u32,
    /// Shortest walk in world units.
    pub min_distance: u32,
    /// Longest walk in world units (inclusive).
    pub max_distance: u32,
    /// Maximum distance from the spawn origin; `None` means unconstrained.
    #[serde(default, with = "option_float_serde")]
    pub wander_radius: Option<Fixed>,
    /// Time after which a walk is ended even if the target was not reached.
    pub move_duration_ms: Millis,
    /// Distance covered per frame.
    pub step: u32,
    /// Half-width of the collision footprint.
    pub body_radius: u32,
}

impl WanderProfile {
    /// Cows: slow, deliberate, kept near their pasture.
    #[must_use]
    pub fn cow() -> Self {
        Self {
            decision_interval_ms: 2_000,
            move_chance_percent: 70,
            min_distance: 20,
            max_distance: 50,
            wander_radius: Some(Fixed::from_num(150)),
            move_duration_ms: 1_000,
            step: 1,
            body_radius: 8,
        }
    }

    /// Chickens: frequent short hops anywhere.
    #[must_use]
    pub fn chicken() -> Self {
        Self {
            decision_interval_ms: 1_000,
            move_chance_percent: 70,
            min_distance: 10,
            max_distance: 30,
            wander_radius: None,
            move_duration_ms: 500,
            step: 2,
            body_radius: 4,
        }
    }

    /// Build the mover an animal of this species starts with.
    #[must_use]
    pub fn mover_at(&self, position: Vec2Fixed, facing: Facing) -> Mover {
        Mover::new(
            position,
            facing,
            Fixed::from_num(self.step),
            Fixed::from_num(self.body_radius),
        )
    }
}

/// Simple deterministic RNG for wander decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WanderRng {
    state: u64,
}

impl WanderRng {
    /// Seed from the simulation seed and the entity id so each animal gets
    /// its own reproducible stream.
    #[must_use]
    pub fn new(seed: u64, entity: u64) -> Self {
        Self {
            state: seed
                .wrapping_add(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(entity.wrapping_mul(0xBF58_476D_1CE4_E5B9)),
        }
    }

    fn next(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(0x5851_F42D_4C95_7F2D)
            .wrapping_add(0x1405_7B7E_F767_814F);
        // Low LCG bits have short periods; use the high half.
        self.state >> 32
    }

    /// Uniform value in `0..bound` (`0` when `bound` is zero).
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Result is strictly less than a u32 bound.
        u32::try_from(self.next() % u64::from(bound)).unwrap_or(0)
    }

    /// Uniform value in `min..=max`.
    pub fn range_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.below(max - min + 1)
    }
}

/// Per-animal wander bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wanderer {
    /// Spawn point the wander radius is measured from.
    pub origin: Vec2Fixed,
    /// Species tuning.
    pub profile: WanderProfile,
    /// Decision stream.
    pub rng: WanderRng,
}

/// Why a decision did not start a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderSkip {
    /// Still walking from an earlier decision.
    Busy,
    /// Probability gate said no.
    Resting,
    /// Candidate fell outside the wander radius.
    OutOfRange,
    /// Candidate path crosses an obstacle.
    Blocked,
}

/// Outcome of one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderDecision {
    /// Walk committed toward `target`.
    Walk {
        /// Destination.
        target: Vec2Fixed,
        /// Chosen cardinal direction.
        direction: Facing,
    },
    /// No walk this time.
    Skip(WanderSkip),
}

const CARDINALS: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

impl Wanderer {
    /// Create bookkeeping for an animal spawned at `origin`.
    #[must_use]
    pub fn new(origin: Vec2Fixed, profile: WanderProfile, rng: WanderRng) -> Self {
        Self {
            origin,
            profile,
            rng,
        }
    }

    /// Whether `point` is inside this animal's allowed area.
    #[must_use]
    pub fn within_radius(&self, point: Vec2Fixed) -> bool {
        self.profile
            .wander_radius
            .map_or(true, |r| point.distance_squared(self.origin) <= r.saturating_mul(r))
    }

    /// Run one decision and, if accepted, start the walk on `mover`.
    ///
    /// Facing follows the horizontal sign of the chosen direction; vertical
    /// walks keep the previous facing.
    pub fn decide(&mut self, mover: &mut Mover, collision: &CollisionMap) -> WanderDecision {
        if mover.is_moving() {
            return WanderDecision::Skip(WanderSkip::Busy);
        }
        if self.rng.below(100) >= self.profile.move_chance_percent {
            return WanderDecision::Skip(WanderSkip::Resting);
        }

        let direction = CARDINALS[self.rng.below(4) as usize];
        let distance = self
            .rng
            .range_inclusive(self.profile.min_distance, self.profile.max_distance);
        let candidate = mover.current + direction.unit().scale(Fixed::from_num(distance));

        if !self.within_radius(candidate) {
            tracing::trace!(%distance, ?direction, "Wander candidate outside radius");
            return WanderDecision::Skip(WanderSkip::OutOfRange);
        }
        if collision.is_path_blocked(mover.current, candidate, mover.body_radius) {
            tracing::trace!(%distance, ?direction, "Wander candidate blocked");
            return WanderDecision::Skip(WanderSkip::Blocked);
        }

        mover.begin(candidate);
        if direction.is_horizontal() {
            mover.facing = direction;
        }
        WanderDecision::Walk {
            target: candidate,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::SamplingPolicy;
    use crate::geometry::{ObstacleRegion, ObstacleSet};

    fn always_moves(mut profile: WanderProfile) -> WanderProfile {
        profile.move_chance_percent = 100;
        profile
    }

    #[test]
    fn test_rng_is_reproducible() {
        let mut a = WanderRng::new(42, 7);
        let mut b = WanderRng::new(42, 7);
        let xs: Vec<u32> = (0..16).map(|_| a.below(1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.below(1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_rng_streams_differ_per_entity() {
        let mut a = WanderRng::new(42, 1);
        let mut b = WanderRng::new(42, 2);
        let xs: Vec<u32> = (0..16).map(|_| a.below(1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.below(1000)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_rng_covers_all_directions() {
        let mut rng = WanderRng::new(1, 1);
        let mut seen = [false; 4];
        for _ in 0..64 {
            seen[rng.below(4) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = WanderRng::new(9, 9);
        for _ in 0..200 {
            let v = rng.range_inclusive(10, 30);
            assert!((10..=30).contains(&v));
        }
        assert_eq!(rng.range_inclusive(5, 5), 5);
    }

    #[test]
    fn test_busy_mover_skips() {
        let profile = always_moves(WanderProfile::chicken());
        let mut wanderer = Wanderer::new(Vec2Fixed::ZERO, profile, WanderRng::new(1, 1));
        let mut mover = profile.mover_at(Vec2Fixed::ZERO, Facing::Right);
        mover.begin(Vec2Fixed::from_num(10, 0));
        let decision = wanderer.decide(&mut mover, &CollisionMap::default());
        assert_eq!(decision, WanderDecision::Skip(WanderSkip::Busy));
    }

    #[test]
    fn test_zero_chance_never_moves() {
        let mut profile = WanderProfile::chicken();
        profile.move_chance_percent = 0;
        let mut wanderer = Wanderer::new(Vec2Fixed::ZERO, profile, WanderRng::new(3, 3));
        let mut mover = profile.mover_at(Vec2Fixed::ZERO, Facing::Right);
        for _ in 0..50 {
            let decision = wanderer.decide(&mut mover, &CollisionMap::default());
            assert_eq!(decision, WanderDecision::Skip(WanderSkip::Resting));
        }
    }

    #[test]
    fn test_committed_walk_sets_target_and_facing() {
        let profile = always_moves(WanderProfile::chicken());
        let mut wanderer = Wanderer::new(Vec2Fixed::ZERO, profile, WanderRng::new(5, 5));
        let mut mover = profile.mover_at(Vec2Fixed::ZERO, Facing::Right);

        let decision = wanderer.decide(&mut mover, &CollisionMap::default());
        let WanderDecision::Walk { target, direction } = decision else {
            panic!("open field with 100% chance must walk, got {decision:?}");
        };
        assert!(mover.is_moving());
        assert_eq!(mover.target, target);
        if direction.is_horizontal() {
            assert_eq!(mover.facing, direction);
        } else {
            assert_eq!(mover.facing, Facing::Right);
        }
        let dist_sq = target.distance_squared(Vec2Fixed::ZERO);
        assert!(dist_sq >= Fixed::from_num(100) && dist_sq <= Fixed::from_num(900));
    }

    #[test]
    fn test_walks_stay_within_radius() {
        let mut profile = always_moves(WanderProfile::cow());
        profile.wander_radius = Some(Fixed::from_num(60));
        let origin = Vec2Fixed::from_num(500, 500);
        let mut wanderer = Wanderer::new(origin, profile, WanderRng::new(11, 4));
        let mut mover = profile.mover_at(origin, Facing::Left);
        let field = CollisionMap::default();
        let radius_sq = Fixed::from_num(3600);

        for _ in 0..200 {
            if let WanderDecision::Walk { .. } = wanderer.decide(&mut mover, &field) {
                while mover.is_moving() {
                    mover.step_frame(&field);
                    assert!(mover.current.distance_squared(origin) <= radius_sq);
                }
            }
        }
    }

    #[test]
    fn test_oversized_radius_does_not_overflow() {
        let mut profile = always_moves(WanderProfile::cow());
        profile.wander_radius = Some(Fixed::from_num(50_000));
        let origin = Vec2Fixed::from_num(600, 450);
        let wanderer = Wanderer::new(origin, profile, WanderRng::new(1, 1));

        assert!(wanderer.within_radius(Vec2Fixed::from_num(620, 450)));
        assert!(wanderer.within_radius(Vec2Fixed::from_num(40_000, 450)));
    }

    #[test]
    fn test_blocked_candidates_rejected() {
        // Fences start 5 px out on every side: no walk can be committed.
        let boxed_in = ObstacleSet::new(
            [(-20, -20, 40, 15), (-20, 5, 40, 15), (-20, -20, 15, 40), (5, -20, 15, 40)]
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, w, h))| {
                    ObstacleRegion::new(
                        format!("fence{i}"),
                        vec![
                            Vec2Fixed::from_num(x, y),
                            Vec2Fixed::from_num(x + w, y),
                            Vec2Fixed::from_num(x + w, y + h),
                            Vec2Fixed::from_num(x, y + h),
                        ],
                    )
                })
                .collect(),
        );
        let map = CollisionMap::new(boxed_in, SamplingPolicy::default());
        let profile = always_moves(WanderProfile::chicken());
        let mut wanderer = Wanderer::new(Vec2Fixed::ZERO, profile, WanderRng::new(2, 2));
        let mut mover = profile.mover_at(Vec2Fixed::ZERO, Facing::Right);

        for _ in 0..20 {
            let decision = wanderer.decide(&mut mover, &map);
            assert_eq!(decision, WanderDecision::Skip(WanderSkip::Blocked));
            assert!(!mover.is_moving());
        }
    }
}
