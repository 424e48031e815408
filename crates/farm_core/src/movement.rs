//! Movable entities: facing, idle/moving state and per-frame interpolation.
//!
//! The player and every wandering animal share [`Mover`]. A mover only ever
//! travels in a straight line toward its target, one fixed step per frame,
//! and re-checks each step against the collision service.

use serde::{Deserialize, Serialize};

use crate::collision::CollisionMap;
use crate::math::{Fixed, Vec2Fixed};

/// Which way a mover is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Toward -y.
    Up,
    /// Toward +y.
    #[default]
    Down,
    /// Toward -x.
    Left,
    /// Toward +x.
    Right,
}

impl Facing {
    /// Facing of the dominant axis of `delta`; `None` for a zero vector.
    /// Horizontal wins ties.
    #[must_use]
    pub fn from_delta(delta: Vec2Fixed) -> Option<Self> {
        if delta == Vec2Fixed::ZERO {
            return None;
        }
        if delta.x.abs() >= delta.y.abs() {
            Some(if delta.x > Fixed::ZERO { Self::Right } else { Self::Left })
        } else {
            Some(if delta.y > Fixed::ZERO { Self::Down } else { Self::Up })
        }
    }

    /// Unit vector for the four cardinal directions.
    #[must_use]
    pub fn unit(self) -> Vec2Fixed {
        match self {
            Self::Up => Vec2Fixed::from_num(0, -1),
            Self::Down => Vec2Fixed::from_num(0, 1),
            Self::Left => Vec2Fixed::from_num(-1, 0),
            Self::Right => Vec2Fixed::from_num(1, 0),
        }
    }

    /// Whether this is a left/right facing.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementState {
    /// Standing still; `current == target`.
    #[default]
    Idle,
    /// Travelling; `current != target`.
    Moving,
}

/// Eight-way player move intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// -y
    Up,
    /// +y
    Down,
    /// -x
    Left,
    /// +x
    Right,
    /// -x -y
    UpLeft,
    /// +x -y
    UpRight,
    /// -x +y
    DownLeft,
    /// +x +y
    DownRight,
}

/// Scale applied to each axis of a diagonal move so it covers roughly the
/// same distance as a cardinal one.
pub const DIAGONAL_FACTOR: f64 = 0.707;

impl MoveDirection {
    /// Displacement for one move of `speed` units.
    #[must_use]
    pub fn displacement(self, speed: Fixed) -> Vec2Fixed {
        let (dx, dy): (i32, i32) = match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::UpLeft => (-1, -1),
            Self::UpRight => (1, -1),
            Self::DownLeft => (-1, 1),
            Self::DownRight => (1, 1),
        };
        let axis = if dx != 0 && dy != 0 {
            speed * Fixed::from_num(DIAGONAL_FACTOR)
        } else {
            speed
        };
        Vec2Fixed::new(axis * Fixed::from_num(dx), axis * Fixed::from_num(dy))
    }
}

/// Result of one interpolation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not moving; nothing happened.
    Idle,
    /// Moved one step and is still travelling.
    Advanced,
    /// Reached the target and went idle.
    Arrived,
    /// Next step was blocked; halted in place.
    Halted,
}

/// Shared position/movement record for the player and wanderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mover {
    /// Where the entity is.
    pub current: Vec2Fixed,
    /// Where it is heading; equals `current` when idle.
    pub target: Vec2Fixed,
    /// Which way it looks.
    pub facing: Facing,
    /// Idle or moving.
    pub state: MovementState,
    /// Distance covered per frame.
    #[serde(with = "crate::math::float_serde")]
    pub step: Fixed,
    /// Half-width of the collision footprint.
    #[serde(with = "crate::math::float_serde")]
    pub body_radius: Fixed,
}

impl Mover {
    /// An idle mover at `position`.
    #[must_use]
    pub fn new(position: Vec2Fixed, facing: Facing, step: Fixed, body_radius: Fixed) -> Self {
        Self {
            current: position,
            target: position,
            facing,
            state: MovementState::Idle,
            step,
            body_radius,
        }
    }

    /// Whether the mover is mid-travel.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.state == MovementState::Moving
    }

    /// Start travelling toward `target`. A target equal to the current
    /// position leaves the mover idle.
    pub fn begin(&mut self, target: Vec2Fixed) {
        if target == self.current {
            self.halt();
            return;
        }
        self.target = target;
        self.state = MovementState::Moving;
    }

    /// Stop where it stands.
    pub fn halt(&mut self) {
        self.target = self.current;
        self.state = MovementState::Idle;
    }

    /// Advance one frame toward the target, re-validating the increment.
    ///
    /// A blocked increment halts the mover in place; it does not retry or
    /// reroute.
    pub fn step_frame(&mut self, collision: &CollisionMap) -> StepOutcome {
        if !self.is_moving() {
            return StepOutcome::Idle;
        }

        let next = self.current.step_towards(self.target, self.step);
        if collision.is_path_blocked(self.current, next, self.body_radius) {
            tracing::trace!(x = %self.current.x, y = %self.current.y, "Mover halted by obstacle");
            self.halt();
            return StepOutcome::Halted;
        }

        self.current = next;
        if self.current == self.target {
            self.state = MovementState::Idle;
            StepOutcome::Arrived
        } else {
            StepOutcome::Advanced
        }
    }
}
