//! Breakable resource nodes (rocks) with timed respawn.

use serde::{Deserialize, Serialize};

use crate::math::Millis;

/// Observable node phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodePhase {
    /// Standing, with remaining health.
    Intact(u32),
    /// Broken and absent until respawn.
    Destroyed,
}

/// A node that takes a fixed number of hits, disappears, and grows back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Items dropped on every hit.
    pub drop_items: Vec<String>,
    /// Remaining health; zero means destroyed.
    pub health: u32,
    /// Health restored on respawn.
    pub max_health: u32,
    /// Delay between destruction and respawn.
    pub respawn_after_ms: Millis,
    /// When health reached zero.
    pub destroyed_at: Option<Millis>,
}

impl ResourceNode {
    /// Create an intact node at full health.
    #[must_use]
    pub fn new(drop_items: Vec<String>, max_health: u32, respawn_after_ms: Millis) -> Self {
        Self {
            drop_items,
            health: max_health,
            max_health,
            respawn_after_ms,
            destroyed_at: None,
        }
    }

    /// Check if this node is destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> NodePhase {
        if self.is_destroyed() {
            NodePhase::Destroyed
        } else {
            NodePhase::Intact(self.health)
        }
    }

    /// Take one hit. Rejected while destroyed.
    #[must_use]
    pub fn hit(&self, now: Millis) -> Option<Self> {
        if self.is_destroyed() {
            return None;
        }

        let mut next = self.clone();
        next.health -= 1;
        if next.is_destroyed() {
            tracing::debug!(respawn_after_ms = next.respawn_after_ms, "Resource node destroyed");
            next.destroyed_at = Some(now);
        }
        Some(next)
    }

    /// Respawn at full health once the delay has elapsed.
    #[must_use]
    pub fn tick(&self, now: Millis) -> Self {
        match self.destroyed_at {
            Some(at) if self.is_destroyed() && now.saturating_sub(at) >= self.respawn_after_ms => {
                tracing::debug!(health = self.max_health, "Resource node respawned");
                Self {
                    health: self.max_health,
                    destroyed_at: None,
                    ..self.clone()
                }
            }
            _ => self.clone(),
        }
    }
}
