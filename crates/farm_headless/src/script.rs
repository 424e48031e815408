//! Scripted sessions.
//!
//! A script is a RON file of timestamped player actions. Running it gives
//! the same responses every time, which makes scripts usable as regression
//! scenarios and determinism checks.
//!
//! ```ron
//! (
//!     name: "water_and_wait",
//!     steps: [
//!         (at_ms: 0, action: Interact(target: "crop_1", action: water)),
//!         (at_ms: 500, action: Move(up_left)),
//!         (at_ms: 1000, action: Query),
//!     ],
//!     until_ms: Some(60000),
//! )
//! ```

use farm_core::lifecycle::Action;
use farm_core::math::Millis;
use farm_core::movement::MoveDirection;
use serde::{Deserialize, Serialize};

use crate::protocol::{default_action, Command, EntityRef};

/// A named, timestamped list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Display name for logs.
    pub name: String,
    /// Actions in any order; runs sort them by time.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
    /// Advance to this time after the last step.
    #[serde(default)]
    pub until_ms: Option<Millis>,
}

/// One action at one time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Simulation time the action happens at.
    pub at_ms: Millis,
    /// What the player does.
    pub action: ScriptAction,
}

/// Player actions a script can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptAction {
    /// One player step.
    Move(MoveDirection),
    /// Release the move keys.
    Stop,
    /// Act on an entity.
    Interact {
        /// Target.
        target: EntityRef,
        /// Action; the entity's primary action when omitted.
        #[serde(default = "default_action")]
        action: Action,
    },
    /// Remove an entity.
    Despawn(EntityRef),
    /// Record the full state.
    Query,
    /// Record the state hash.
    Hash,
}

impl From<ScriptAction> for Command {
    fn from(action: ScriptAction) -> Self {
        match action {
            ScriptAction::Move(direction) => Self::Move { direction },
            ScriptAction::Stop => Self::Stop,
            ScriptAction::Interact { target, action } => Self::Interact { target, action },
            ScriptAction::Despawn(target) => Self::Despawn { target },
            ScriptAction::Query => Self::Query,
            ScriptAction::Hash => Self::Hash,
        }
    }
}

impl Script {
    /// Parse a script from RON.
    pub fn from_ron_str(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Steps ordered by time; steps sharing a time keep file order.
    #[must_use]
    pub fn ordered_steps(&self) -> Vec<&ScriptStep> {
        let mut steps: Vec<&ScriptStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.at_ms);
        steps
    }
}
