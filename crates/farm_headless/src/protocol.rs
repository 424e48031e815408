//! JSON protocol for headless farm sessions.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and state
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","now":0,"entities":6}
//! -> {"cmd":"interact","target":"crop_1","action":"water"}
//! <- {"type":"interaction","now":0,"outcome":{"outcome":"applied",...}}
//! -> {"cmd":"wait","ms":10000}
//! <- {"type":"events","now":10000,"events":{"state_changes":[...],...}}
//! -> {"cmd":"move","direction":"up_left"}
//! <- {"type":"player_moved","result":"moved","player":{...}}
//! -> {"cmd":"query"}
//! <- {"type":"state","now":10000,"player":{...},"entities":[...],"hash":...}
//! ```

use std::fmt;
use std::path::PathBuf;

use farm_core::entity::EntityId;
use farm_core::lifecycle::Action;
use farm_core::math::Millis;
use farm_core::movement::MoveDirection;
use farm_core::simulation::{
    EntitySnapshot, InteractOutcome, PlayerMove, PlayerSnapshot, TickEvents,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// An entity reference: numeric id or catalog label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    /// Simulation entity id.
    Id(EntityId),
    /// Catalog label.
    Label(String),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance simulation time to an absolute timestamp.
    Advance {
        /// Target time.
        to_ms: Millis,
    },

    /// Advance simulation time by a duration.
    Wait {
        /// Duration.
        ms: Millis,
    },

    /// Move the player one step.
    Move {
        /// Eight-way direction.
        direction: MoveDirection,
    },

    /// Release the move keys.
    Stop,

    /// Act on an entity.
    Interact {
        /// Target.
        target: EntityRef,
        /// Action; defaults to the entity's primary action.
        #[serde(default = "default_action")]
        action: Action,
    },

    /// Remove an entity.
    Despawn {
        /// Target.
        target: EntityRef,
    },

    /// Hot-replace the obstacle set from an area file.
    LoadObstacles {
        /// Obstacle JSON file.
        path: PathBuf,
    },

    /// Query current state without advancing time.
    Query,

    /// Request the state hash.
    Hash,

    /// End the session.
    Quit,
}

pub(crate) fn default_action() -> Action {
    Action::Use
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Simulation time.
        now: Millis,
        /// Entities loaded.
        entities: usize,
    },

    /// Acknowledgment of a command.
    Ack {
        /// Command name.
        cmd: String,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command name, when the line parsed.
        cmd: Option<String>,
    },

    /// Events produced by advancing time.
    Events {
        /// Simulation time after the advance.
        now: Millis,
        /// What happened.
        events: TickEvents,
    },

    /// Result of an interaction.
    Interaction {
        /// Simulation time.
        now: Millis,
        /// Applied or rejected.
        outcome: InteractOutcome,
    },

    /// Result of a player move.
    PlayerMoved {
        /// Moved, blocked or at the boundary.
        result: PlayerMove,
        /// Player after the move.
        player: PlayerSnapshot,
    },

    /// Current world state.
    State {
        /// Simulation time.
        now: Millis,
        /// Player view.
        player: PlayerSnapshot,
        /// Every present entity.
        entities: Vec<EntitySnapshot>,
        /// Determinism hash.
        hash: u64,
    },

    /// State hash for determinism verification.
    StateHash {
        /// Simulation time.
        now: Millis,
        /// Hash.
        hash: u64,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(now: Millis, entities: usize) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            now,
            entities,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Wait { .. } => "wait",
            Self::Move { .. } => "move",
            Self::Stop => "stop",
            Self::Interact { .. } => "interact",
            Self::Despawn { .. } => "despawn",
            Self::LoadObstacles { .. } => "load_obstacles",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}
