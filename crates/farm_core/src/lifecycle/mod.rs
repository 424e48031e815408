//! Per-entity lifecycle state machines.
//!
//! Every transition is a pure function of (current state, `now`, action).
//! Illegal actions are rejected by returning `None` from the per-variant
//! method; [`Lifecycle::advance`] turns a rejection into "state unchanged".
//! Entities never read each other's state.

mod crop;
mod fruit;
mod producer;
mod resource_node;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::Millis;

pub use crop::{Crop, CropParams, CropPhase, DEFAULT_WITHER_AFTER_MS};
pub use fruit::FruitProducer;
pub use producer::{Producer, ProducerPhase};
pub use resource_node::{NodePhase, ResourceNode};

/// Player action on an entity, as sent by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Whatever the entity's primary action is right now.
    Use,
    /// Water (or plant) a crop.
    Water,
    /// Harvest a ripe crop.
    Harvest,
    /// Clear a planted or withered crop.
    Remove,
    /// Strike a resource node.
    Hit,
    /// Collect an animal's product.
    Produce,
    /// Shake a fruit tree.
    Shake,
    /// Chop a plain tree.
    Chop,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "use" | "interact" => Ok(Self::Use),
            "water" => Ok(Self::Water),
            "harvest" => Ok(Self::Harvest),
            "remove" => Ok(Self::Remove),
            "hit" => Ok(Self::Hit),
            "produce" => Ok(Self::Produce),
            "shake" => Ok(Self::Shake),
            "chop" => Ok(Self::Chop),
            other => Err(format!("unknown action tag '{other}'")),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Use => "use",
            Self::Water => "water",
            Self::Harvest => "harvest",
            Self::Remove => "remove",
            Self::Hit => "hit",
            Self::Produce => "produce",
            Self::Shake => "shake",
            Self::Chop => "chop",
        };
        f.write_str(tag)
    }
}

/// Trees and other fixtures with no timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEntity {
    /// Items handed over when chopped.
    pub drop_items: Vec<String>,
}

/// Flattened view of any lifecycle for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Empty crop plot.
    Unplanted,
    /// Watered crop.
    Growing {
        /// Current stage.
        stage: u8,
    },
    /// Dry crop.
    NeedsWater {
        /// Current stage.
        stage: u8,
    },
    /// Ripe crop.
    Harvestable,
    /// Dead crop.
    Withered,
    /// Standing resource node.
    Intact {
        /// Remaining hits.
        health: u32,
        /// Hits when fresh.
        max_health: u32,
    },
    /// Broken resource node.
    Destroyed,
    /// Producer ready to hand over its product.
    Ready,
    /// Producer on cooldown.
    Cooling {
        /// Time until ready.
        remaining_ms: Millis,
    },
    /// Fruit tree counter.
    Fruiting {
        /// Fruits hanging.
        fruits: u32,
        /// Cap.
        max_fruits: u32,
    },
    /// No lifecycle.
    Static,
}

/// Result of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The action that actually ran (`Use` is resolved).
    pub action: Action,
    /// State after the transition.
    pub state: Lifecycle,
    /// Items handed to the player.
    pub yields: Vec<String>,
}

/// Tagged union over every entity category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    /// Crop plot.
    Crop(Crop),
    /// Rock.
    ResourceNode(ResourceNode),
    /// Cow or chicken.
    Producer(Producer),
    /// Fruit tree.
    FruitProducer(FruitProducer),
    /// Plain tree.
    Static(StaticEntity),
}

impl Lifecycle {
    /// Whether the entity currently exists in the world. Destroyed nodes are
    /// excluded from the interactable and rendered sets.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        match self {
            Self::ResourceNode(node) => !node.is_destroyed(),
            _ => true,
        }
    }

    /// Advance time-driven transitions.
    #[must_use]
    pub fn tick(&self, now: Millis) -> Self {
        match self {
            Self::Crop(crop) => Self::Crop(crop.tick(now)),
            Self::ResourceNode(node) => Self::ResourceNode(node.tick(now)),
            Self::Producer(producer) => Self::Producer(producer.tick(now)),
            Self::FruitProducer(tree) => Self::FruitProducer(tree.tick(now)),
            Self::Static(_) => self.clone(),
        }
    }

    /// The action a bare click performs in the current state.
    #[must_use]
    pub fn primary_action(&self, now: Millis) -> Option<Action> {
        match self {
            Self::Crop(crop) => match crop.phase() {
                CropPhase::Harvestable => Some(Action::Harvest),
                CropPhase::Withered => None,
                CropPhase::Unplanted | CropPhase::NeedsWater(_) => Some(Action::Water),
                CropPhase::Growing(_) => None,
            },
            Self::ResourceNode(node) => (!node.is_destroyed()).then_some(Action::Hit),
            Self::Producer(producer) => producer.is_ready(now).then_some(Action::Produce),
            Self::FruitProducer(tree) => (tree.current_fruits > 0).then_some(Action::Shake),
            Self::Static(_) => Some(Action::Chop),
        }
    }

    /// Apply a player action. Returns `None` when the action is illegal for
    /// this entity or its current state.
    #[must_use]
    pub fn apply(&self, action: Action, now: Millis) -> Option<Applied> {
        let action = match action {
            Action::Use => self.primary_action(now)?,
            other => other,
        };

        let (state, yields) = match (self, action) {
            (Self::Crop(crop), Action::Water) => (Self::Crop(crop.water(now)?), Vec::new()),
            (Self::Crop(crop), Action::Harvest) => {
                (Self::Crop(crop.harvest()?), vec![crop.crop_type.clone()])
            }
            (Self::Crop(crop), Action::Remove) => (Self::Crop(crop.remove()?), Vec::new()),
            (Self::ResourceNode(node), Action::Hit) => {
                (Self::ResourceNode(node.hit(now)?), node.drop_items.clone())
            }
            (Self::Producer(producer), Action::Produce) => (
                Self::Producer(producer.produce(now)?),
                vec![producer.product.clone()],
            ),
            (Self::FruitProducer(tree), Action::Shake) => (
                Self::FruitProducer(tree.harvest_one(now)?),
                vec![tree.fruit_type.clone()],
            ),
            (Self::Static(fixture), Action::Chop) => (self.clone(), fixture.drop_items.clone()),
            _ => return None,
        };

        Some(Applied {
            action,
            state,
            yields,
        })
    }

    /// Tick, then apply `action` if given. A rejected action leaves the
    /// ticked state unchanged.
    #[must_use]
    pub fn advance(&self, now: Millis, action: Option<Action>) -> Self {
        let ticked = self.tick(now);
        match action {
            Some(action) => ticked
                .apply(action, now)
                .map_or(ticked, |applied| applied.state),
            None => ticked,
        }
    }

    /// Snapshot view at `now`.
    #[must_use]
    pub fn state(&self, now: Millis) -> LifecycleState {
        match self {
            Self::Crop(crop) => match crop.phase() {
                CropPhase::Unplanted => LifecycleState::Unplanted,
                CropPhase::Growing(stage) => LifecycleState::Growing { stage },
                CropPhase::NeedsWater(stage) => LifecycleState::NeedsWater { stage },
                CropPhase::Harvestable => LifecycleState::Harvestable,
                CropPhase::Withered => LifecycleState::Withered,
            },
            Self::ResourceNode(node) => match node.phase() {
                NodePhase::Intact(health) => LifecycleState::Intact {
                    health,
                    max_health: node.max_health,
                },
                NodePhase::Destroyed => LifecycleState::Destroyed,
            },
            Self::Producer(producer) => match producer.phase(now) {
                ProducerPhase::Ready => LifecycleState::Ready,
                ProducerPhase::Cooling { remaining_ms } => LifecycleState::Cooling { remaining_ms },
            },
            Self::FruitProducer(tree) => LifecycleState::Fruiting {
                fruits: tree.current_fruits,
                max_fruits: tree.max_fruits,
            },
            Self::Static(_) => LifecycleState::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop() -> Lifecycle {
        Lifecycle::Crop(Crop::unplanted(
            "type1",
            CropParams {
                max_stage: 1,
                growth_time_ms: 1_000,
                wither_after_ms: DEFAULT_WITHER_AFTER_MS,
            },
        ))
    }

    #[test]
    fn test_action_tags_parse() {
        assert_eq!("water".parse::<Action>(), Ok(Action::Water));
        assert_eq!("Harvest".parse::<Action>(), Ok(Action::Harvest));
        assert_eq!("interact".parse::<Action>(), Ok(Action::Use));
        assert!("dance".parse::<Action>().is_err());
        assert_eq!(Action::Shake.to_string(), "shake");
    }

    #[test]
    fn test_use_resolves_by_state() {
        let plot = crop();
        let watered = plot.apply(Action::Use, 0).unwrap();
        assert_eq!(watered.action, Action::Water);

        let ripe = watered.state.tick(1_000);
        assert_eq!(ripe.state(1_000), LifecycleState::Harvestable);
        let harvested = ripe.apply(Action::Use, 1_000).unwrap();
        assert_eq!(harvested.action, Action::Harvest);
        assert_eq!(harvested.yields, vec!["type1".to_string()]);
    }

    #[test]
    fn test_mismatched_action_rejected() {
        assert!(crop().apply(Action::Hit, 0).is_none());
        let tree = Lifecycle::Static(StaticEntity {
            drop_items: vec!["wood".into()],
        });
        assert!(tree.apply(Action::Water, 0).is_none());
    }

    #[test]
    fn test_advance_keeps_state_on_rejection() {
        let plot = crop();
        assert_eq!(plot.advance(0, Some(Action::Harvest)), plot);
    }

    #[test]
    fn test_advance_ticks_then_applies() {
        let node = Lifecycle::ResourceNode(ResourceNode::new(vec!["stone".into()], 1, 500));
        let broken = node.advance(0, Some(Action::Hit));
        assert!(!broken.is_present());
        // Respawn happens in the tick half of advance, then the hit lands.
        let hit_again = broken.advance(500, Some(Action::Hit));
        assert!(!hit_again.is_present());
        assert_eq!(broken.advance(500, None), node);
    }

    #[test]
    fn test_static_chop_yields_without_state_change() {
        let tree = Lifecycle::Static(StaticEntity {
            drop_items: vec!["wood".into()],
        });
        let chopped = tree.apply(Action::Use, 0).unwrap();
        assert_eq!(chopped.state, tree);
        assert_eq!(chopped.yields, vec!["wood".to_string()]);
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_string(&LifecycleState::Growing { stage: 2 }).unwrap();
        assert_eq!(json, r#"{"state":"growing","stage":2}"#);
    }
}
