//! Entity records and storage.
//!
//! An entity is a lifecycle machine pinned to a position, optionally with a
//! mover and wander bookkeeping for animals. The [`Simulation`] owns every
//! record; the presentation layer only ever sees snapshots.
//!
//! [`Simulation`]: crate::simulation::Simulation

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lifecycle::Lifecycle;
use crate::math::Vec2Fixed;
use crate::movement::{Facing, Mover};
use crate::scheduler::TimerId;
use crate::wander::Wanderer;

/// Unique identifier for an entity.
pub type EntityId = u64;

/// Entity category, mirroring the catalog arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Plain tree.
    Tree,
    /// Tree that regrows fruit.
    FruitTree,
    /// Breakable rock.
    Rock,
    /// Crop plot.
    Crop,
    /// Wandering milk producer.
    Cow,
    /// Wandering egg producer.
    Chicken,
}

impl EntityKind {
    /// Whether entities of this kind wander.
    #[must_use]
    pub const fn wanders(self) -> bool {
        matches!(self, Self::Cow | Self::Chicken)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "tree",
            Self::FruitTree => "fruit_tree",
            Self::Rock => "rock",
            Self::Crop => "crop",
            Self::Cow => "cow",
            Self::Chicken => "chicken",
        };
        f.write_str(name)
    }
}

/// One simulated entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Catalog id, kept for display and lookups by name.
    pub label: String,
    /// Category.
    pub kind: EntityKind,
    /// Where a stationary entity stands; the spawn point of a mover.
    pub anchor: Vec2Fixed,
    /// State machine.
    pub lifecycle: Lifecycle,
    /// Present for animals.
    pub mover: Option<Mover>,
    /// Present for animals.
    pub wanderer: Option<Wanderer>,
    /// Pending end-of-walk timer.
    pub return_timer: Option<TimerId>,
}

impl Entity {
    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        self.mover.map_or(self.anchor, |m| m.current)
    }

    /// Which way the entity looks, if it can turn.
    #[must_use]
    pub fn facing(&self) -> Option<Facing> {
        self.mover.map(|m| m.facing)
    }
}

/// Entity storage with deterministic iteration support.
#[derive(Debug, Clone, Default)]
pub struct EntityStorage {
    /// Map of entity ID to entity data.
    entities: HashMap<EntityId, Entity>,
    /// Next entity ID to assign.
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its ID.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Look up an entity by its catalog label.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<&Entity> {
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| self.entities.get(&id))
            .find(|e| e.label == label)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get sorted entity IDs for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::StaticEntity;

    fn tree(label: &str) -> Entity {
        Entity {
            id: 0,
            label: label.to_string(),
            kind: EntityKind::Tree,
            anchor: Vec2Fixed::from_num(10, 20),
            lifecycle: Lifecycle::Static(StaticEntity {
                drop_items: vec!["wood".into()],
            }),
            mover: None,
            wanderer: None,
            return_timer: None,
        }
    }

    #[test]
    fn test_only_animals_wander() {
        assert!(EntityKind::Cow.wanders());
        assert!(EntityKind::Chicken.wanders());
        assert!(!EntityKind::Tree.wanders());
        assert!(!EntityKind::Crop.wanders());
    }

    #[test]
    fn test_ids_are_sequential_and_sorted() {
        let mut storage = EntityStorage::new();
        let a = storage.insert(tree("a"));
        let b = storage.insert(tree("b"));
        let c = storage.insert(tree("c"));
        assert_eq!((a, b, c), (1, 2, 3));
        storage.remove(b);
        assert_eq!(storage.sorted_ids(), vec![1, 3]);
        assert_eq!(storage.insert(tree("d")), 4);
    }

    #[test]
    fn test_find_by_label() {
        let mut storage = EntityStorage::new();
        storage.insert(tree("oak_1"));
        let id = storage.insert(tree("oak_2"));
        assert_eq!(storage.find_by_label("oak_2").map(|e| e.id), Some(id));
        assert!(storage.find_by_label("missing").is_none());
    }

    #[test]
    fn test_static_position_is_anchor() {
        assert_eq!(tree("t").position(), Vec2Fixed::from_num(10, 20));
        assert_eq!(tree("t").facing(), None);
    }
}
