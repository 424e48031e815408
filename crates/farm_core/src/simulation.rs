//! The farm simulation context.
//!
//! [`Simulation`] owns every entity, the player, the collision map and the
//! single timer queue. It is driven entirely by injected timestamps: the
//! caller passes `now` to [`Simulation::advance_to`] and every due timer
//! fires with its own due time as `now`.
//!
//! # Determinism
//!
//! - No floating-point math in simulation state (fixed-point positions)
//! - No system randomness (wander RNG is seeded per entity from the config)
//! - Consistent iteration order (sorted entity IDs, `(due, sequence)` timers)
//! - Same inputs always produce the same [`Simulation::state_hash`]
//!
//! # Example
//!
//! ```
//! use farm_core::data::{EntityCatalog, SimulationConfig};
//! use farm_core::geometry::ObstacleSet;
//! use farm_core::lifecycle::Action;
//! use farm_core::simulation::{InteractOutcome, Simulation};
//!
//! let catalog = EntityCatalog::from_json_str(r#"{
//!     "crops": [{ "id": "plot", "position": { "x": 420, "y": 300 }, "growthTime": 5000 }]
//! }"#).unwrap();
//! let mut sim = Simulation::from_parts(
//!     SimulationConfig::default(),
//!     &catalog,
//!     ObstacleSet::default(),
//! ).unwrap();
//!
//! let plot = sim.find_by_label("plot").unwrap();
//! let outcome = sim.attempt_interact(plot, Action::Water);
//! assert!(matches!(outcome, InteractOutcome::Applied(_)));
//!
//! sim.advance_to(5_000);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::collision::CollisionMap;
use crate::data::{EntityCatalog, EntitySpec, SimulationConfig};
use crate::entity::{Entity, EntityId, EntityKind, EntityStorage};
use crate::error::{FarmError, Result};
use crate::geometry::ObstacleSet;
use crate::interaction::can_interact;
use crate::lifecycle::{Action, Lifecycle, LifecycleState};
use crate::math::{Millis, Vec2Fixed};
use crate::movement::{Facing, MoveDirection, Mover, StepOutcome};
use crate::scheduler::{Fired, Scheduler, TimerKind};
use crate::wander::{WanderDecision, WanderRng, Wanderer};

/// Why an interaction was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// No entity with that id.
    UnknownEntity,
    /// Entity exists but is currently absent (a broken rock).
    NotPresent,
    /// Player is too far away.
    OutOfRange,
    /// Action does not apply to this entity in its current state.
    IllegalAction,
}

/// An accepted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionEvent {
    /// Target entity.
    pub entity: EntityId,
    /// Target's catalog label.
    pub label: String,
    /// Target's category.
    pub kind: EntityKind,
    /// Resolved action (`Use` never appears here).
    pub action: Action,
    /// Items handed to the player.
    pub yields: Vec<String>,
    /// Target's state after the action.
    pub state: LifecycleState,
}

/// Result of [`Simulation::attempt_interact`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InteractOutcome {
    /// The action ran.
    Applied(InteractionEvent),
    /// Nothing changed.
    Rejected {
        /// Why.
        reason: Rejection,
    },
}

/// Result of [`Simulation::move_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMove {
    /// Position changed.
    Moved,
    /// Already at the world edge in that direction.
    AtBoundary,
    /// An obstacle is in the way; position unchanged.
    Blocked,
}

/// A lifecycle state change observed during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    /// Entity that changed.
    pub entity: EntityId,
    /// State before the tick.
    pub from: LifecycleState,
    /// State after the tick.
    pub to: LifecycleState,
}

/// Events generated while advancing the simulation.
///
/// These events can be used by the presentation layer to trigger effects,
/// sounds, animations, etc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickEvents {
    /// Lifecycle transitions caused by time passing.
    pub state_changes: Vec<StateChange>,
    /// Animals that started a walk.
    pub walks_started: Vec<EntityId>,
    /// Animals stopped by an obstacle mid-walk.
    pub walks_halted: Vec<EntityId>,
}

impl TickEvents {
    /// Whether nothing observable happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state_changes.is_empty() && self.walks_started.is_empty() && self.walks_halted.is_empty()
    }
}

/// Read-only view of one entity for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySnapshot {
    /// Entity id.
    pub id: EntityId,
    /// Catalog label.
    pub label: String,
    /// Category.
    pub kind: EntityKind,
    /// World position.
    pub position: Vec2Fixed,
    /// Facing, for animals.
    pub facing: Option<Facing>,
    /// Lifecycle view.
    pub state: LifecycleState,
    /// Whether the player could interact with it right now.
    pub interactable: bool,
}

/// Read-only view of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    /// World position.
    pub position: Vec2Fixed,
    /// Facing.
    pub facing: Facing,
    /// Whether a move key is held.
    pub walking: bool,
}

/// The farm simulation.
///
/// # Timer Execution Order
///
/// Timers fire strictly by `(due, sequence)`; ties at one millisecond go to
/// whichever timer was (re)scheduled first. Handlers:
/// 1. **Frame** - every mover advances one step (sorted entity ids)
/// 2. **Lifecycle** - one entity's time-driven transitions
/// 3. **Wander** - one animal's walk decision
/// 4. **ReturnToIdle** - one-shot walk timeout
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    now: Millis,
    entities: EntityStorage,
    player: Mover,
    player_walking: bool,
    collision: CollisionMap,
    scheduler: Scheduler,
}

impl Simulation {
    /// Create an empty world at time zero.
    #[must_use]
    pub fn new(config: SimulationConfig, obstacles: ObstacleSet) -> Self {
        let player = Mover::new(
            config.player.spawn,
            Facing::Down,
            config.player.speed,
            config.player.body_radius,
        );
        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(config.frame_ms, config.frame_ms, TimerKind::Frame);

        Self {
            collision: CollisionMap::new(obstacles, config.sampling),
            config,
            now: 0,
            entities: EntityStorage::new(),
            player,
            player_walking: false,
            scheduler,
        }
    }

    /// Validate the config and catalog, then build a populated world.
    pub fn from_parts(
        config: SimulationConfig,
        catalog: &EntityCatalog,
        obstacles: ObstacleSet,
    ) -> Result<Self> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(FarmError::InvalidState(problems.join("; ")));
        }
        let specs = catalog.to_specs(config.wither_after_ms)?;

        let mut sim = Self::new(config, obstacles);
        for spec in specs {
            sim.spawn(spec);
        }
        tracing::info!(
            entities = sim.entities.len(),
            obstacles = sim.collision.obstacles().active_count(),
            "Simulation initialized"
        );
        Ok(sim)
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Collision service.
    #[must_use]
    pub const fn collision(&self) -> &CollisionMap {
        &self.collision
    }

    /// Pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Number of entities, present or not.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Resolve a catalog label to an entity id.
    #[must_use]
    pub fn find_by_label(&self, label: &str) -> Option<EntityId> {
        self.entities.find_by_label(label).map(|e| e.id)
    }

    /// Add an entity and start its timers.
    pub fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        let profile = spec.kind.wanders().then(|| match spec.kind {
            EntityKind::Chicken => self.config.chicken,
            _ => self.config.cow,
        });
        let needs_ticks = !matches!(spec.lifecycle, Lifecycle::Static(_));

        let id = self.entities.insert(Entity {
            id: 0,
            label: spec.label,
            kind: spec.kind,
            anchor: spec.position,
            lifecycle: spec.lifecycle.tick(self.now),
            mover: profile.map(|p| p.mover_at(spec.position, spec.facing.unwrap_or_default())),
            wanderer: None,
            return_timer: None,
        });

        if needs_ticks {
            let period = self.config.lifecycle_tick_ms;
            self.scheduler
                .schedule_every(self.now.saturating_add(period), period, TimerKind::Lifecycle(id));
        }
        if let Some(profile) = profile {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.wanderer = Some(Wanderer::new(
                    spec.position,
                    profile,
                    WanderRng::new(self.config.seed, id),
                ));
            }
            let period = profile.decision_interval_ms;
            self.scheduler
                .schedule_every(self.now.saturating_add(period), period, TimerKind::Wander(id));
        }

        tracing::debug!(id, kind = %spec.kind, "Spawned entity");
        id
    }

    /// Remove an entity and cancel every timer it owns.
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity> {
        let entity = self.entities.remove(id).ok_or(FarmError::EntityNotFound(id))?;
        let cancelled = self.scheduler.cancel_owner(id);
        tracing::debug!(id, cancelled, "Despawned entity");
        Ok(entity)
    }

    /// Swap the obstacle snapshot; returns the old one.
    ///
    /// Takes effect for the next collision query. Walks already in progress
    /// are re-validated frame by frame against the new set.
    pub fn replace_obstacles(&mut self, obstacles: ObstacleSet) -> ObstacleSet {
        self.collision.replace(obstacles)
    }

    /// Fire every timer due at or before `now`, in order.
    ///
    /// Time never moves backwards: an earlier `now` fires nothing.
    pub fn advance_to(&mut self, now: Millis) -> TickEvents {
        let mut events = TickEvents::default();
        if now < self.now {
            tracing::warn!(now, current = self.now, "Ignoring advance into the past");
            return events;
        }

        while let Some(fired) = self.scheduler.pop_due(now) {
            self.now = fired.due;
            self.fire(fired, &mut events);
        }
        self.now = now;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(now = self.now, state_hash = hash, "Simulation state hash");
        }

        events
    }

    fn fire(&mut self, fired: Fired, events: &mut TickEvents) {
        match fired.kind {
            TimerKind::Frame => self.run_frame(events),
            TimerKind::Lifecycle(id) => self.run_lifecycle_tick(id, events),
            TimerKind::Wander(id) => self.run_wander_decision(id, events),
            TimerKind::ReturnToIdle(id) => {
                if let Some(entity) = self.entities.get_mut(id) {
                    if let Some(mover) = entity.mover.as_mut() {
                        mover.halt();
                    }
                    entity.return_timer = None;
                }
            }
        }
    }

    fn run_frame(&mut self, events: &mut TickEvents) {
        for id in self.entities.sorted_ids() {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            let Some(mover) = entity.mover.as_mut() else {
                continue;
            };
            match mover.step_frame(&self.collision) {
                StepOutcome::Halted => {
                    events.walks_halted.push(id);
                    if let Some(timer) = entity.return_timer.take() {
                        self.scheduler.cancel(timer);
                    }
                }
                StepOutcome::Arrived => {
                    if let Some(timer) = entity.return_timer.take() {
                        self.scheduler.cancel(timer);
                    }
                }
                StepOutcome::Idle | StepOutcome::Advanced => {}
            }
        }
    }

    fn run_lifecycle_tick(&mut self, id: EntityId, events: &mut TickEvents) {
        let now = self.now;
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let before = entity.lifecycle.state(now);
        entity.lifecycle = entity.lifecycle.tick(now);
        let after = entity.lifecycle.state(now);
        // Producer cooldowns count down every tick; only report phase changes.
        if std::mem::discriminant(&before) != std::mem::discriminant(&after)
            || phase_detail_changed(before, after)
        {
            events.state_changes.push(StateChange {
                entity: id,
                from: before,
                to: after,
            });
        }
    }

    fn run_wander_decision(&mut self, id: EntityId, events: &mut TickEvents) {
        let due = self.now;
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let (Some(mover), Some(wanderer)) = (entity.mover.as_mut(), entity.wanderer.as_mut())
        else {
            return;
        };

        if let WanderDecision::Walk { target, .. } = wanderer.decide(mover, &self.collision) {
            tracing::trace!(id, x = %target.x, y = %target.y, "Wander walk started");
            let duration = wanderer.profile.move_duration_ms;
            if let Some(old) = entity.return_timer.take() {
                self.scheduler.cancel(old);
            }
            entity.return_timer = Some(
                self.scheduler
                    .schedule_once(due.saturating_add(duration), TimerKind::ReturnToIdle(id)),
            );
            events.walks_started.push(id);
        }
    }

    /// Try to perform `action` on an entity on behalf of the player.
    ///
    /// The entity's timers are brought up to `now` first, then the
    /// presence, range and legality checks run in that order. A rejection
    /// never changes state.
    pub fn attempt_interact(&mut self, id: EntityId, action: Action) -> InteractOutcome {
        let now = self.now;
        let radius = self.config.interaction_radius;
        let actor = self.player.current;

        let Some(entity) = self.entities.get_mut(id) else {
            return reject(Rejection::UnknownEntity);
        };
        entity.lifecycle = entity.lifecycle.tick(now);

        if !entity.lifecycle.is_present() {
            return reject(Rejection::NotPresent);
        }
        if !can_interact(entity.position(), actor, radius) {
            return reject(Rejection::OutOfRange);
        }
        let Some(applied) = entity.lifecycle.apply(action, now) else {
            tracing::trace!(id, %action, "Interaction rejected");
            return reject(Rejection::IllegalAction);
        };

        entity.lifecycle = applied.state;
        tracing::debug!(id, action = %applied.action, yields = ?applied.yields, "Interaction applied");
        InteractOutcome::Applied(InteractionEvent {
            entity: id,
            label: entity.label.clone(),
            kind: entity.kind,
            action: applied.action,
            yields: applied.yields,
            state: entity.lifecycle.state(now),
        })
    }

    /// Move the player one step in `direction`.
    ///
    /// The step is clamped to the world bounds and validated against the
    /// collision map with the player's footprint. Facing follows the
    /// dominant axis even when the move is refused.
    pub fn move_player(&mut self, direction: MoveDirection) -> PlayerMove {
        let delta = direction.displacement(self.player.step);
        if let Some(facing) = Facing::from_delta(delta) {
            self.player.facing = facing;
        }
        self.player_walking = true;

        let current = self.player.current;
        let target = self.config.player.bounds.clamp(current + delta);
        if target == current {
            return PlayerMove::AtBoundary;
        }
        if self
            .collision
            .is_path_blocked(current, target, self.player.body_radius)
        {
            tracing::trace!(?direction, "Player move blocked");
            return PlayerMove::Blocked;
        }

        self.player.current = target;
        self.player.target = target;
        PlayerMove::Moved
    }

    /// Release the move keys.
    pub fn stop_player(&mut self) {
        self.player_walking = false;
        self.player.halt();
    }

    /// Player view.
    #[must_use]
    pub fn player(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.player.current,
            facing: self.player.facing,
            walking: self.player_walking,
        }
    }

    /// Views of every present entity, sorted by id.
    #[must_use]
    pub fn snapshots(&self) -> Vec<EntitySnapshot> {
        let radius = self.config.interaction_radius;
        self.entities
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.entities.get(id))
            .filter(|e| e.lifecycle.is_present())
            .map(|e| EntitySnapshot {
                id: e.id,
                label: e.label.clone(),
                kind: e.kind,
                position: e.position(),
                facing: e.facing(),
                state: e.lifecycle.state(self.now),
                interactable: can_interact(e.position(), self.player.current, radius),
            })
            .collect()
    }

    /// Compute a hash of the current simulation state.
    ///
    /// Two simulations fed the same config, catalog, obstacles and command
    /// timeline produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.now.hash(&mut hasher);
        hash_position(self.player.current, &mut hasher);
        self.player.facing.hash(&mut hasher);

        let ids = self.entities.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            if let Some(entity) = self.entities.get(id) {
                id.hash(&mut hasher);
                hash_position(entity.position(), &mut hasher);
                entity.facing().hash(&mut hasher);
                entity.lifecycle.state(self.now).hash(&mut hasher);
                entity.lifecycle.is_present().hash(&mut hasher);
                if let Some(wanderer) = &entity.wanderer {
                    wanderer.rng.hash(&mut hasher);
                }
            }
        }

        hasher.finish()
    }
}

fn reject(reason: Rejection) -> InteractOutcome {
    InteractOutcome::Rejected { reason }
}

fn hash_position(position: Vec2Fixed, hasher: &mut DefaultHasher) {
    position.x.to_bits().hash(hasher);
    position.y.to_bits().hash(hasher);
}

fn phase_detail_changed(before: LifecycleState, after: LifecycleState) -> bool {
    match (before, after) {
        (LifecycleState::Cooling { .. }, LifecycleState::Cooling { .. }) => false,
        _ => before != after,
    }
}
