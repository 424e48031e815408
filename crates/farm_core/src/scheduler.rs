//! Single authoritative timer queue keyed by simulation time.
//!
//! Every periodic behaviour (frame interpolation, lifecycle ticks, wander
//! decisions) and every one-shot (return-to-idle) lives here, so cancelling
//! an entity's work is one call and the firing order is reproducible.
//!
//! Timers fire in `(due, sequence)` order. The sequence number is assigned
//! on every push, so timers due at the same millisecond fire in the order
//! they were (re)scheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::math::Millis;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimerKind {
    /// Global interpolation step for every mover.
    Frame,
    /// Lifecycle tick for one entity.
    Lifecycle(EntityId),
    /// Wander decision for one animal.
    Wander(EntityId),
    /// End of an animal's current walk.
    ReturnToIdle(EntityId),
}

impl TimerKind {
    /// Entity that owns the timer, if any.
    #[must_use]
    pub const fn owner(self) -> Option<EntityId> {
        match self {
            Self::Frame => None,
            Self::Lifecycle(id) | Self::Wander(id) | Self::ReturnToIdle(id) => Some(id),
        }
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    /// Handle of the timer.
    pub id: TimerId,
    /// What to do.
    pub kind: TimerKind,
    /// Simulation time the timer was due; handlers run with `now = due`.
    pub due: Millis,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    period: Option<Millis>,
}

/// Deterministic min-heap of timers.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<(Millis, u64, TimerId)>>,
    live: HashMap<TimerId, Timer>,
    next_id: u64,
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Millis, id: TimerId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((due, seq, id)));
    }

    fn register(&mut self, due: Millis, kind: TimerKind, period: Option<Millis>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.live.insert(id, Timer { kind, period });
        self.push(due, id);
        id
    }

    /// Fire once at `due`.
    pub fn schedule_once(&mut self, due: Millis, kind: TimerKind) -> TimerId {
        self.register(due, kind, None)
    }

    /// Fire at `first_due` and then every `period` ms until cancelled.
    /// A zero period is treated as 1 ms.
    pub fn schedule_every(&mut self, first_due: Millis, period: Millis, kind: TimerKind) -> TimerId {
        self.register(first_due, kind, Some(period.max(1)))
    }

    /// Cancel a timer. Cancelling an unknown or already-fired timer is a
    /// no-op; returns whether anything was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id).is_some()
    }

    /// Cancel every timer owned by `entity`; returns how many were live.
    pub fn cancel_owner(&mut self, entity: EntityId) -> usize {
        let before = self.live.len();
        self.live.retain(|_, timer| timer.kind.owner() != Some(entity));
        before - self.live.len()
    }

    /// Whether `id` is still pending.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Pop the next timer due at or before `until`.
    ///
    /// Periodic timers are pushed back at `due + period` before returning,
    /// so a handler may cancel them. A periodic timer whose next due time
    /// would pass `Millis::MAX` fires once more and is then dropped. Stale
    /// entries of cancelled timers are discarded on the way.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired> {
        loop {
            let Reverse((due, _, id)) = *self.queue.peek()?;
            if due > until {
                return None;
            }
            self.queue.pop();

            let Some(timer) = self.live.get(&id).copied() else {
                continue;
            };
            match timer.period.and_then(|period| due.checked_add(period)) {
                Some(next) => self.push(next, id),
                None => {
                    self.live.remove(&id);
                }
            }
            return Some(Fired {
                id,
                kind: timer.kind,
                due,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until: Millis) -> Vec<(Millis, TimerKind)> {
        std::iter::from_fn(|| scheduler.pop_due(until))
            .map(|f| (f.due, f.kind))
            .collect()
    }

    #[test]
    fn test_fires_in_due_then_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_once(20, TimerKind::Lifecycle(2));
        s.schedule_once(10, TimerKind::Lifecycle(1));
        s.schedule_once(20, TimerKind::Wander(3));

        assert_eq!(
            drain(&mut s, 100),
            vec![
                (10, TimerKind::Lifecycle(1)),
                (20, TimerKind::Lifecycle(2)),
                (20, TimerKind::Wander(3)),
            ]
        );
        assert!(s.is_empty());
    }

    #[test]
    fn test_nothing_fires_before_due() {
        let mut s = Scheduler::new();
        s.schedule_once(50, TimerKind::Frame);
        assert!(s.pop_due(49).is_none());
        assert_eq!(s.len(), 1);
        assert!(s.pop_due(50).is_some());
    }

    #[test]
    fn test_periodic_timer_reschedules() {
        let mut s = Scheduler::new();
        s.schedule_every(16, 16, TimerKind::Frame);
        let fired: Vec<Millis> = drain(&mut s, 64).into_iter().map(|(due, _)| due).collect();
        assert_eq!(fired, vec![16, 32, 48, 64]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = Scheduler::new();
        let id = s.schedule_once(10, TimerKind::ReturnToIdle(1));
        assert!(s.is_scheduled(id));
        assert!(s.cancel(id));
        assert!(!s.is_scheduled(id));
        assert!(!s.cancel(id));
        assert!(s.pop_due(100).is_none());
    }

    #[test]
    fn test_cancelled_periodic_timer_stops() {
        let mut s = Scheduler::new();
        let id = s.schedule_every(10, 10, TimerKind::Lifecycle(7));
        assert!(s.pop_due(10).is_some());
        s.cancel(id);
        assert!(s.pop_due(1_000).is_none());
    }

    #[test]
    fn test_cancel_owner_leaves_other_timers() {
        let mut s = Scheduler::new();
        s.schedule_every(0, 16, TimerKind::Frame);
        s.schedule_every(0, 1_000, TimerKind::Lifecycle(4));
        s.schedule_every(0, 2_000, TimerKind::Wander(4));
        s.schedule_once(500, TimerKind::ReturnToIdle(4));
        s.schedule_every(0, 1_000, TimerKind::Lifecycle(5));

        assert_eq!(s.cancel_owner(4), 3);
        assert_eq!(s.cancel_owner(4), 0);
        let owners: Vec<Option<EntityId>> =
            drain(&mut s, 0).into_iter().map(|(_, k)| k.owner()).collect();
        assert_eq!(owners, vec![None, Some(5)]);
    }

    #[test]
    fn test_zero_period_does_not_spin() {
        let mut s = Scheduler::new();
        s.schedule_every(0, 0, TimerKind::Frame);
        assert_eq!(drain(&mut s, 3).len(), 4);
    }

    #[test]
    fn test_periodic_timer_at_end_of_time_is_dropped() {
        let mut s = Scheduler::new();
        let id = s.schedule_every(Millis::MAX - 5, 16, TimerKind::Frame);

        assert_eq!(drain(&mut s, Millis::MAX), vec![(Millis::MAX - 5, TimerKind::Frame)]);
        assert!(!s.is_scheduled(id));
        assert!(s.is_empty());
    }
}
