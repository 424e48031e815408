//! Animals that yield a product on a cooldown (cows, chickens).

use serde::{Deserialize, Serialize};

use crate::math::Millis;

/// Observable producer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProducerPhase {
    /// Product can be collected.
    Ready,
    /// Waiting out the production interval.
    Cooling {
        /// Time until ready again.
        remaining_ms: Millis,
    },
}

/// Production cooldown state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Producer {
    /// What is handed over on `produce` ("milk", "egg").
    pub product: String,
    /// Cooldown between products.
    pub production_interval_ms: Millis,
    /// Last successful production.
    pub last_produced_at: Option<Millis>,
    /// Cached readiness, refreshed every lifecycle tick.
    pub ready_to_produce: bool,
}

impl Producer {
    /// Create a producer; `last_produced_at` may come from the catalog.
    #[must_use]
    pub fn new(
        product: impl Into<String>,
        production_interval_ms: Millis,
        last_produced_at: Option<Millis>,
    ) -> Self {
        Self {
            product: product.into(),
            production_interval_ms,
            last_produced_at,
            // Refined by the first lifecycle tick once the clock is known.
            ready_to_produce: last_produced_at.is_none(),
        }
    }

    /// Readiness computed from timestamps.
    #[must_use]
    pub fn is_ready(&self, now: Millis) -> bool {
        self.last_produced_at
            .map_or(true, |t| now.saturating_sub(t) >= self.production_interval_ms)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self, now: Millis) -> ProducerPhase {
        match self.last_produced_at {
            Some(t) if !self.is_ready(now) => ProducerPhase::Cooling {
                remaining_ms: self.production_interval_ms - now.saturating_sub(t),
            },
            _ => ProducerPhase::Ready,
        }
    }

    /// Hand over the product. Re-validates readiness from timestamps, so a
    /// stale `ready_to_produce` flag can never double-produce.
    #[must_use]
    pub fn produce(&self, now: Millis) -> Option<Self> {
        if !self.is_ready(now) {
            return None;
        }
        tracing::debug!(product = %self.product, "Producer yielded product");
        Some(Self {
            last_produced_at: Some(now),
            ready_to_produce: false,
            ..self.clone()
        })
    }

    /// Refresh the cached readiness flag.
    #[must_use]
    pub fn tick(&self, now: Millis) -> Self {
        Self {
            ready_to_produce: self.is_ready(now),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_boundary() {
        let now = 100_000;
        let ready = Producer::new("milk", 5_000, Some(now - 5_000)).tick(now);
        assert!(ready.ready_to_produce);
        assert!(ready.is_ready(now));

        let cooling = Producer::new("milk", 5_000, Some(now - 4_999)).tick(now);
        assert!(!cooling.ready_to_produce);
        assert_eq!(cooling.phase(now), ProducerPhase::Cooling { remaining_ms: 1 });
    }

    #[test]
    fn test_never_produced_is_ready() {
        let producer = Producer::new("egg", 5_000, None);
        assert!(producer.ready_to_produce);
        assert_eq!(producer.phase(0), ProducerPhase::Ready);
    }

    #[test]
    fn test_produce_starts_cooldown() {
        let producer = Producer::new("egg", 5_000, None);
        let produced = producer.produce(1_000).unwrap();
        assert!(!produced.ready_to_produce);
        assert!(produced.produce(5_999).is_none());
        assert!(produced.produce(6_000).is_some());
    }

    #[test]
    fn test_stale_flag_is_revalidated() {
        let mut producer = Producer::new("egg", 5_000, Some(1_000));
        producer.ready_to_produce = true;
        assert!(producer.produce(2_000).is_none());
    }
}
