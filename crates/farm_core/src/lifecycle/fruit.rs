//! Fruit trees: a regenerating fruit counter.

use crate::math::Millis;

/// Fruit counter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FruitProducer {
    /// What drops when the tree is shaken.
    pub fruit_type: String,
    /// Fruits currently hanging, in `0..=max_fruits`.
    pub current_fruits: u32,
    /// Cap on hanging fruit.
    pub max_fruits: u32,
    /// Time to grow one fruit.
    pub fruit_growth_time_ms: Millis,
    /// Start of the current regeneration period.
    pub last_dropped: Option<Millis>,
}

impl FruitProducer {
    /// Create a fruit tree; the current count is clamped to the cap.
    #[must_use]
    pub fn new(
        fruit_type: impl Into<String>,
        current_fruits: u32,
        max_fruits: u32,
        fruit_growth_time_ms: Millis,
        last_dropped: Option<Millis>,
    ) -> Self {
        Self {
            fruit_type: fruit_type.into(),
            current_fruits: current_fruits.min(max_fruits),
            max_fruits,
            fruit_growth_time_ms,
            last_dropped,
        }
    }

    /// Grow one fruit per elapsed growth period, up to the cap.
    ///
    /// Leftover time is carried over so regeneration does not drift with
    /// the tick cadence.
    #[must_use]
    pub fn tick(&self, now: Millis) -> Self {
        let mut next = self.clone();
        if next.current_fruits >= next.max_fruits || next.fruit_growth_time_ms == 0 {
            return next;
        }

        let Some(since) = next.last_dropped else {
            // Catalog trees below the cap start regrowing from their first tick.
            next.last_dropped = Some(now);
            return next;
        };

        let periods = now.saturating_sub(since) / next.fruit_growth_time_ms;
        if periods > 0 {
            let room = u64::from(next.max_fruits - next.current_fruits);
            let grown = periods.min(room);
            // `grown` is bounded by `room`, which came from a u32.
            next.current_fruits += u32::try_from(grown).unwrap_or(0);
            next.last_dropped = Some(since + periods * next.fruit_growth_time_ms);
        }
        next
    }

    /// Shake one fruit loose. Rejected when the tree is bare.
    #[must_use]
    pub fn harvest_one(&self, now: Millis) -> Option<Self> {
        (self.current_fruits > 0).then(|| Self {
            current_fruits: self.current_fruits - 1,
            last_dropped: Some(now),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple_tree(current: u32) -> FruitProducer {
        FruitProducer::new("apple", current, 3, 10_000, Some(0))
    }

    #[test]
    fn test_regenerates_one_per_period() {
        let tree = apple_tree(0);
        assert_eq!(tree.tick(9_999).current_fruits, 0);
        assert_eq!(tree.tick(10_000).current_fruits, 1);
        assert_eq!(tree.tick(25_000).current_fruits, 2);
    }

    #[test]
    fn test_regeneration_capped() {
        let tree = apple_tree(1).tick(1_000_000);
        assert_eq!(tree.current_fruits, 3);
    }

    #[test]
    fn test_remainder_carried_between_ticks() {
        let tree = apple_tree(0).tick(15_000);
        assert_eq!(tree.current_fruits, 1);
        assert_eq!(tree.last_dropped, Some(10_000));
        assert_eq!(tree.tick(20_000).current_fruits, 2);
    }

    #[test]
    fn test_harvest_one() {
        let tree = apple_tree(2);
        let shaken = tree.harvest_one(500).unwrap();
        assert_eq!(shaken.current_fruits, 1);
        assert_eq!(shaken.last_dropped, Some(500));
    }

    #[test]
    fn test_harvest_rejected_when_bare() {
        assert!(apple_tree(0).harvest_one(0).is_none());
    }

    #[test]
    fn test_missing_timestamp_starts_regrowth() {
        let tree = FruitProducer::new("pear", 0, 2, 1_000, None);
        let started = tree.tick(5_000);
        assert_eq!(started.current_fruits, 0);
        assert_eq!(started.last_dropped, Some(5_000));
        assert_eq!(started.tick(6_000).current_fruits, 1);
    }
}
