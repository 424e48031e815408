//! Crop growth, watering and withering.

use serde::{Deserialize, Serialize};

use crate::math::Millis;

/// Reference time a planted crop may go unwatered before it withers.
pub const DEFAULT_WITHER_AFTER_MS: Millis = 300_000;

/// Per-crop timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParams {
    /// Final growth stage; reaching it makes the crop harvestable.
    pub max_stage: u8,
    /// Time from a watering until the next stage advance.
    pub growth_time_ms: Millis,
    /// Time since the last watering after which the crop withers.
    pub wither_after_ms: Millis,
}

/// Observable crop phase, derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropPhase {
    /// Empty plot.
    Unplanted,
    /// Watered and growing toward the next stage.
    Growing(u8),
    /// Planted but dry; growth is paused.
    NeedsWater(u8),
    /// At `max_stage` and ready to harvest.
    Harvestable,
    /// Dead from neglect until removed.
    Withered,
}

/// Crop lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crop {
    /// What the plot yields on harvest (`type1`, `type2`, ...).
    pub crop_type: String,
    /// Timing parameters.
    pub params: CropParams,
    /// Current stage in `0..=max_stage`.
    pub growth_stage: u8,
    /// First watering of the current planting.
    pub planted_at: Option<Millis>,
    /// Most recent watering.
    pub last_watered_at: Option<Millis>,
    /// Whether the crop has water for its current stage.
    pub watered: bool,
    /// Sticky until `remove`.
    pub withered: bool,
    /// Implies `growth_stage == params.max_stage`.
    pub harvestable: bool,
}

impl Crop {
    /// An empty plot.
    #[must_use]
    pub fn unplanted(crop_type: impl Into<String>, params: CropParams) -> Self {
        Self {
            crop_type: crop_type.into(),
            params,
            growth_stage: 0,
            planted_at: None,
            last_watered_at: None,
            watered: false,
            withered: false,
            harvestable: false,
        }
    }

    /// Derive the current phase.
    #[must_use]
    pub fn phase(&self) -> CropPhase {
        if self.withered {
            CropPhase::Withered
        } else if self.harvestable {
            CropPhase::Harvestable
        } else if self.planted_at.is_none() {
            CropPhase::Unplanted
        } else if self.watered {
            CropPhase::Growing(self.growth_stage)
        } else {
            CropPhase::NeedsWater(self.growth_stage)
        }
    }

    /// Water the plot, planting it if empty.
    ///
    /// Rejected when the crop is withered, harvestable, or already watered,
    /// so watering twice in a row is the same as watering once.
    #[must_use]
    pub fn water(&self, now: Millis) -> Option<Self> {
        if self.withered || self.harvestable || self.watered {
            return None;
        }
        Some(Self {
            watered: true,
            last_watered_at: Some(now),
            planted_at: self.planted_at.or(Some(now)),
            ..self.clone()
        })
    }

    /// Advance timers: the wither check runs first, then growth.
    #[must_use]
    pub fn tick(&self, now: Millis) -> Self {
        let mut next = self.clone();

        if next.should_wither(now) {
            tracing::debug!(stage = next.growth_stage, "Crop withered");
            next.withered = true;
            next.watered = false;
            next.harvestable = false;
            return next;
        }

        let growth_due = next
            .last_watered_at
            .is_some_and(|t| now.saturating_sub(t) >= next.params.growth_time_ms);
        if next.watered
            && !next.withered
            && !next.harvestable
            && next.growth_stage < next.params.max_stage
            && growth_due
        {
            next.growth_stage += 1;
            if next.growth_stage == next.params.max_stage {
                tracing::debug!(stage = next.growth_stage, "Crop ripened");
                next.harvestable = true;
            } else {
                next.watered = false;
            }
        }

        next
    }

    /// Harvest a ripe crop, returning the plot to its unplanted baseline.
    #[must_use]
    pub fn harvest(&self) -> Option<Self> {
        self.harvestable
            .then(|| Self::unplanted(self.crop_type.clone(), self.params))
    }

    /// Clear a planted plot (withered or not) back to its unplanted baseline.
    #[must_use]
    pub fn remove(&self) -> Option<Self> {
        (self.planted_at.is_some() || self.withered)
            .then(|| Self::unplanted(self.crop_type.clone(), self.params))
    }

    fn should_wither(&self, now: Millis) -> bool {
        if self.withered || self.planted_at.is_none() {
            return false;
        }
        self.last_watered_at
            .or(self.planted_at)
            .is_some_and(|t| now.saturating_sub(t) > self.params.wither_after_ms)
    }
}
