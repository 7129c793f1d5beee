//! Day-scaled trigger chances.

use serde::{Deserialize, Serialize};

use crate::game::GameError;

/// A percentage that grows linearly with the day count and is clamped to
/// `[floor_pct, cap_pct]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChanceCurve {
    /// Percentage points gained per elapsed day.
    pub per_day_pct: f64,
    /// Lowest chance, used on day 0.
    pub floor_pct: f64,
    /// Highest chance, reached once `per_day_pct * day` passes it.
    pub cap_pct: f64,
}

impl ChanceCurve {
    pub const fn new(per_day_pct: f64, floor_pct: f64, cap_pct: f64) -> Self {
        ChanceCurve {
            per_day_pct,
            floor_pct,
            cap_pct,
        }
    }

    /// Curve used for lethality: +10 points a day.
    pub const fn fatality() -> Self {
        ChanceCurve::new(10.0, 1.0, 20.0)
    }

    /// Curve used for feasts: +5 points a day.
    pub const fn feast() -> Self {
        ChanceCurve::new(5.0, 1.0, 20.0)
    }

    /// Chance in percent for `day`. Never leaves `[0, 100]`.
    pub fn percent(&self, day: u32) -> f64 {
        (self.per_day_pct * day as f64)
            .max(self.floor_pct)
            .min(self.cap_pct)
            .clamp(0.0, 100.0)
    }

    /// Chance as a probability in `[0, 1]`.
    pub fn probability(&self, day: u32) -> f64 {
        self.percent(day) / 100.0
    }

    /// First day on which the cap is reached, if it ever is.
    pub fn saturation_day(&self) -> Option<u32> {
        if self.per_day_pct <= 0.0 {
            return (self.floor_pct >= self.cap_pct).then_some(0);
        }
        Some((self.cap_pct / self.per_day_pct).ceil() as u32)
    }

    pub fn validate(&self, name: &str) -> Result<(), GameError> {
        let values = [self.per_day_pct, self.floor_pct, self.cap_pct];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GameError::InvalidConfiguration(format!(
                "{} curve has a non-finite value",
                name
            )));
        }
        if self.per_day_pct < 0.0 {
            return Err(GameError::InvalidConfiguration(format!(
                "{} curve slope must not be negative",
                name
            )));
        }
        if !(0.0..=100.0).contains(&self.floor_pct) || !(0.0..=100.0).contains(&self.cap_pct) {
            return Err(GameError::InvalidConfiguration(format!(
                "{} curve bounds must lie within 0..=100",
                name
            )));
        }
        if self.floor_pct > self.cap_pct {
            return Err(GameError::InvalidConfiguration(format!(
                "{} curve floor {} exceeds cap {}",
                name, self.floor_pct, self.cap_pct
            )));
        }
        Ok(())
    }
}
