//! Phase sequencing.
//!
//! Tracks the elapsed day count and the day/night flag, and derives the
//! phase label used to look up events.
//!
//! Phase flow:
//! - Bloodbath (day 0) -> Night
//! - Night            -> Day (day + 1)
//! - Day              -> Night

use std::fmt;

use serde::{Deserialize, Serialize};

/// The phase a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseLabel {
    Bloodbath,
    Day,
    Night,
}

impl PhaseLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            PhaseLabel::Bloodbath => "bloodbath",
            PhaseLabel::Day => "day",
            PhaseLabel::Night => "night",
        }
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day counter plus day/night flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    day: u32,
    is_daytime: bool,
}

impl Default for PhaseClock {
    fn default() -> Self {
        PhaseClock::new()
    }
}

impl PhaseClock {
    /// A clock sitting on the bloodbath.
    pub const fn new() -> Self {
        PhaseClock {
            day: 0,
            is_daytime: true,
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn is_daytime(&self) -> bool {
        self.is_daytime
    }

    pub fn current_phase(&self) -> PhaseLabel {
        match (self.day, self.is_daytime) {
            (0, true) => PhaseLabel::Bloodbath,
            (_, true) => PhaseLabel::Day,
            (_, false) => PhaseLabel::Night,
        }
    }

    /// Moves to the next phase and returns it. The day count only grows on
    /// the night -> day edge.
    pub fn advance(&mut self) -> PhaseLabel {
        self.is_daytime = !self.is_daytime;
        if self.is_daytime {
            self.day += 1;
        }
        self.current_phase()
    }
}
