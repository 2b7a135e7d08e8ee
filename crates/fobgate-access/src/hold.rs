//! Timed hold for one output signal.
//!
//! An accepted card arms the hold and the level goes high. The level drops
//! on the first "no card" check at or after the hold duration, measured
//! from the *first* arm:
//!
//! ```text
//!            arm (t0)        arm (t1, ignored)         check, now - t0 >= hold
//! OFF ----------------> HOLDING --------------> HOLDING ----------------------> OFF
//! ```
//!
//! The armed-at timestamp is a latch. It is set once and never moved or
//! cleared, so after the first expiry any later "no card" check releases
//! the output immediately and a new accepted card re-raises it only until
//! the next empty poll.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Observable state of a [`HoldOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldState {
    /// Level low.
    Off,

    /// Level high, waiting for expiry.
    Holding,
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldState::Off => write!(f, "Off"),
            HoldState::Holding => write!(f, "Holding"),
        }
    }
}

/// Level plus first-arm timestamp for one output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldOutput {
    level: bool,
    armed_at: Option<Instant>,
    hold: Duration,
}

impl HoldOutput {
    /// Create an output that starts low and unarmed.
    pub fn new(hold: Duration) -> Self {
        Self {
            level: false,
            armed_at: None,
            hold,
        }
    }

    /// Raise the level. Records `now` only if the output was never armed.
    pub fn arm(&mut self, now: Instant) {
        self.level = true;
        if self.armed_at.is_none() {
            self.armed_at = Some(now);
        }
    }

    /// Apply the expiry rule for a "no card" poll.
    ///
    /// Returns `true` if the level changed from high to low.
    pub fn check_expiry(&mut self, now: Instant) -> bool {
        let expired = match self.armed_at {
            None => true,
            Some(armed_at) => now.saturating_duration_since(armed_at) >= self.hold,
        };

        if !expired {
            return false;
        }

        let was_high = self.level;
        self.level = false;
        was_high
    }

    /// Force the level low without touching the latch.
    pub fn release(&mut self) {
        self.level = false;
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub fn armed_at(&self) -> Option<Instant> {
        self.armed_at
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn state(&self) -> HoldState {
        if self.level {
            HoldState::Holding
        } else {
            HoldState::Off
        }
    }
}
