//! Access decision and output timing.
//!
//! The controller turns one poll result into a decision and the next pair
//! of output levels. It owns all mutable loop state: one [`HoldOutput`]
//! per signal and the [`Debounce`] window.
//!
//! # Per-poll flow
//!
//! ```text
//! None ---------------------------------------------> expiry check (both)
//! Some(uid) -> debounce -- suppressed -------------> no change
//!                       `- fresh -> validate -- Accepted -> arm (both)
//!                                            `- Rejected -> no change
//! ```
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use fobgate_access::{AccessConfig, AccessController, Outcome};
//! use fobgate_access::clock::ManualClock;
//! use fobgate_core::{AllowList, CardUid};
//!
//! let allowlist = AllowList::builtin().unwrap();
//! let clock = ManualClock::new();
//! let mut controller = AccessController::new(allowlist, &AccessConfig::default(), clock.clone());
//!
//! let blue = CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap();
//! let outcome = controller.handle_poll(Some(blue));
//! assert!(matches!(outcome, Outcome::Accepted { .. }));
//! assert!(controller.levels().relay);
//!
//! clock.advance(Duration::from_secs(2));
//! controller.handle_poll(None);
//! assert!(!controller.levels().relay);
//! ```

use std::fmt;

use fobgate_core::{AllowList, CardUid, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::AccessConfig;
use crate::debounce::Debounce;
use crate::hold::HoldOutput;

/// What the controller did with one poll result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// No card in the field; hold expiry was checked.
    Absent,

    /// Card read inside the debounce window; ignored.
    Debounced { uid: CardUid },

    /// Fresh read of an allowlisted card; outputs armed.
    Accepted {
        uid: CardUid,
        index: usize,
        label: Option<String>,
    },

    /// Fresh read of an unknown card.
    Rejected { uid: CardUid },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Absent => write!(f, "absent"),
            Outcome::Debounced { uid } => write!(f, "debounced {uid}"),
            Outcome::Accepted { uid, label, .. } => match label {
                Some(label) => write!(f, "accepted {uid} ({label})"),
                None => write!(f, "accepted {uid}"),
            },
            Outcome::Rejected { uid } => write!(f, "rejected {uid}"),
        }
    }
}

/// Levels to write to the output lines after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputLevels {
    pub indicator: bool,
    pub relay: bool,
}

/// Allowlist, hold outputs and debounce window for one reader.
#[derive(Debug)]
pub struct AccessController<C> {
    allowlist: AllowList,
    indicator: HoldOutput,
    relay: HoldOutput,
    debounce: Debounce,
    clock: C,
}

impl<C: Clock> AccessController<C> {
    pub fn new(allowlist: AllowList, config: &AccessConfig, clock: C) -> Self {
        Self {
            allowlist,
            indicator: HoldOutput::new(config.hold_duration),
            relay: HoldOutput::new(config.hold_duration),
            debounce: Debounce::new(config.debounce_window),
            clock,
        }
    }

    /// Process one poll result.
    pub fn handle_poll(&mut self, read: Option<CardUid>) -> Outcome {
        let now = self.clock.now();

        let Some(uid) = read else {
            let indicator_off = self.indicator.check_expiry(now);
            let relay_off = self.relay.check_expiry(now);
            if indicator_off || relay_off {
                debug!("Hold expired, outputs released");
            }
            return Outcome::Absent;
        };

        if !self.debounce.register(now) {
            debug!("Ignoring repeated read of {}", uid);
            return Outcome::Debounced { uid };
        }

        info!("Found card with UID: {}", uid);

        match self.allowlist.validate(&uid) {
            Verdict::Accepted { index } => {
                let label = self
                    .allowlist
                    .entry(index)
                    .and_then(|entry| entry.label.clone());
                match &label {
                    Some(label) => info!("Valid card found: {}", label),
                    None => info!("Valid card found"),
                }

                self.indicator.arm(now);
                self.relay.arm(now);
                Outcome::Accepted { uid, index, label }
            }
            Verdict::Rejected => {
                info!("Invalid card found");
                Outcome::Rejected { uid }
            }
        }
    }

    /// Drive both outputs low, leaving the latches in place.
    pub fn release_all(&mut self) {
        self.indicator.release();
        self.relay.release();
    }

    pub fn levels(&self) -> OutputLevels {
        OutputLevels {
            indicator: self.indicator.level(),
            relay: self.relay.level(),
        }
    }

    pub fn indicator(&self) -> &HoldOutput {
        &self.indicator
    }

    pub fn relay(&self) -> &HoldOutput {
        &self.relay
    }

    pub fn debounce(&self) -> &Debounce {
        &self.debounce
    }

    pub fn allowlist(&self) -> &AllowList {
        &self.allowlist
    }
}
