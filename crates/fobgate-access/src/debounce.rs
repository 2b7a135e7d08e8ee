//! Suppression of repeated reads.
//!
//! A card held against the reader is reported on every poll. Only a read
//! that comes at least one window after the previous read (of any card)
//! counts as a new presentation.

use std::time::{Duration, Instant};

/// Last-read timestamp and window length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    last: Option<Instant>,
    window: Duration,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { last: None, window }
    }

    /// Record a read at `now` and report whether it is fresh.
    ///
    /// The timestamp is updated on every call, so a card left on the
    /// reader keeps pushing the window forward and is never re-reported.
    pub fn register(&mut self, now: Instant) -> bool {
        let fresh = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        self.last = Some(now);
        fresh
    }

    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
