//! Timing configuration for the access loop.

use std::time::Duration;

use fobgate_core::constants::{DEBOUNCE_WINDOW_MS, HOLD_DURATION_MS, POLL_TIMEOUT_MS};
use fobgate_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Access loop configuration.
///
/// Built from the compiled-in constants; there is no file or flag layer.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fobgate_access::AccessConfig;
///
/// let config = AccessConfig::default();
/// assert_eq!(config.poll_timeout, Duration::from_millis(500));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Bounded wait for each reader poll.
    pub poll_timeout: Duration,

    /// How long outputs stay high after the first accepted card.
    pub hold_duration: Duration,

    /// Minimum gap between reads for a read to count as fresh.
    pub debounce_window: Duration,

    /// Print a dot to stdout after every poll.
    pub progress_dots: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(POLL_TIMEOUT_MS),
            hold_duration: Duration::from_millis(HOLD_DURATION_MS),
            debounce_window: Duration::from_millis(DEBOUNCE_WINDOW_MS),
            progress_dots: true,
        }
    }
}

impl AccessConfig {
    /// Check that the loop can make progress with these values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero poll timeout or hold duration.
    pub fn validate(&self) -> Result<()> {
        if self.poll_timeout.is_zero() {
            return Err(Error::Config("poll timeout must be non-zero".into()));
        }
        if self.hold_duration.is_zero() {
            return Err(Error::Config("hold duration must be non-zero".into()));
        }
        Ok(())
    }
}
