//! Core constants for the fobgate badge reader.
//!
//! Timing windows, identifier bounds and the compiled-in allowlist live
//! here so every crate in the workspace agrees on them.
//!
//! # Usage
//!
//! ```
//! use fobgate_core::constants::*;
//! use std::time::Duration;
//!
//! let hold = Duration::from_millis(HOLD_DURATION_MS);
//! assert_eq!(hold.as_secs(), 2);
//! ```

// ============================================================================
// Timing
// ============================================================================

/// Bounded wait for a single reader poll (milliseconds).
///
/// The poll is the only blocking point of the control loop, so this value
/// also bounds how quickly an expired hold is released.
///
/// # Value: 500ms
pub const POLL_TIMEOUT_MS: u64 = 500;

/// How long the indicator and relay stay on after a card is accepted
/// (milliseconds).
///
/// Measured from the first time the outputs were armed.
///
/// # Value: 2000ms
pub const HOLD_DURATION_MS: u64 = 2000;

/// Minimum gap between two card reads for the second to count as a new
/// presentation (milliseconds).
///
/// # Value: 2000ms
pub const DEBOUNCE_WINDOW_MS: u64 = 2000;

// ============================================================================
// Card Identifier Constraints
// ============================================================================

/// Minimum card UID length in bytes.
pub const MIN_UID_LENGTH: usize = 1;

/// Maximum card UID length in bytes (triple-size ISO 14443 UID).
pub const MAX_UID_LENGTH: usize = 10;

// ============================================================================
// Allowlist
// ============================================================================

/// Cards allowed to trigger the outputs, compiled into the binary.
///
/// Each entry is a label and the raw UID bytes as reported by the reader.
///
/// # Examples
///
/// ```
/// use fobgate_core::constants::DEFAULT_ALLOWLIST;
///
/// let (label, uid) = DEFAULT_ALLOWLIST[0];
/// assert_eq!(label, "Blue keyfob");
/// assert_eq!(uid, &[0x63, 0xDD, 0x46, 0x1C]);
/// ```
pub const DEFAULT_ALLOWLIST: &[(&str, &[u8])] = &[
    ("Blue keyfob", &[0x63, 0xDD, 0x46, 0x1C]),
    ("White card", &[0xDD, 0xCE, 0x96, 0x38]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_windows_are_consistent() {
        assert!(POLL_TIMEOUT_MS < HOLD_DURATION_MS);
        assert_eq!(HOLD_DURATION_MS, DEBOUNCE_WINDOW_MS);
    }

    #[test]
    fn test_default_allowlist_entries_fit_bounds() {
        for (label, uid) in DEFAULT_ALLOWLIST {
            assert!(!label.is_empty());
            assert!((MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&uid.len()));
        }
    }
}
