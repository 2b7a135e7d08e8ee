//! Mock output line for testing and development.
//!
//! Clones share state, so a test can keep a clone to observe it after moving
//! the line into the access loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::debug;

use crate::{HardwareError, Result, traits::OutputLine};

/// Mock digital output line.
///
/// # Examples
///
/// ```
/// use fobgate_hardware::mock::MockLine;
/// use fobgate_hardware::traits::OutputLine;
///
/// let mut relay = MockLine::new("relay");
/// let observer = relay.clone();
///
/// relay.set(true).unwrap();
/// assert!(observer.is_set_high());
/// assert_eq!(observer.write_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockLine {
    name: String,
    level: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
    faulty: Arc<AtomicBool>,
}

impl MockLine {
    /// Create a line that starts low.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(AtomicUsize::new(0)),
            faulty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.store(faulty, Ordering::SeqCst);
    }
}

impl OutputLine for MockLine {
    fn set(&mut self, high: bool) -> Result<()> {
        if self.faulty.load(Ordering::SeqCst) {
            return Err(HardwareError::output_failed(
                self.name.clone(),
                "mock line marked faulty",
            ));
        }

        self.level.store(high, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!("{} -> {}", self.name, if high { "high" } else { "low" });
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
