//! The poll loop.
//!
//! One iteration: poll the reader (bounded wait), print a progress dot,
//! hand the result to the controller, write the resulting levels to the
//! output lines. The loop runs until the stop flag is raised or a hardware
//! fault occurs; either way both lines are driven low before returning.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use fobgate_hardware::{CardReader, OutputLine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::AccessConfig;
use crate::controller::{AccessController, Outcome, OutputLevels};
use crate::error::Result;
use crate::poller::ReaderPoller;

/// Counters for one run of the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub polls: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub debounced: u64,
}

impl RunStats {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            polls: 0,
            accepted: 0,
            rejected: 0,
            debounced: 0,
        }
    }

    fn record(&mut self, outcome: &Outcome) {
        self.polls += 1;
        match outcome {
            Outcome::Absent => {}
            Outcome::Debounced { .. } => self.debounced += 1,
            Outcome::Accepted { .. } => self.accepted += 1,
            Outcome::Rejected { .. } => self.rejected += 1,
        }
    }
}

/// Poller, controller and the two output lines.
#[derive(Debug)]
pub struct AccessRunner<R, L, C> {
    poller: ReaderPoller<R>,
    controller: AccessController<C>,
    indicator: L,
    relay: L,
    progress_dots: bool,
    stats: RunStats,
}

impl<R, L, C> AccessRunner<R, L, C>
where
    R: CardReader,
    L: OutputLine,
    C: Clock,
{
    pub fn new(
        poller: ReaderPoller<R>,
        controller: AccessController<C>,
        indicator: L,
        relay: L,
        config: &AccessConfig,
    ) -> Self {
        Self {
            poller,
            controller,
            indicator,
            relay,
            progress_dots: config.progress_dots,
            stats: RunStats::new(),
        }
    }

    /// Run one iteration of the loop.
    ///
    /// # Errors
    ///
    /// Returns the reader or output fault that interrupted the iteration.
    pub fn step(&mut self) -> Result<Outcome> {
        let read = self.poller.poll()?;

        if self.progress_dots {
            print!(".");
            let _ = io::stdout().flush();
        }

        let outcome = self.controller.handle_poll(read);
        self.stats.record(&outcome);
        self.apply(self.controller.levels())?;

        Ok(outcome)
    }

    /// Iterate until `stop` is raised, then release both outputs.
    ///
    /// # Errors
    ///
    /// Returns the first hardware fault. Outputs are still driven low on
    /// a best-effort basis before returning it.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<RunStats> {
        while !stop.load(Ordering::SeqCst) {
            if let Err(e) = self.step() {
                if let Err(release) = self.release_outputs() {
                    warn!("Failed to release outputs after fault: {}", release);
                }
                return Err(e);
            }
        }

        warn!("Stop requested, releasing outputs");
        self.release_outputs()?;

        info!(
            "Stopped after {} polls: {} accepted, {} rejected, {} ignored",
            self.stats.polls, self.stats.accepted, self.stats.rejected, self.stats.debounced
        );
        Ok(self.stats.clone())
    }

    /// Drive both output lines low.
    ///
    /// # Errors
    ///
    /// Returns an error if a line cannot be written.
    pub fn release_outputs(&mut self) -> Result<()> {
        self.controller.release_all();
        self.indicator.set(false)?;
        self.relay.set(false)?;
        Ok(())
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn controller(&self) -> &AccessController<C> {
        &self.controller
    }

    fn apply(&mut self, levels: OutputLevels) -> Result<()> {
        for (line, level) in [
            (&mut self.indicator, levels.indicator),
            (&mut self.relay, levels.relay),
        ] {
            if line.is_set_high() != level {
                debug!("Setting {} {}", line.name(), if level { "high" } else { "low" });
                line.set(level)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use fobgate_core::{AllowList, CardUid};
    use fobgate_hardware::mock::{MockLine, MockReader, MockReaderHandle};
    use std::time::Duration;

    type TestRunner = AccessRunner<MockReader, MockLine, ManualClock>;

    fn runner() -> (TestRunner, MockReaderHandle, MockLine, MockLine) {
        let config = AccessConfig {
            poll_timeout: Duration::from_millis(5),
            progress_dots: false,
            ..AccessConfig::default()
        };
        let (reader, handle) = MockReader::new();
        let mut poller = ReaderPoller::new(reader, config.poll_timeout);
        poller.initialize().unwrap();

        let controller =
            AccessController::new(AllowList::builtin().unwrap(), &config, ManualClock::new());
        let indicator = MockLine::new("indicator");
        let relay = MockLine::new("relay");
        let runner = AccessRunner::new(
            poller,
            controller,
            indicator.clone(),
            relay.clone(),
            &config,
        );
        (runner, handle, indicator, relay)
    }

    #[test]
    fn test_step_drives_lines_on_change_only() {
        let (mut runner, handle, indicator, relay) = runner();

        handle
            .present_card(CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap())
            .unwrap();
        assert!(runner.step().unwrap().is_accepted());
        assert!(indicator.is_set_high());
        assert!(relay.is_set_high());

        // Still within the hold window.
        runner.step().unwrap();
        runner.step().unwrap();
        assert_eq!(relay.write_count(), 1);
        assert_eq!(runner.stats().polls, 3);
        assert_eq!(runner.stats().accepted, 1);
    }

    #[test]
    fn test_run_stops_and_releases() {
        let (mut runner, handle, indicator, relay) = runner();
        handle
            .present_card(CardUid::new(vec![0xDD, 0xCE, 0x96, 0x38]).unwrap())
            .unwrap();
        runner.step().unwrap();
        assert!(relay.is_set_high());

        let stop = AtomicBool::new(true);
        let stats = runner.run(&stop).unwrap();

        assert!(!indicator.is_set_high());
        assert!(!relay.is_set_high());
        assert_eq!(stats.accepted, 1);
    }

    #[test]
    fn test_run_propagates_fault_and_releases() {
        let (mut runner, handle, _indicator, relay) = runner();
        handle
            .present_card(CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap())
            .unwrap();
        handle.fail("remote I/O error").unwrap();

        let stop = AtomicBool::new(false);
        let err = runner.run(&stop).unwrap_err();

        assert!(err.to_string().contains("remote I/O error"));
        assert!(!relay.is_set_high());
    }

    #[test]
    fn test_output_fault_is_fatal() {
        let (mut runner, handle, _indicator, relay) = runner();
        relay.set_faulty(true);
        handle
            .present_card(CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap())
            .unwrap();

        assert!(runner.step().is_err());
    }

    #[test]
    fn test_run_stats_serialization() {
        let (runner, _handle, _indicator, _relay) = runner();
        let json = serde_json::to_value(runner.stats()).unwrap();
        assert_eq!(json["polls"], 0);
        assert!(json["started_at"].is_string());
    }
}
