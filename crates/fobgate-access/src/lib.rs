//! Access decision loop for a single badge reader.
//!
//! [`ReaderPoller`] asks the reader for a card with a bounded wait,
//! [`AccessController`] decides what the read means, and [`AccessRunner`]
//! writes the resulting levels to the indicator and relay lines:
//!
//! ```text
//! ReaderPoller -> AccessController -> OutputLine (indicator, relay)
//! ```
//!
//! Time comes from a [`Clock`](clock::Clock) so tests can drive the hold
//! and debounce windows without sleeping.

pub mod clock;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod hold;
pub mod poller;
pub mod runner;

pub use config::AccessConfig;
pub use controller::{AccessController, Outcome, OutputLevels};
pub use error::{Error, Result};
pub use poller::ReaderPoller;
pub use runner::{AccessRunner, RunStats};
