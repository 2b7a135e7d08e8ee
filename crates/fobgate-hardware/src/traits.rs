//! Hardware device trait definitions.
//!
//! These traits are the contract between the access loop and the
//! peripherals: one card reader and two digital output lines. Calls are
//! synchronous; the reader call carries its own bounded wait, which is the
//! only blocking point of the loop.

use std::time::Duration;

use fobgate_core::CardUid;

use crate::error::Result;
use crate::types::{FirmwareVersion, ReaderInfo};

/// RFID/NFC card reader abstraction.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use fobgate_hardware::traits::CardReader;
/// use fobgate_hardware::error::Result;
///
/// fn wait_for_card<R: CardReader>(reader: &mut R) -> Result<String> {
///     loop {
///         if let Some(uid) = reader.read_passive_target(Duration::from_millis(500))? {
///             return Ok(uid.to_hex());
///         }
///     }
/// }
/// ```
pub trait CardReader: Send {
    /// Query the reader's firmware identity.
    ///
    /// Part of the startup handshake. Failure means the reader is not
    /// reachable and the process cannot work.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not answer or the bus fails.
    fn firmware_version(&mut self) -> Result<FirmwareVersion>;

    /// Configure the reader to detect ISO 14443A (MIFARE) cards.
    ///
    /// Must be called once after [`firmware_version`](Self::firmware_version)
    /// and before polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the configuration or the bus
    /// fails.
    fn configure(&mut self) -> Result<()>;

    /// Wait up to `timeout` for a card to enter the field.
    ///
    /// Returns `Ok(None)` when no card was presented in time. This call must
    /// not block indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport faults or malformed responses.
    fn read_passive_target(&mut self, timeout: Duration) -> Result<Option<CardUid>>;

    /// Get reader information.
    fn reader_info(&self) -> ReaderInfo;
}

/// Boolean-settable digital output (indicator light, relay, control line).
pub trait OutputLine: Send {
    /// Drive the line high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying pin cannot be written.
    fn set(&mut self, high: bool) -> Result<()>;

    /// Last level written to the line.
    fn is_set_high(&self) -> bool;

    /// Name used in log lines.
    fn name(&self) -> &str;
}
