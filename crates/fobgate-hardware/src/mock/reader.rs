//! Mock card reader implementation for testing and development.
//!
//! The reader is driven through a [`MockReaderHandle`] that queues poll
//! results. Each call to `read_passive_target` consumes one queued result,
//! or reports "no card" if nothing arrives within the poll timeout.

use std::sync::mpsc;
use std::time::Duration;

use fobgate_core::CardUid;

use crate::{
    HardwareError, Result,
    traits::CardReader,
    types::{FirmwareVersion, ReaderInfo},
};

/// Firmware reported by a mock reader unless overridden.
pub const MOCK_FIRMWARE: FirmwareVersion = FirmwareVersion {
    ic: 0x32,
    version: 1,
    revision: 6,
    support: 0x07,
};

/// Mock card reader for testing and development.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fobgate_core::CardUid;
/// use fobgate_hardware::mock::MockReader;
/// use fobgate_hardware::traits::CardReader;
///
/// # fn main() -> fobgate_hardware::Result<()> {
/// let (mut reader, handle) = MockReader::new();
/// reader.configure()?;
///
/// let uid = CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap();
/// handle.present_card(uid.clone())?;
/// handle.no_card()?;
///
/// let timeout = Duration::from_millis(10);
/// assert_eq!(reader.read_passive_target(timeout)?, Some(uid));
/// assert_eq!(reader.read_passive_target(timeout)?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockReader {
    /// Channel receiver for poll results
    event_rx: mpsc::Receiver<ReaderEvent>,

    /// Device name
    name: String,

    /// Firmware answered during the handshake
    firmware: FirmwareVersion,

    /// Set once `configure` has been called
    configured: bool,

    /// Number of `read_passive_target` calls so far
    polls: u64,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// queues what subsequent polls will see.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock PN532")
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel();

        let reader = Self {
            event_rx,
            name: name.into(),
            firmware: MOCK_FIRMWARE,
            configured: false,
            polls: 0,
        };

        (reader, MockReaderHandle { event_tx })
    }

    /// Override the firmware identity returned by the handshake.
    pub fn with_firmware(mut self, firmware: FirmwareVersion) -> Self {
        self.firmware = firmware;
        self
    }

    /// Whether `configure` has been called.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Number of polls performed.
    pub fn poll_count(&self) -> u64 {
        self.polls
    }
}

impl CardReader for MockReader {
    fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        Ok(self.firmware)
    }

    fn configure(&mut self) -> Result<()> {
        self.configured = true;
        Ok(())
    }

    fn read_passive_target(&mut self, timeout: Duration) -> Result<Option<CardUid>> {
        if !self.configured {
            return Err(HardwareError::initialization_failed(
                "Reader polled before SAM configuration",
            ));
        }

        self.polls += 1;

        match self.event_rx.recv_timeout(timeout) {
            Ok(ReaderEvent::CardPresented(uid)) => Ok(Some(uid)),
            Ok(ReaderEvent::NoCard) => Ok(None),
            Ok(ReaderEvent::Fault(message)) => Err(HardwareError::communication(message)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(HardwareError::disconnected(self.name.clone()))
            }
        }
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::new(self.name.clone(), "mock")
    }
}

/// Internal event type for mock card reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    CardPresented(CardUid),
    NoCard,
    Fault(String),
}

/// Handle for controlling a mock card reader.
///
/// Dropping every handle disconnects the reader: once the queue is drained,
/// the next poll fails with [`HardwareError::Disconnected`].
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    /// Channel sender for poll results
    event_tx: mpsc::Sender<ReaderEvent>,
}

impl MockReaderHandle {
    /// Queue a poll that sees `uid` in the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub fn present_card(&self, uid: CardUid) -> Result<()> {
        self.send(ReaderEvent::CardPresented(uid))
    }

    /// Queue a poll that returns immediately with no card.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub fn no_card(&self) -> Result<()> {
        self.send(ReaderEvent::NoCard)
    }

    /// Queue a poll that fails with a communication error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub fn fail(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Fault(message.into()))
    }

    fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .map_err(|_| HardwareError::disconnected("Mock reader dropped"))
    }
}
