//! Reader handshake and bounded polling.

use std::time::Duration;

use fobgate_core::CardUid;
use fobgate_hardware::{CardReader, FirmwareVersion, Result};
use tracing::info;

/// Thin wrapper that owns the reader and the poll timeout.
#[derive(Debug)]
pub struct ReaderPoller<R> {
    reader: R,
    timeout: Duration,
}

impl<R: CardReader> ReaderPoller<R> {
    pub fn new(reader: R, timeout: Duration) -> Self {
        Self { reader, timeout }
    }

    /// Run the startup handshake: firmware query, then SAM configuration.
    ///
    /// # Errors
    ///
    /// Either step failing is fatal and returned as-is.
    pub fn initialize(&mut self) -> Result<FirmwareVersion> {
        let firmware = self.reader.firmware_version()?;
        info!("Found PN532 with firmware version: {}", firmware);

        self.reader.configure()?;
        info!("Waiting for RFID/NFC card...");

        Ok(firmware)
    }

    /// Poll once. `Ok(None)` when no card showed up within the timeout.
    ///
    /// # Errors
    ///
    /// Transport faults are returned without retry.
    pub fn poll(&mut self) -> Result<Option<CardUid>> {
        self.reader.read_passive_target(self.timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fobgate_hardware::HardwareError;
    use fobgate_hardware::mock::MockReader;

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn test_initialize_configures_reader() {
        let (reader, _handle) = MockReader::new();
        let mut poller = ReaderPoller::new(reader, TIMEOUT);

        let fw = poller.initialize().unwrap();
        assert_eq!(fw.to_string(), "1.6");
        assert!(poller.reader().is_configured());
    }

    #[test]
    fn test_poll_before_initialize_fails() {
        let (reader, _handle) = MockReader::new();
        let mut poller = ReaderPoller::new(reader, TIMEOUT);

        assert!(matches!(
            poller.poll(),
            Err(HardwareError::InitializationFailed { .. })
        ));
    }

    #[test]
    fn test_poll_passes_results_through() {
        let (reader, handle) = MockReader::new();
        let mut poller = ReaderPoller::new(reader, TIMEOUT);
        poller.initialize().unwrap();

        let uid = CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap();
        handle.present_card(uid.clone()).unwrap();
        handle.no_card().unwrap();
        handle.fail("bus error").unwrap();

        assert_eq!(poller.poll().unwrap(), Some(uid));
        assert_eq!(poller.poll().unwrap(), None);
        assert!(poller.poll().is_err());
        assert_eq!(poller.into_inner().poll_count(), 3);
    }
}
