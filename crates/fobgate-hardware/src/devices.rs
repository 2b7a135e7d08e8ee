//! Enum wrappers for hardware device dispatch.
//!
//! The access loop is generic over [`CardReader`] and [`OutputLine`]; the
//! binary picks concrete devices at startup. These enums give it a single
//! concrete type per role, with the Raspberry Pi variants only present when
//! the `hardware-rpi` feature is enabled.
//!
//! # Examples
//!
//! ```
//! use fobgate_hardware::devices::{AnyCardReader, AnyOutputLine};
//! use fobgate_hardware::mock::{MockLine, MockReader};
//! use fobgate_hardware::traits::{CardReader, OutputLine};
//!
//! let (reader, _handle) = MockReader::new();
//! let reader = AnyCardReader::Mock(reader);
//! let relay = AnyOutputLine::Mock(MockLine::new("relay"));
//!
//! assert_eq!(reader.reader_info().transport, "mock");
//! assert!(!relay.is_set_high());
//! ```

use std::time::Duration;

use fobgate_core::CardUid;

use crate::mock::{MockLine, MockReader};
use crate::traits::{CardReader, OutputLine};
use crate::types::{FirmwareVersion, ReaderInfo};
use crate::Result;

#[cfg(feature = "hardware-rpi")]
use crate::rpi::{GpioLine, RpiPn532};

/// Enum wrapper for card reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Mock reader for development and testing.
    Mock(MockReader),

    /// PN532 on the Raspberry Pi I2C bus.
    #[cfg(feature = "hardware-rpi")]
    Pn532(Box<RpiPn532>),
}

impl CardReader for AnyCardReader {
    fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        match self {
            Self::Mock(device) => device.firmware_version(),
            #[cfg(feature = "hardware-rpi")]
            Self::Pn532(device) => device.firmware_version(),
        }
    }

    fn configure(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.configure(),
            #[cfg(feature = "hardware-rpi")]
            Self::Pn532(device) => device.configure(),
        }
    }

    fn read_passive_target(&mut self, timeout: Duration) -> Result<Option<CardUid>> {
        match self {
            Self::Mock(device) => device.read_passive_target(timeout),
            #[cfg(feature = "hardware-rpi")]
            Self::Pn532(device) => device.read_passive_target(timeout),
        }
    }

    fn reader_info(&self) -> ReaderInfo {
        match self {
            Self::Mock(device) => device.reader_info(),
            #[cfg(feature = "hardware-rpi")]
            Self::Pn532(device) => device.reader_info(),
        }
    }
}

/// Enum wrapper for output line dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyOutputLine {
    /// Mock line for development and testing.
    Mock(MockLine),

    /// Raspberry Pi GPIO pin.
    #[cfg(feature = "hardware-rpi")]
    Gpio(GpioLine),
}

impl OutputLine for AnyOutputLine {
    fn set(&mut self, high: bool) -> Result<()> {
        match self {
            Self::Mock(line) => line.set(high),
            #[cfg(feature = "hardware-rpi")]
            Self::Gpio(line) => line.set(high),
        }
    }

    fn is_set_high(&self) -> bool {
        match self {
            Self::Mock(line) => line.is_set_high(),
            #[cfg(feature = "hardware-rpi")]
            Self::Gpio(line) => line.is_set_high(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Mock(line) => line.name(),
            #[cfg(feature = "hardware-rpi")]
            Self::Gpio(line) => line.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_card_reader_mock() {
        let (reader, handle) = MockReader::new();
        let mut reader = AnyCardReader::Mock(reader);

        reader.firmware_version().unwrap();
        reader.configure().unwrap();

        let uid = CardUid::new(vec![0xDD, 0xCE, 0x96, 0x38]).unwrap();
        handle.present_card(uid.clone()).unwrap();

        let read = reader
            .read_passive_target(Duration::from_millis(10))
            .unwrap();
        assert_eq!(read, Some(uid));
        assert_eq!(reader.reader_info().name, "Mock PN532");
    }

    #[test]
    fn test_any_output_line_mock() {
        let observer = MockLine::new("indicator");
        let mut line = AnyOutputLine::Mock(observer.clone());

        line.set(true).unwrap();
        assert!(line.is_set_high());
        assert!(observer.is_set_high());
        assert_eq!(line.name(), "indicator");
    }
}
