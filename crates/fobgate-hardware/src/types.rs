//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Firmware identity reported by the reader during the startup handshake.
///
/// Only used for the operator log line; nothing branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    /// IC identifier (0x32 for the PN532).
    pub ic: u8,

    /// Firmware major version.
    pub version: u8,

    /// Firmware revision.
    pub revision: u8,

    /// Bitfield of supported card families.
    pub support: u8,
}

impl FirmwareVersion {
    /// Decode the four-byte GetFirmwareVersion response.
    pub fn from_response(bytes: [u8; 4]) -> Self {
        let [ic, version, revision, support] = bytes;
        Self {
            ic,
            version,
            revision,
            support,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.version, self.revision)
    }
}

/// RFID reader information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "PN532 (I2C)").
    pub name: String,

    /// Bus the reader is attached through (e.g., "i2c", "mock").
    pub transport: String,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, transport: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: transport.into(),
        }
    }
}

/// Wiring of the PN532 breakout and the two output lines.
///
/// Pin numbers are BCM GPIO numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    /// I2C slave address of the PN532.
    pub i2c_address: u16,

    /// Indicator light output.
    pub indicator: u8,

    /// Relay output.
    pub relay: u8,

    /// PN532 RSTPD_N line, pulsed low to hard-reset the chip.
    pub reset: Option<u8>,

    /// PN532 P32/H_REQUEST line, pulsed to wake the chip.
    pub request: Option<u8>,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            i2c_address: crate::pn532::I2C_ADDRESS,
            indicator: 15,
            relay: 18,
            reset: Some(6),
            request: Some(7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_version_from_response() {
        let fw = FirmwareVersion::from_response([0x32, 0x01, 0x06, 0x07]);
        assert_eq!(fw.ic, 0x32);
        assert_eq!(fw.support, 0x07);
        assert_eq!(fw.to_string(), "1.6");
    }

    #[test]
    fn test_reader_info() {
        let info = ReaderInfo::new("PN532", "i2c");
        assert_eq!(info.name, "PN532");
        assert_eq!(info.transport, "i2c");
    }

    #[test]
    fn test_pin_map_default() {
        let pins = PinMap::default();
        assert_eq!(pins.i2c_address, 0x24);
        assert_eq!(pins.indicator, 15);
        assert_eq!(pins.relay, 18);
        assert_eq!(pins.reset, Some(6));
        assert_eq!(pins.request, Some(7));
    }

    #[test]
    fn test_pin_map_serialization() {
        let pins = PinMap::default();
        let json = serde_json::to_string(&pins).unwrap();
        let back: PinMap = serde_json::from_str(&json).unwrap();
        assert_eq!(pins, back);
    }
}
