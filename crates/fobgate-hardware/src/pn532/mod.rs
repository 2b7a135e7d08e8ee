//! PN532 NFC controller driver.
//!
//! The driver speaks the host-controller frame protocol ([`frame`]) over any
//! [`Pn532Interface`]. Only the three commands the access loop needs are
//! implemented: firmware query, SAM configuration and passive target
//! detection for ISO 14443A cards.
//!
//! Every command follows the same exchange:
//!
//! ```text
//! host  -> command frame
//! PN532 -> ACK frame          (wait_ready, then read)
//! PN532 -> response frame     (wait_ready, then read)
//! ```
//!
//! A wait that runs out of time is not an error: the command simply has no
//! result yet, which for passive target detection means "no card".

pub mod frame;
pub mod i2c;

use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use fobgate_core::CardUid;
use tracing::{debug, trace};

use crate::devices::AnyOutputLine;
use crate::traits::{CardReader, OutputLine};
use crate::types::{FirmwareVersion, ReaderInfo};
use crate::{HardwareError, Result};

pub use i2c::{I2cBus, I2cInterface};

/// Default 7-bit I2C address of the PN532.
pub const I2C_ADDRESS: u16 = 0x24;

/// Timeout for the firmware query during the handshake.
pub const FIRMWARE_TIMEOUT: Duration = Duration::from_millis(500);

/// Timeout for SAM configuration during the handshake.
pub const SAM_TIMEOUT: Duration = Duration::from_secs(1);

/// SAMConfiguration parameters: normal mode, 1 s virtual card timeout, use IRQ.
const SAM_NORMAL_MODE: [u8; 3] = [0x01, 0x14, 0x01];

/// InListPassiveTarget parameters: at most one target, 106 kbps type A.
const LIST_ONE_TYPE_A: [u8; 2] = [0x01, 0x00];

/// Bytes requested for an InListPassiveTarget response.
const PASSIVE_TARGET_RESPONSE_LEN: usize = 19;

/// Longest NFCID the driver accepts from a single target.
const MAX_NFCID_LENGTH: usize = 7;

/// Byte-level link to a PN532, independent of the physical bus.
pub trait Pn532Interface: Send {
    /// Write a complete frame.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Wait until the chip has a frame ready. `Ok(false)` on timeout.
    fn wait_ready(&mut self, timeout: Duration) -> Result<bool>;

    /// Read `len` bytes of a frame the chip signalled as ready.
    fn read_frame(&mut self, len: usize) -> Result<Bytes>;

    /// Bus name reported in [`ReaderInfo`] (e.g. "i2c").
    fn transport(&self) -> &str;
}

/// PN532 command codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    GetFirmwareVersion = 0x02,
    SamConfiguration = 0x14,
    InListPassiveTarget = 0x4A,
}

impl Command {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Responses carry the command code plus one.
    pub fn response_code(self) -> u8 {
        self.code() + 1
    }
}

/// PN532 driver.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use fobgate_hardware::pn532::{I2cBus, I2cInterface, Pn532};
/// use fobgate_hardware::traits::CardReader;
///
/// fn poll_once<B: I2cBus>(bus: B) -> fobgate_hardware::Result<()> {
///     let mut reader = Pn532::new(I2cInterface::new(bus));
///     let fw = reader.firmware_version()?;
///     println!("Found PN532 with firmware version: {fw}");
///     reader.configure()?;
///
///     if let Some(uid) = reader.read_passive_target(Duration::from_millis(500))? {
///         println!("Found card with UID: {uid}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Pn532<I> {
    interface: I,
    reset: Option<AnyOutputLine>,
    request: Option<AnyOutputLine>,
}

impl<I: Pn532Interface> Pn532<I> {
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            reset: None,
            request: None,
        }
    }

    /// Attach the RSTPD_N line used by [`hard_reset`](Self::hard_reset).
    pub fn with_reset_line(mut self, line: AnyOutputLine) -> Self {
        self.reset = Some(line);
        self
    }

    /// Attach the H_REQUEST line used by [`wake`](Self::wake).
    pub fn with_request_line(mut self, line: AnyOutputLine) -> Self {
        self.request = Some(line);
        self
    }

    /// Pulse the reset line low. No-op without a reset line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    pub fn hard_reset(&mut self) -> Result<()> {
        if let Some(line) = self.reset.as_mut() {
            debug!("Resetting PN532");
            pulse(
                line,
                Duration::from_millis(100),
                Duration::from_millis(500),
                Duration::from_millis(100),
            )?;
        }
        Ok(())
    }

    /// Pulse the request line to wake the chip from power-down. No-op
    /// without a request line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    pub fn wake(&mut self) -> Result<()> {
        if let Some(line) = self.request.as_mut() {
            debug!("Waking PN532");
            pulse(
                line,
                Duration::from_millis(100),
                Duration::from_millis(100),
                Duration::from_millis(500),
            )?;
        }
        Ok(())
    }

    /// Send a command and wait for its response, all within `timeout`.
    ///
    /// Returns the response parameters (after the response code), or
    /// `None` if the chip did not acknowledge or answer in time.
    ///
    /// # Errors
    ///
    /// Returns an error for bus failures, a missing ACK or a malformed
    /// response frame.
    pub fn call(
        &mut self,
        command: Command,
        params: &[u8],
        response_len: usize,
        timeout: Duration,
    ) -> Result<Option<Bytes>> {
        let deadline = Instant::now() + timeout;

        if !self.send_command(command, params, timeout)? {
            return Ok(None);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        self.read_response(command, response_len, remaining)
    }

    fn send_command(
        &mut self,
        command: Command,
        params: &[u8],
        timeout: Duration,
    ) -> Result<bool> {
        let request = frame::encode_command(command.code(), params)?;
        self.interface.write_frame(&request)?;

        if !self.interface.wait_ready(timeout)? {
            trace!("PN532 did not acknowledge {:?}", command);
            return Ok(false);
        }

        let ack = self.interface.read_frame(frame::ACK_FRAME.len())?;
        if !frame::is_ack(&ack) {
            return Err(HardwareError::invalid_data(format!(
                "Did not receive expected ACK for {command:?}"
            )));
        }

        Ok(true)
    }

    fn read_response(
        &mut self,
        command: Command,
        response_len: usize,
        timeout: Duration,
    ) -> Result<Option<Bytes>> {
        if !self.interface.wait_ready(timeout)? {
            return Ok(None);
        }

        let raw = self
            .interface
            .read_frame(response_len + 2 + frame::FRAME_OVERHEAD)?;
        let response = frame::decode_frame(&raw)?;

        if response.tfi != frame::PN532_TO_HOST
            || response.data.first() != Some(&command.response_code())
        {
            return Err(HardwareError::invalid_data(format!(
                "Unexpected response to {command:?}: TFI {:#04x}, data {:02X?}",
                response.tfi,
                &response.data[..]
            )));
        }

        Ok(Some(response.data.slice(1..)))
    }
}

/// Drive `line` high, low, high with the given hold times.
fn pulse(line: &mut AnyOutputLine, before: Duration, low: Duration, after: Duration) -> Result<()> {
    line.set(true)?;
    thread::sleep(before);
    line.set(false)?;
    thread::sleep(low);
    line.set(true)?;
    thread::sleep(after);
    Ok(())
}

/// Extract the UID from an InListPassiveTarget response.
///
/// Layout: `NbTg Tg SENS_RES(2) SEL_RES NFCIDLength NFCID...`
fn parse_passive_target(response: &[u8]) -> Result<Option<CardUid>> {
    match response.first() {
        None | Some(0) => return Ok(None),
        Some(1) => {}
        Some(n) => {
            return Err(HardwareError::invalid_data(format!(
                "More than one card detected: {n}"
            )));
        }
    }

    let uid_len = response
        .get(5)
        .map(|len| usize::from(*len))
        .ok_or_else(|| HardwareError::invalid_data("Passive target response truncated"))?;

    if uid_len > MAX_NFCID_LENGTH {
        return Err(HardwareError::invalid_data(format!(
            "Found card with unexpectedly long UID: {uid_len} bytes"
        )));
    }

    let uid = response
        .get(6..6 + uid_len)
        .ok_or_else(|| HardwareError::invalid_data("Passive target UID truncated"))?;

    CardUid::try_from(uid)
        .map(Some)
        .map_err(|e| HardwareError::invalid_data(e.to_string()))
}

impl<I: Pn532Interface> CardReader for Pn532<I> {
    fn firmware_version(&mut self) -> Result<FirmwareVersion> {
        let response = self
            .call(Command::GetFirmwareVersion, &[], 4, FIRMWARE_TIMEOUT)?
            .ok_or_else(|| HardwareError::initialization_failed("Failed to detect the PN532"))?;

        let bytes: [u8; 4] = response
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| HardwareError::invalid_data("Firmware response truncated"))?;

        Ok(FirmwareVersion::from_response(bytes))
    }

    fn configure(&mut self) -> Result<()> {
        self.call(Command::SamConfiguration, &SAM_NORMAL_MODE, 0, SAM_TIMEOUT)?
            .ok_or_else(|| HardwareError::timeout(SAM_TIMEOUT.as_millis() as u64))?;
        Ok(())
    }

    fn read_passive_target(&mut self, timeout: Duration) -> Result<Option<CardUid>> {
        match self.call(
            Command::InListPassiveTarget,
            &LIST_ONE_TYPE_A,
            PASSIVE_TARGET_RESPONSE_LEN,
            timeout,
        )? {
            Some(response) => parse_passive_target(&response),
            None => Ok(None),
        }
    }

    fn reader_info(&self) -> ReaderInfo {
        ReaderInfo::new("PN532", self.interface.transport())
    }
}
