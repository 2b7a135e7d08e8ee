//! Raspberry Pi backends built on `rppal`.
//!
//! Only compiled with the `hardware-rpi` feature.

use std::fmt;

use rppal::gpio::{Gpio, OutputPin};
use rppal::i2c::I2c;
use tracing::info;

use crate::devices::AnyOutputLine;
use crate::pn532::{I2cBus, I2cInterface, Pn532};
use crate::traits::OutputLine;
use crate::types::PinMap;
use crate::{HardwareError, Result};

/// The PN532 reader as wired on a Raspberry Pi.
pub type RpiPn532 = Pn532<I2cInterface<RpiI2c>>;

/// Primary I2C bus addressed to a single slave.
pub struct RpiI2c {
    bus: I2c,
    address: u16,
}

impl RpiI2c {
    /// Open the primary I2C bus and address `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus is not available.
    pub fn open(address: u16) -> Result<Self> {
        let mut bus = I2c::new().map_err(|e| {
            HardwareError::initialization_failed(format!("Failed to open I2C bus: {e}"))
        })?;
        bus.set_slave_address(address).map_err(|e| {
            HardwareError::initialization_failed(format!(
                "Failed to address I2C slave {address:#04x}: {e}"
            ))
        })?;

        Ok(Self { bus, address })
    }
}

impl fmt::Debug for RpiI2c {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpiI2c")
            .field("address", &format_args!("{:#04x}", self.address))
            .finish()
    }
}

impl I2cBus for RpiI2c {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.bus
            .write(data)
            .map(|_| ())
            .map_err(|e| HardwareError::communication(format!("I2C write failed: {e}")))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.bus
            .read(buf)
            .map(|_| ())
            .map_err(|e| HardwareError::communication(format!("I2C read failed: {e}")))
    }
}

/// GPIO output line.
#[derive(Debug)]
pub struct GpioLine {
    name: String,
    pin: OutputPin,
}

impl GpioLine {
    /// Claim BCM pin `pin` as an output, starting low.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO peripheral or the pin is unavailable.
    pub fn open(gpio: &Gpio, name: impl Into<String>, pin: u8) -> Result<Self> {
        let name = name.into();
        let pin = gpio
            .get(pin)
            .map_err(|e| {
                HardwareError::initialization_failed(format!("GPIO {pin} ({name}): {e}"))
            })?
            .into_output_low();

        Ok(Self { name, pin })
    }
}

impl OutputLine for GpioLine {
    fn set(&mut self, high: bool) -> Result<()> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Peripherals opened from a [`PinMap`].
#[derive(Debug)]
pub struct RpiDevices {
    pub reader: RpiPn532,
    pub indicator: GpioLine,
    pub relay: GpioLine,
}

/// Open the PN532 and both output lines, then hard-reset and wake the
/// reader so it is ready for the firmware handshake.
///
/// # Errors
///
/// Returns an error if any bus or pin cannot be claimed.
pub fn open(pins: &PinMap) -> Result<RpiDevices> {
    let gpio = Gpio::new()
        .map_err(|e| HardwareError::initialization_failed(format!("Failed to open GPIO: {e}")))?;

    let bus = RpiI2c::open(pins.i2c_address)?;
    let mut reader = Pn532::new(I2cInterface::new(bus));

    if let Some(pin) = pins.reset {
        let line = GpioLine::open(&gpio, "pn532-reset", pin)?;
        reader = reader.with_reset_line(AnyOutputLine::Gpio(line));
    }
    if let Some(pin) = pins.request {
        let line = GpioLine::open(&gpio, "pn532-request", pin)?;
        reader = reader.with_request_line(AnyOutputLine::Gpio(line));
    }

    reader.hard_reset()?;
    reader.wake()?;

    let indicator = GpioLine::open(&gpio, "indicator", pins.indicator)?;
    let relay = GpioLine::open(&gpio, "relay", pins.relay)?;

    info!(
        "Opened PN532 at I2C {:#04x}, indicator GPIO {}, relay GPIO {}",
        pins.i2c_address, pins.indicator, pins.relay
    );

    Ok(RpiDevices {
        reader,
        indicator,
        relay,
    })
}
