//! Hardware layer for the fobgate access loop.
//!
//! The loop needs exactly three peripherals: one card reader and two
//! digital outputs (indicator light and relay). This crate defines the
//! traits for both roles, a PN532 driver speaking the host-controller frame
//! protocol, and mock devices for development and testing.
//!
//! # Device Traits
//!
//! ## Card Readers
//!
//! The [`CardReader`] trait covers the startup handshake and a bounded poll:
//!
//! ```no_run
//! use std::time::Duration;
//! use fobgate_hardware::traits::CardReader;
//! use fobgate_hardware::error::Result;
//!
//! fn handshake_and_poll<R: CardReader>(reader: &mut R) -> Result<()> {
//!     let fw = reader.firmware_version()?;
//!     println!("Found PN532 with firmware version: {fw}");
//!     reader.configure()?;
//!
//!     if let Some(uid) = reader.read_passive_target(Duration::from_millis(500))? {
//!         println!("Found card with UID: {uid}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Output Lines
//!
//! The [`OutputLine`] trait is a boolean-settable pin. It is also used for
//! the PN532's own reset and request lines.
//!
//! # Backends
//!
//! - [`mock`]: channel-driven reader and shared-state lines, always built.
//! - [`pn532`]: the PN532 driver, generic over [`pn532::Pn532Interface`].
//! - `rpi`: `rppal` I2C bus and GPIO lines, behind the `hardware-rpi`
//!   feature.
//!
//! [`devices`] wraps all of them in one enum per role.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with a
//! [`HardwareError`]. "No card in the field" is `Ok(None)`, never an error.
//!
//! [`CardReader`]: traits::CardReader
//! [`OutputLine`]: traits::OutputLine

pub mod devices;
pub mod error;
pub mod mock;
pub mod pn532;
#[cfg(feature = "hardware-rpi")]
pub mod rpi;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyCardReader, AnyOutputLine};
pub use error::{HardwareError, Result};
pub use traits::{CardReader, OutputLine};
pub use types::{FirmwareVersion, PinMap, ReaderInfo};
