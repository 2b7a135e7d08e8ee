//! I2C transport for the PN532.
//!
//! On I2C every read transaction starts with a status byte that is `0x01`
//! once the chip has a frame ready. Readiness is polled at a fixed interval
//! until the caller's timeout expires.

use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::trace;

use super::Pn532Interface;
use crate::{HardwareError, Result};

/// Status byte value meaning "frame ready".
const STATUS_READY: u8 = 0x01;

/// Delay between two status reads.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Raw I2C bus access, addressed to the PN532.
pub trait I2cBus: Send {
    /// Write `data` in a single transaction.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Fill `buf` from a single read transaction.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// [`Pn532Interface`] over an I2C bus.
#[derive(Debug)]
pub struct I2cInterface<B> {
    bus: B,
}

impl<B: I2cBus> I2cInterface<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Access the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<B: I2cBus> Pn532Interface for I2cInterface<B> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        trace!("PN532 <- {:02X?}", frame);
        self.bus.write(frame)
    }

    /// The chip NACKs or stretches the clock while busy, so failed status reads
    /// are retried. If no status read succeeded at all before the deadline, the
    /// last bus error is returned.
    fn wait_ready(&mut self, timeout: Duration) -> Result<bool> {
        let start = Instant::now();
        let mut status = [0u8; 1];
        let mut any_read_ok = false;
        let mut last_error = None;

        loop {
            match self.bus.read(&mut status) {
                Ok(()) if status[0] == STATUS_READY => return Ok(true),
                Ok(()) => any_read_ok = true,
                Err(e) => {
                    trace!("PN532 status read failed: {}", e);
                    last_error = Some(e);
                }
            }

            if start.elapsed() >= timeout {
                return match last_error {
                    Some(e) if !any_read_ok => Err(e),
                    _ => Ok(false),
                };
            }

            thread::sleep(READY_POLL_INTERVAL);
        }
    }

    fn read_frame(&mut self, len: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; len + 1];
        self.bus.read(&mut buf)?;

        if buf[0] != STATUS_READY {
            return Err(HardwareError::communication("PN532 busy during frame read"));
        }

        trace!("PN532 -> {:02X?}", &buf[1..]);
        Ok(Bytes::copy_from_slice(&buf[1..]))
    }

    fn transport(&self) -> &str {
        "i2c"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Bus that reports "ready" while it has queued frames.
    #[derive(Debug, Default)]
    struct QueueBus {
        frames: VecDeque<Vec<u8>>,
        writes: Vec<Vec<u8>>,
        broken: bool,
    }

    impl I2cBus for QueueBus {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<()> {
            if self.broken {
                return Err(HardwareError::communication("remote I/O error"));
            }
            buf.fill(0);
            if buf.len() == 1 {
                if !self.frames.is_empty() {
                    buf[0] = STATUS_READY;
                }
            } else if let Some(frame) = self.frames.pop_front() {
                buf[0] = STATUS_READY;
                let n = frame.len().min(buf.len() - 1);
                buf[1..=n].copy_from_slice(&frame[..n]);
            }
            Ok(())
        }
    }

    #[test]
    fn test_wait_ready_when_frame_queued() {
        let mut bus = QueueBus::default();
        bus.frames.push_back(vec![0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00]);
        let mut iface = I2cInterface::new(bus);

        assert!(iface.wait_ready(Duration::from_millis(50)).unwrap());
        let ack = iface.read_frame(6).unwrap();
        assert_eq!(&ack[..], &[0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00]);
    }

    #[test]
    fn test_wait_ready_times_out() {
        let mut iface = I2cInterface::new(QueueBus::default());

        let start = Instant::now();
        assert!(!iface.wait_ready(Duration::from_millis(30)).unwrap());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_ready_surfaces_dead_bus() {
        let bus = QueueBus {
            broken: true,
            ..QueueBus::default()
        };
        let mut iface = I2cInterface::new(bus);

        let err = iface.wait_ready(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, HardwareError::CommunicationError { .. }));
    }

    #[test]
    fn test_read_frame_busy() {
        let mut iface = I2cInterface::new(QueueBus::default());
        assert!(iface.read_frame(6).is_err());
    }

    #[test]
    fn test_write_frame_passes_through() {
        let mut iface = I2cInterface::new(QueueBus::default());
        iface.write_frame(&[0x00, 0x00, 0xFF]).unwrap();
        assert_eq!(iface.bus().writes, vec![vec![0x00, 0x00, 0xFF]]);
    }
}
