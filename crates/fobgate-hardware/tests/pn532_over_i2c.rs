//! PN532 driver exercised end to end over a simulated I2C bus.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fobgate_hardware::pn532::{I2cBus, I2cInterface, Pn532};
use fobgate_hardware::{CardReader, HardwareError, Result};

const ACK: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];
const FIRMWARE: [u8; 13] = [
    0x00, 0x00, 0xFF, 0x06, 0xFA, 0xD5, 0x03, 0x32, 0x01, 0x06, 0x07, 0xE8, 0x00,
];
const SAM: [u8; 9] = [0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD5, 0x15, 0x16, 0x00];
const BLUE_KEYFOB: [u8; 19] = [
    0x00, 0x00, 0xFF, 0x0C, 0xF4, 0xD5, 0x4B, 0x01, 0x01, 0x00, 0x04, 0x08, 0x04, 0x63, 0xDD, 0x46,
    0x1C, 0x2C, 0x00,
];

/// Simulated PN532 on I2C: answers every command frame from a script.
///
/// The status byte reads `0x01` while a reply is pending.
#[derive(Clone, Default)]
struct SimulatedBus {
    pending: Arc<Mutex<VecDeque<Vec<u8>>>>,
    script: Arc<Mutex<VecDeque<Vec<Vec<u8>>>>>,
    commands: Arc<Mutex<Vec<u8>>>,
}

impl SimulatedBus {
    /// Queue the replies for the next command written to the bus.
    fn on_next_command(&self, replies: &[&[u8]]) {
        self.script
            .lock()
            .unwrap()
            .push_back(replies.iter().map(|r| r.to_vec()).collect());
    }

    fn commands(&self) -> Vec<u8> {
        self.commands.lock().unwrap().clone()
    }
}

impl I2cBus for SimulatedBus {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if let Some(&code) = data.get(6) {
            self.commands.lock().unwrap().push(code);
        }
        if let Some(replies) = self.script.lock().unwrap().pop_front() {
            self.pending.lock().unwrap().extend(replies);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut pending = self.pending.lock().unwrap();
        buf.fill(0);
        if buf.len() == 1 {
            if !pending.is_empty() {
                buf[0] = 0x01;
            }
            return Ok(());
        }

        let frame = pending
            .pop_front()
            .ok_or_else(|| HardwareError::communication("read with nothing pending"))?;
        buf[0] = 0x01;
        let n = frame.len().min(buf.len() - 1);
        buf[1..=n].copy_from_slice(&frame[..n]);
        Ok(())
    }
}

fn connected_reader() -> (Pn532<I2cInterface<SimulatedBus>>, SimulatedBus) {
    let bus = SimulatedBus::default();
    (Pn532::new(I2cInterface::new(bus.clone())), bus)
}

#[test]
fn handshake_then_card_then_empty_field() {
    let (mut reader, bus) = connected_reader();
    bus.on_next_command(&[&ACK, &FIRMWARE]);
    bus.on_next_command(&[&ACK, &SAM]);
    bus.on_next_command(&[&ACK, &BLUE_KEYFOB]);
    bus.on_next_command(&[&ACK]);

    assert_eq!(reader.reader_info().transport, "i2c");

    let fw = reader.firmware_version().unwrap();
    assert_eq!(fw.to_string(), "1.6");
    reader.configure().unwrap();

    let uid = reader
        .read_passive_target(Duration::from_millis(500))
        .unwrap()
        .unwrap();
    assert_eq!(uid.to_string(), "[0x63, 0xdd, 0x46, 0x1c]");

    let start = Instant::now();
    let empty = reader
        .read_passive_target(Duration::from_millis(100))
        .unwrap();
    assert_eq!(empty, None);
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(start.elapsed() < Duration::from_millis(400));

    assert_eq!(bus.commands(), vec![0x02, 0x14, 0x4A, 0x4A]);
}

#[test]
fn silent_chip_fails_handshake() {
    let (mut reader, _bus) = connected_reader();

    let err = reader.firmware_version().unwrap_err();
    assert!(matches!(err, HardwareError::InitializationFailed { .. }));
}

#[test]
fn poll_without_ack_is_bounded_by_timeout() {
    let (mut reader, _bus) = connected_reader();

    let start = Instant::now();
    let result = reader
        .read_passive_target(Duration::from_millis(50))
        .unwrap();
    assert_eq!(result, None);
    assert!(start.elapsed() < Duration::from_millis(300));
}
