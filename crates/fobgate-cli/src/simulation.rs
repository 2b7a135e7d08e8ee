//! Simulated reader for running without hardware.
//!
//! A background thread presents a fixed rotation of cards to a mock reader
//! so the whole loop (debounce, hold, outputs) can be watched on a desktop.

use std::thread;
use std::time::Duration;

use fobgate_core::CardUid;
use fobgate_hardware::mock::{MockLine, MockReader, MockReaderHandle};
use fobgate_hardware::{AnyCardReader, AnyOutputLine};
use tracing::{debug, info};

/// Gap between two simulated presentations.
const PRESENTATION_INTERVAL: Duration = Duration::from_secs(3);

/// Cards presented in turn: the blue keyfob, an unknown card, the white
/// card.
const ROTATION: &[&[u8]] = &[
    &[0x63, 0xDD, 0x46, 0x1C],
    &[0x01, 0x02, 0x03, 0x04],
    &[0xDD, 0xCE, 0x96, 0x38],
];

/// Mock reader fed by a background thread, plus two mock lines.
pub fn devices() -> anyhow::Result<(AnyCardReader, AnyOutputLine, AnyOutputLine)> {
    info!("No hardware backend enabled, using simulated reader");

    let rotation = ROTATION
        .iter()
        .map(|bytes| CardUid::try_from(*bytes))
        .collect::<Result<Vec<_>, _>>()?;

    let (reader, handle) = MockReader::with_name("Simulated PN532");
    thread::Builder::new()
        .name("card-feeder".into())
        .spawn(move || feed(handle, rotation))?;

    Ok((
        AnyCardReader::Mock(reader),
        AnyOutputLine::Mock(MockLine::new("indicator")),
        AnyOutputLine::Mock(MockLine::new("relay")),
    ))
}

/// Present each card once per interval until the reader goes away.
fn feed(handle: MockReaderHandle, rotation: Vec<CardUid>) {
    for uid in rotation.into_iter().cycle() {
        thread::sleep(PRESENTATION_INTERVAL);
        debug!("Simulating card {}", uid);
        if handle.present_card(uid).is_err() {
            break;
        }
    }
}
