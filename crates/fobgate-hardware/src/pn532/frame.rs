//! PN532 host-controller frame codec.
//!
//! ```text
//! 00 00 FF LEN LCS TFI PD0 .. PDn DCS 00
//! ^^ ^^^^^ ^^^ ^^^ ^^^^^^^^^^^^^^ ^^^ ^^
//! |  |     |   |   |              |   postamble
//! |  |     |   |   |              data checksum: TFI + PD + DCS == 0
//! |  |     |   |   frame identifier + packet data (LEN bytes)
//! |  |     |   length checksum: LEN + LCS == 0
//! |  |     number of bytes in TFI + PD
//! |  start code
//! preamble
//! ```
//!
//! All checksums are modulo 256.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{HardwareError, Result};

/// Frame identifier for host to PN532 frames.
pub const HOST_TO_PN532: u8 = 0xD4;

/// Frame identifier for PN532 to host frames.
pub const PN532_TO_HOST: u8 = 0xD5;

/// Acknowledge frame sent by the PN532 after accepting a command.
pub const ACK_FRAME: [u8; 6] = [0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00];

/// Bytes around TFI + PD: preamble, start code (2), LEN, LCS, DCS, postamble.
pub const FRAME_OVERHEAD: usize = 7;

const PREAMBLE: u8 = 0x00;
const START_CODE: [u8; 2] = [0x00, 0xFF];
const POSTAMBLE: u8 = 0x00;

/// Decoded information frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame identifier (direction).
    pub tfi: u8,

    /// Packet data: command or response code followed by parameters.
    pub data: Bytes,
}

/// Two's complement of the byte sum, so that `sum(bytes) + checksum == 0`.
fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b))
        .wrapping_neg()
}

/// Encode a host command frame.
///
/// # Errors
///
/// Returns an error if the parameters do not fit a normal information
/// frame (LEN is a single byte).
///
/// # Examples
///
/// ```
/// use fobgate_hardware::pn532::frame::encode_command;
///
/// // GetFirmwareVersion
/// let frame = encode_command(0x02, &[]).unwrap();
/// assert_eq!(&frame[..], &[0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00]);
/// ```
pub fn encode_command(command: u8, params: &[u8]) -> Result<Bytes> {
    let len = params.len() + 2;
    let len = u8::try_from(len).map_err(|_| {
        HardwareError::invalid_data(format!("PN532 frame too long: {len} bytes"))
    })?;

    let mut buf = BytesMut::with_capacity(usize::from(len) + FRAME_OVERHEAD);
    buf.put_u8(PREAMBLE);
    buf.put_slice(&START_CODE);
    buf.put_u8(len);
    buf.put_u8(len.wrapping_neg());

    let body_start = buf.len();
    buf.put_u8(HOST_TO_PN532);
    buf.put_u8(command);
    buf.put_slice(params);
    let dcs = checksum(&buf[body_start..]);

    buf.put_u8(dcs);
    buf.put_u8(POSTAMBLE);
    Ok(buf.freeze())
}

/// Whether `raw` starts with the ACK frame.
pub fn is_ack(raw: &[u8]) -> bool {
    raw.starts_with(&ACK_FRAME)
}

/// Decode an information frame, skipping leading zero padding and ignoring
/// trailing bytes after the postamble position.
///
/// # Errors
///
/// Returns an error for a missing start code, a checksum mismatch, an
/// empty frame or a truncated buffer.
pub fn decode_frame(raw: &[u8]) -> Result<Frame> {
    let start = raw
        .iter()
        .position(|&b| b != PREAMBLE)
        .ok_or_else(|| HardwareError::invalid_data("PN532 frame contains only padding"))?;

    if start == 0 || raw[start] != START_CODE[1] {
        return Err(HardwareError::invalid_data(
            "PN532 frame preamble does not contain 0x00FF",
        ));
    }

    let len_pos = start + 1;
    let (len, lcs) = match raw.get(len_pos..len_pos + 2) {
        Some(&[len, lcs]) => (len, lcs),
        _ => return Err(HardwareError::invalid_data("PN532 frame truncated")),
    };

    if len.wrapping_add(lcs) != 0 {
        return Err(HardwareError::invalid_data(
            "PN532 length checksum did not match length",
        ));
    }

    if len == 0 {
        return Err(HardwareError::invalid_data("PN532 frame has no data"));
    }

    let body_start = len_pos + 2;
    let body_end = body_start + usize::from(len);
    let (body, dcs) = match (raw.get(body_start..body_end), raw.get(body_end)) {
        (Some(body), Some(&dcs)) => (body, dcs),
        _ => return Err(HardwareError::invalid_data("PN532 frame truncated")),
    };

    if checksum(body) != dcs {
        return Err(HardwareError::invalid_data(
            "PN532 data checksum did not match",
        ));
    }

    Ok(Frame {
        tfi: body[0],
        data: Bytes::copy_from_slice(&body[1..]),
    })
}
