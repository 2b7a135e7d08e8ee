use crate::{
    Result,
    constants::{MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Card unique identifier as reported by the reader.
///
/// The length is whatever the reader returned (4 bytes for most MIFARE
/// Classic cards, 7 or 10 for others). Two UIDs are equal only when they
/// have the same length and the same bytes.
///
/// # Security
/// Equality uses constant-time comparison so a mismatch position cannot be
/// inferred from timing.
///
/// # Examples
///
/// ```
/// use fobgate_core::CardUid;
///
/// let uid: CardUid = "63:dd:46:1c".parse().unwrap();
/// assert_eq!(uid.as_bytes(), &[0x63, 0xDD, 0x46, 0x1C]);
/// assert_eq!(uid.to_hex(), "63DD461C");
/// assert_eq!(uid.to_string(), "[0x63, 0xdd, 0x46, 0x1c]");
/// ```
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a card UID with length validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if the UID is empty or longer than
    /// `MAX_UID_LENGTH` bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidUid(format!(
                "UID must be {MIN_UID_LENGTH}-{MAX_UID_LENGTH} bytes, got {len}"
            )));
        }
        Ok(CardUid(bytes))
    }

    /// Get the raw UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the UID.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a `CardUid` holds at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex without separators, e.g. `63DD461C`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{byte:#04x}")?;
        }
        write!(f, "]")
    }
}

/// Constant-time comparison implementation for CardUid
///
/// Slices of different length compare unequal.
impl PartialEq for CardUid {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl std::hash::Hash for CardUid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl TryFrom<Vec<u8>> for CardUid {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        CardUid::new(bytes)
    }
}

impl TryFrom<&[u8]> for CardUid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        CardUid::new(bytes)
    }
}

impl From<CardUid> for String {
    fn from(uid: CardUid) -> Self {
        uid.to_hex()
    }
}

impl TryFrom<String> for CardUid {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Parses the formats operators tend to copy from reader logs:
///
/// - separated bytes: `63:dd:46:1c`, `63 DD 46 1C`, `0x63, 0xdd, 0x46, 0x1c`
/// - the `Display` form: `[0x63, 0xdd, 0x46, 0x1c]`
/// - compact hex: `63DD461C`
impl std::str::FromStr for CardUid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim();

        if !trimmed.is_ascii() {
            return Err(Error::InvalidUid(format!("UID must be ASCII hex: {s}")));
        }

        let tokens: Vec<&str> = trimmed
            .split(|c: char| c == ':' || c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();

        let bytes = match tokens.as_slice() {
            [] => return Err(Error::InvalidUid("UID is empty".to_string())),
            [single] if !has_hex_prefix(single) && single.len() > 2 => parse_compact(single)?,
            many => many
                .iter()
                .map(|token| parse_byte(token))
                .collect::<Result<Vec<u8>>>()?,
        };

        CardUid::new(bytes)
    }
}

fn has_hex_prefix(token: &str) -> bool {
    token.starts_with("0x") || token.starts_with("0X")
}

fn parse_byte(token: &str) -> Result<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidUid(format!("Invalid UID byte: {token}")));
    }

    u8::from_str_radix(digits, 16)
        .map_err(|_| Error::InvalidUid(format!("Invalid UID byte: {token}")))
}

fn parse_compact(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return Err(Error::InvalidUid(format!(
            "Compact hex UID must have an even number of digits: {hex}"
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| parse_byte(&hex[i..i + 2]))
        .collect()
}
