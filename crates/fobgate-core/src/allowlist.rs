//! Fixed set of authorized cards.
//!
//! The allowlist is built once at startup and never mutated. Validation is
//! a plain exact-match search over the entries that stops at the first hit.

use crate::{Result, constants::DEFAULT_ALLOWLIST, types::CardUid};
use serde::{Deserialize, Serialize};

/// A single authorized card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowEntry {
    /// UID the reader must report.
    pub uid: CardUid,

    /// Human name used in log lines (e.g. "Blue keyfob").
    pub label: Option<String>,
}

impl AllowEntry {
    /// Create an unlabeled entry.
    pub fn new(uid: CardUid) -> Self {
        Self { uid, label: None }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if present, otherwise the UID in hex.
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.uid.to_hex())
    }
}

/// Outcome of checking a UID against the allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The UID matched the entry at `index`.
    Accepted { index: usize },

    /// No entry matched.
    Rejected,
}

impl Verdict {
    /// Returns `true` if the card is authorized.
    #[inline]
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }
}

/// Authorized cards, in declaration order.
///
/// # Examples
///
/// ```
/// use fobgate_core::{AllowList, CardUid, Verdict};
///
/// let allowlist = AllowList::builtin().unwrap();
///
/// let keyfob = CardUid::new(vec![0x63, 0xDD, 0x46, 0x1C]).unwrap();
/// assert_eq!(allowlist.validate(&keyfob), Verdict::Accepted { index: 0 });
///
/// let stranger = CardUid::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
/// assert_eq!(allowlist.validate(&stranger), Verdict::Rejected);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    entries: Vec<AllowEntry>,
}

impl AllowList {
    /// Build an allowlist from entries.
    ///
    /// A UID listed more than once keeps only its first entry.
    pub fn new(entries: impl IntoIterator<Item = AllowEntry>) -> Self {
        let mut unique: Vec<AllowEntry> = Vec::new();
        for entry in entries {
            if !unique.iter().any(|e| e.uid == entry.uid) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    /// Build an allowlist of unlabeled UIDs.
    pub fn from_uids(uids: impl IntoIterator<Item = CardUid>) -> Self {
        Self::new(uids.into_iter().map(AllowEntry::new))
    }

    /// The allowlist compiled into the binary.
    ///
    /// # Errors
    /// Returns `Error::InvalidUid` if a compiled-in UID violates the length
    /// bounds.
    pub fn builtin() -> Result<Self> {
        let entries = DEFAULT_ALLOWLIST
            .iter()
            .map(|(label, bytes)| {
                Ok(AllowEntry::new(CardUid::try_from(*bytes)?).with_label(*label))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    /// Check a UID, stopping at the first matching entry.
    ///
    /// Pure: the same UID always yields the same verdict.
    #[must_use]
    pub fn validate(&self, uid: &CardUid) -> Verdict {
        self.entries
            .iter()
            .position(|entry| entry.uid == *uid)
            .map_or(Verdict::Rejected, |index| Verdict::Accepted { index })
    }

    /// Returns `true` if the UID is authorized.
    #[must_use]
    pub fn contains(&self, uid: &CardUid) -> bool {
        self.validate(uid).is_accepted()
    }

    /// Get the entry a verdict refers to.
    pub fn entry(&self, index: usize) -> Option<&AllowEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AllowEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn uid(bytes: &[u8]) -> CardUid {
        CardUid::new(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_builtin_allowlist() {
        let allowlist = AllowList::builtin().unwrap();
        assert_eq!(allowlist.len(), 2);
        assert_eq!(
            allowlist.entry(1).unwrap().label.as_deref(),
            Some("White card")
        );
    }

    #[rstest]
    #[case(&[0x63, 0xDD, 0x46, 0x1C], Verdict::Accepted { index: 0 })]
    #[case(&[0xDD, 0xCE, 0x96, 0x38], Verdict::Accepted { index: 1 })]
    #[case(&[0x01, 0x02, 0x03, 0x04], Verdict::Rejected)]
    #[case(&[0x63, 0xDD, 0x46], Verdict::Rejected)] // prefix of a valid UID
    #[case(&[0x63, 0xDD, 0x46, 0x1C, 0x00], Verdict::Rejected)] // valid UID plus a byte
    fn test_validate(#[case] bytes: &[u8], #[case] expected: Verdict) {
        let allowlist = AllowList::builtin().unwrap();
        assert_eq!(allowlist.validate(&uid(bytes)), expected);
    }

    #[test]
    fn test_validate_empty_allowlist_rejects() {
        let allowlist = AllowList::default();
        assert!(allowlist.is_empty());
        assert_eq!(
            allowlist.validate(&uid(&[0x63, 0xDD, 0x46, 0x1C])),
            Verdict::Rejected
        );
    }

    #[test]
    fn test_duplicates_keep_first_entry() {
        let allowlist = AllowList::new([
            AllowEntry::new(uid(&[0x01, 0x02, 0x03, 0x04])).with_label("first"),
            AllowEntry::new(uid(&[0x05, 0x06, 0x07, 0x08])),
            AllowEntry::new(uid(&[0x01, 0x02, 0x03, 0x04])).with_label("second"),
        ]);

        assert_eq!(allowlist.len(), 2);
        let verdict = allowlist.validate(&uid(&[0x01, 0x02, 0x03, 0x04]));
        assert_eq!(verdict, Verdict::Accepted { index: 0 });
        assert_eq!(allowlist.entry(0).unwrap().display_name(), "first");
    }

    #[test]
    fn test_display_name_falls_back_to_hex() {
        let entry = AllowEntry::new(uid(&[0xDD, 0xCE, 0x96, 0x38]));
        assert_eq!(entry.display_name(), "DDCE9638");
    }

    #[test]
    fn test_verdict_serialization() {
        let json = serde_json::to_string(&Verdict::Accepted { index: 1 }).unwrap();
        assert_eq!(json, r#"{"accepted":{"index":1}}"#);
        assert_eq!(
            serde_json::to_string(&Verdict::Rejected).unwrap(),
            r#""rejected""#
        );
    }
}
