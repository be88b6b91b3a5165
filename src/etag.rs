//! Ordered 128-bit Record Versions
//!
//! This module provides the `Etag` value type: a pair of signed 64-bit
//! counters (`restarts`, `changes`) with a fixed 16-byte binary form, a
//! 36-character hyphenated hex form, a total order, and derivation helpers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

use crate::uuid_type::UuidType;

/// Length of the binary form in bytes.
pub const BYTE_LEN: usize = 16;

/// Length of the canonical text form in characters.
pub const TEXT_LEN: usize = 36;

/// Character offsets of the hyphens in the canonical text form.
const SEPARATORS: [usize; 4] = [8, 13, 18, 23];

const COUNTER_MASK: i64 = 0x00FF_FFFF_FFFF_FFFF;

/// A strictly ordered record version
///
/// Binary form is big-endian `restarts` followed by big-endian `changes`.
/// Text form is the same sixteen bytes as uppercase hex, grouped 8-4-4-4-12:
///
/// - `00000000-0000-0001-0000-000000000002` (restarts = 1, changes = 2)
/// - `01000000-0000-0005-0000-000000000010` (documents epoch 5, change 16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Etag {
    restarts: i64,
    changes: i64,
}

impl Etag {
    /// `0, 0`; the version of a record that has never been written.
    pub const EMPTY: Etag = Etag {
        restarts: 0,
        changes: 0,
    };

    /// `-1, -1`; sorts before every etag with non-negative fields.
    pub const INVALID: Etag = Etag {
        restarts: -1,
        changes: -1,
    };

    /// Create an etag whose `restarts` carries `category` in its high byte
    pub fn new(category: UuidType, restarts: i64, changes: i64) -> Self {
        Self {
            restarts: category.shifted() | restarts,
            changes,
        }
    }

    /// Create an etag from raw field values, with no category tagging
    pub const fn from_parts(restarts: i64, changes: i64) -> Self {
        Self { restarts, changes }
    }

    pub const fn empty() -> Self {
        Self::EMPTY
    }

    pub const fn invalid() -> Self {
        Self::INVALID
    }

    pub fn restarts(&self) -> i64 {
        self.restarts
    }

    pub fn changes(&self) -> i64 {
        self.changes
    }

    /// Decode the category tag from the high byte of `restarts`, if it names one
    pub fn category(&self) -> Option<UuidType> {
        UuidType::try_from((self.restarts >> 56) as u8).ok()
    }

    /// The restart counter with the category byte masked off
    pub fn restarts_counter(&self) -> i64 {
        self.restarts & COUNTER_MASK
    }

    /// Big-endian `restarts` followed by big-endian `changes`
    pub fn to_bytes(&self) -> [u8; BYTE_LEN] {
        let mut bytes = [0u8; BYTE_LEN];
        bytes[..8].copy_from_slice(&self.restarts.to_be_bytes());
        bytes[8..].copy_from_slice(&self.changes.to_be_bytes());
        bytes
    }

    /// Decode the binary form
    ///
    /// Fails unless `bytes` is exactly sixteen bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EtagError> {
        let fixed: [u8; BYTE_LEN] = bytes.try_into().map_err(|_| EtagError::InvalidByteLength {
            expected: BYTE_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self::from(fixed))
    }

    /// Parse the canonical text form
    ///
    /// Format: `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`
    ///
    /// Hex digits may be either case; hyphens must sit at offsets 8, 13, 18
    /// and 23. Each pair of digits is one byte of the binary form, in order.
    pub fn parse(s: &str) -> Result<Self, EtagError> {
        if s.is_empty() {
            return Err(EtagError::Empty);
        }

        let length = s.chars().count();
        if length != TEXT_LEN {
            return Err(EtagError::InvalidLength {
                expected: TEXT_LEN,
                actual: length,
            });
        }

        let mut digits = [0u8; BYTE_LEN * 2];
        let mut next = 0;
        for (position, c) in s.chars().enumerate() {
            if SEPARATORS.contains(&position) {
                if c != '-' {
                    return Err(EtagError::MissingSeparator { position, found: c });
                }
                continue;
            }
            if !c.is_ascii() {
                return Err(EtagError::InvalidHexDigit { position, found: c });
            }
            digits[next] = c as u8;
            next += 1;
        }

        let mut bytes = [0u8; BYTE_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|err| match err {
            hex::FromHexError::InvalidHexCharacter { c, index } => EtagError::InvalidHexDigit {
                position: Self::text_position(index),
                found: c,
            },
            _ => EtagError::InvalidLength {
                expected: TEXT_LEN,
                actual: length,
            },
        })?;

        Ok(Self::from(bytes))
    }

    /// Parse the canonical text form, discarding the reason on failure
    pub fn try_parse(s: &str) -> Option<Self> {
        match Self::parse(s) {
            Ok(etag) => Some(etag),
            Err(err) => {
                trace!(input = s, error = %err, "discarding malformed etag");
                None
            }
        }
    }

    /// Map an index into the 32 hex digits back to its offset in the text form
    fn text_position(digit_index: usize) -> usize {
        SEPARATORS
            .iter()
            .fold(digit_index, |position, &separator| {
                if position >= separator {
                    position + 1
                } else {
                    position
                }
            })
    }

    /// Replace `restarts` with a freshly tagged value; `changes` is kept
    pub fn with_restarts(&self, category: UuidType, restarts: i64) -> Self {
        Self {
            restarts: category.shifted() | restarts,
            changes: self.changes,
        }
    }

    /// Advance `changes` by `amount`, wrapping on overflow; `restarts` is kept
    pub fn increment_by(&self, amount: i64) -> Self {
        Self {
            restarts: self.restarts,
            changes: self.changes.wrapping_add(amount),
        }
    }

    /// Fold another etag into this one
    ///
    /// Equivalent to `self.hash_with_bytes(&other.to_bytes())`.
    pub fn hash_with(&self, other: &Etag) -> Self {
        self.hash_with_bytes(&other.to_bytes())
    }

    /// Derive a new etag from this one and an arbitrary byte sequence
    ///
    /// The result is the first sixteen bytes of SHA-256 over the binary form
    /// of `self` followed by `bytes`, decoded as an etag.
    pub fn hash_with_bytes(&self, bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes());
        hasher.update(bytes);
        let digest = hasher.finalize();

        let mut folded = [0u8; BYTE_LEN];
        folded.copy_from_slice(&digest[..BYTE_LEN]);
        let derived = Self::from(folded);
        trace!(base = %self, input_len = bytes.len(), derived = %derived, "folded etag");
        derived
    }

    /// Re-render stored etag text in canonical (uppercase) form
    pub fn canonical(etag: &str) -> Result<String, EtagError> {
        Ok(Self::parse(etag)?.to_string())
    }

    pub fn canonical_option(etag: Option<&str>) -> Result<Option<String>, EtagError> {
        etag.map(Self::canonical).transpose()
    }
}

/// Compare two possibly-absent etags
///
/// An absent etag sorts before every present one; two absent etags are equal.
pub fn compare(a: Option<&Etag>, b: Option<&Etag>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for Etag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.restarts
            .cmp(&other.restarts)
            .then_with(|| self.changes.cmp(&other.changes))
    }
}

impl PartialOrd for Etag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Errors that can occur when decoding an etag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EtagError {
    /// Text input was empty
    #[error("etag cannot be empty")]
    Empty,
    /// Text input was not 36 characters long
    #[error("etag must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Binary input was not 16 bytes long
    #[error("etag must be {expected} bytes, got {actual}")]
    InvalidByteLength { expected: usize, actual: usize },
    /// A digit slot held something other than a hex digit
    #[error("invalid hex digit '{found}' at position {position}")]
    InvalidHexDigit { position: usize, found: char },
    /// A separator slot held something other than '-'
    #[error("expected '-' at position {position}, found '{found}'")]
    MissingSeparator { position: usize, found: char },
    /// High byte of `restarts` does not name a known category
    #[error("unknown etag category tag {0:#04x}")]
    UnknownCategory(u8),
}

impl From<[u8; BYTE_LEN]> for Etag {
    fn from(bytes: [u8; BYTE_LEN]) -> Self {
        let mut restarts = [0u8; 8];
        let mut changes = [0u8; 8];
        restarts.copy_from_slice(&bytes[..8]);
        changes.copy_from_slice(&bytes[8..]);
        Self {
            restarts: i64::from_be_bytes(restarts),
            changes: i64::from_be_bytes(changes),
        }
    }
}

impl From<Etag> for [u8; BYTE_LEN] {
    fn from(etag: Etag) -> Self {
        etag.to_bytes()
    }
}

impl TryFrom<&[u8]> for Etag {
    type Error = EtagError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Etag::from_bytes(bytes)
    }
}

impl FromStr for Etag {
    type Err = EtagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Etag::parse(s)
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = hex::encode_upper(self.to_bytes());
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &digits[..8],
            &digits[8..12],
            &digits[12..16],
            &digits[16..20],
            &digits[20..]
        )
    }
}

// Serde serialization support
#[cfg(feature = "serde")]
impl Serialize for Etag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Etag {
    fn deserialize<D>(deserializer: D) -> Result<Etag, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Etag::parse(&s).map_err(|err| {
            tracing::debug!(input = %s, error = %err, "rejecting serialized etag");
            serde::de::Error::custom(err)
        })
    }
}
