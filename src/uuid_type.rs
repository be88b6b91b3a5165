//! Category tags carried in the high byte of an etag's `restarts` field.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::etag::EtagError;

/// The kind of record sequence an [`Etag`](crate::Etag) belongs to.
///
/// The discriminant is packed into bits 56..64 of `restarts`, so etags from
/// different sequences never collide even when their counters do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum UuidType {
    Documents = 1,
    Attachments = 2,
    DocumentTransactions = 3,
    MappedResults = 4,
    ReduceResults = 5,
    ScheduledReductions = 6,
    Queue = 7,
    Tasks = 8,
    Indexing = 9,
}

impl UuidType {
    /// The raw tag byte.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Shift the tag into the high byte of a `restarts` value.
    pub(crate) const fn shifted(self) -> i64 {
        (self as i64) << 56
    }
}

impl TryFrom<u8> for UuidType {
    type Error = EtagError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(UuidType::Documents),
            2 => Ok(UuidType::Attachments),
            3 => Ok(UuidType::DocumentTransactions),
            4 => Ok(UuidType::MappedResults),
            5 => Ok(UuidType::ReduceResults),
            6 => Ok(UuidType::ScheduledReductions),
            7 => Ok(UuidType::Queue),
            8 => Ok(UuidType::Tasks),
            9 => Ok(UuidType::Indexing),
            other => Err(EtagError::UnknownCategory(other)),
        }
    }
}

impl From<UuidType> for u8 {
    fn from(value: UuidType) -> Self {
        value.tag()
    }
}

impl fmt::Display for UuidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
