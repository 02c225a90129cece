//! ArchiveNum - position of an archive in the chain
//!
//! - Positive, totally ordered (lower = older)
//! - Assigned once by the chain registry, never reused
//! - No two archives of one chain share a number

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A positive ordinal identifying one archive's position in the chain.
///
/// Zero is not representable. The only source of fresh numbers is
/// [`ChainRegistry::register`](super::ChainRegistry::register); `new` exists
/// for deserialization, tests and command-line input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ArchiveNum(NonZeroU32);

impl ArchiveNum {
    /// The first archive of every chain.
    pub const FIRST: ArchiveNum = ArchiveNum(NonZeroU32::MIN);

    /// Creates an archive number, or `None` for zero.
    #[inline]
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0.get()
    }

    /// Returns the number following this one, if it fits.
    #[inline]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ArchiveNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ArchiveNum> for u32 {
    fn from(num: ArchiveNum) -> Self {
        num.value()
    }
}

impl TryFrom<u32> for ArchiveNum {
    type Error = ZeroArchiveNum;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ArchiveNum::new(value).ok_or(ZeroArchiveNum)
    }
}

/// Rejection of archive number 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroArchiveNum;

impl fmt::Display for ZeroArchiveNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "archive numbers start at 1")
    }
}

impl std::error::Error for ZeroArchiveNum {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert!(ArchiveNum::new(0).is_none());
        assert_eq!(ArchiveNum::try_from(0), Err(ZeroArchiveNum));
    }

    #[test]
    fn test_first_and_next() {
        assert_eq!(ArchiveNum::FIRST.value(), 1);
        assert_eq!(ArchiveNum::FIRST.next(), ArchiveNum::new(2));
        assert_eq!(ArchiveNum::new(u32::MAX).unwrap().next(), None);
    }

    #[test]
    fn test_ordering_follows_value() {
        let older = ArchiveNum::new(3).unwrap();
        let newer = ArchiveNum::new(10).unwrap();
        assert!(older < newer);
        assert_eq!(older.max(newer), newer);
    }

    #[test]
    fn test_serde_as_plain_number() {
        let num = ArchiveNum::new(7).unwrap();
        assert_eq!(serde_json::to_string(&num).unwrap(), "7");
        assert_eq!(serde_json::from_str::<ArchiveNum>("7").unwrap(), num);
        assert!(serde_json::from_str::<ArchiveNum>("0").is_err());
    }
}
