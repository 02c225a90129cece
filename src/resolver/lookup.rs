//! LookupResult - the resolver's decision for one path

use std::fmt;

use serde::Serialize;

use crate::chain::ArchiveNum;

/// Restoration decision for one path.
///
/// `RemovedAt` and `NotFound` stay distinct all the way to restore reports:
/// one means "we hold a record that this was deleted", the other "we hold
/// nothing usable".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "archive", rename_all = "snake_case")]
pub enum LookupResult {
    /// `archive` holds the authoritative content.
    Found(ArchiveNum),
    /// Deleted as of `archive`. Only produced when removals are reported.
    #[serde(rename = "removed")]
    RemovedAt(ArchiveNum),
    /// No usable version in range.
    NotFound,
}

impl LookupResult {
    /// The archive to restore from, if any.
    pub fn found_archive(&self) -> Option<ArchiveNum> {
        match self {
            LookupResult::Found(archive) => Some(*archive),
            LookupResult::RemovedAt(_) | LookupResult::NotFound => None,
        }
    }

    /// The archive that recorded the removal, if any.
    pub fn removed_archive(&self) -> Option<ArchiveNum> {
        match self {
            LookupResult::RemovedAt(archive) => Some(*archive),
            LookupResult::Found(_) | LookupResult::NotFound => None,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        matches!(self, LookupResult::RemovedAt(_))
    }

    /// Short status name, as used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupResult::Found(_) => "found",
            LookupResult::RemovedAt(_) => "removed",
            LookupResult::NotFound => "not_found",
        }
    }
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupResult::Found(archive) => write!(f, "found in archive {}", archive),
            LookupResult::RemovedAt(archive) => write!(f, "removed as of archive {}", archive),
            LookupResult::NotFound => write!(f, "not found"),
        }
    }
}
