//! Per-archive state of one path, and the observation pairing it with an
//! archive number.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ArchiveNum;

/// The record an archive's catalog holds for one path.
///
/// A path the catalog does not mention at all has no `ObjectState`; that
/// case is represented by absence, never by `Removed`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectState {
    /// The archive stores the object's content (full copy or delta).
    Saved,
    /// The object existed, identical to an older archive; no bytes stored here.
    Unchanged,
    /// Tombstone: the object was deleted before this archive was taken.
    Removed,
}

impl ObjectState {
    /// Returns the catalog spelling of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectState::Saved => "saved",
            ObjectState::Unchanged => "unchanged",
            ObjectState::Removed => "removed",
        }
    }

    /// True for `Saved` and `Removed`, the states that end a resolution scan.
    #[inline]
    pub fn is_decisive(&self) -> bool {
        !matches!(self, ObjectState::Unchanged)
    }
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One archive's statement about one path.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Observation {
    archive: ArchiveNum,
    state: ObjectState,
}

impl Observation {
    #[inline]
    pub fn new(archive: ArchiveNum, state: ObjectState) -> Self {
        Self { archive, state }
    }

    #[inline]
    pub fn archive(&self) -> ArchiveNum {
        self.archive
    }

    #[inline]
    pub fn state(&self) -> ObjectState {
        self.state
    }
}
