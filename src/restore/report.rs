//! Restore report

use serde::Serialize;

use crate::chain::ArchiveNum;

/// One object written to the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RestoredFile {
    pub path: String,
    pub content_archive: ArchiveNum,
    pub metadata_archive: ArchiveNum,
    pub bytes: u64,
}

/// A path the chain records as deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemovedPath {
    pub path: String,
    pub archive: ArchiveNum,
}

/// Outcome of a restore pass.
///
/// Removed, never-found and dangling paths are kept in separate lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Archive the target was restored as of
    pub target: Option<ArchiveNum>,
    pub restored: Vec<RestoredFile>,
    pub removed: Vec<RemovedPath>,
    pub not_found: Vec<String>,
    /// Paths skipped because the chain never saved them
    pub dangling: Vec<String>,
}

impl RestoreReport {
    pub fn new(target: Option<ArchiveNum>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Total bytes written.
    pub fn bytes_restored(&self) -> u64 {
        self.restored.iter().map(|f| f.bytes).sum()
    }

    /// True when no path was skipped because of a broken chain.
    pub fn is_consistent(&self) -> bool {
        self.dangling.is_empty()
    }
}
