//! Resolver faults
//!
//! Every resolver error is a programming fault in the caller that feeds
//! observations (the chain walker), never a property of the backup data.
//! All codes are FATAL: the resolution pass that hit one cannot be trusted.

use std::fmt;

use crate::chain::ArchiveNum;
use crate::observability::Severity;

/// Resolver error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverErrorCode {
    /// The same archive was fed twice for one path
    ResolverDuplicateArchive,
    /// An archive was fed after a newer-or-equal one was already fed
    ResolverOutOfOrder,
    /// An observation was added after the decision was read
    ResolverSealed,
}

impl ResolverErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverErrorCode::ResolverDuplicateArchive => "RESOLVER_DUPLICATE_ARCHIVE",
            ResolverErrorCode::ResolverOutOfOrder => "RESOLVER_OUT_OF_ORDER",
            ResolverErrorCode::ResolverSealed => "RESOLVER_SEALED",
        }
    }

    /// Returns the severity level for this error code
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for ResolverErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rejected `CandidateSet::add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverError {
    code: ResolverErrorCode,
    /// Archive number of the rejected observation
    archive: ArchiveNum,
    message: String,
}

impl ResolverError {
    fn new(code: ResolverErrorCode, archive: ArchiveNum, message: String) -> Self {
        Self {
            code,
            archive,
            message,
        }
    }

    /// Creates a duplicate archive fault
    pub fn duplicate_archive(archive: ArchiveNum) -> Self {
        Self::new(
            ResolverErrorCode::ResolverDuplicateArchive,
            archive,
            format!("archive {} already observed for this path", archive),
        )
    }

    /// Creates an ordering fault
    pub fn out_of_order(archive: ArchiveNum, previous: ArchiveNum) -> Self {
        Self::new(
            ResolverErrorCode::ResolverOutOfOrder,
            archive,
            format!(
                "archive {} fed after archive {}; observations must be newest first",
                archive, previous
            ),
        )
    }

    /// Creates a mutation-after-read fault
    pub fn sealed(archive: ArchiveNum) -> Self {
        Self::new(
            ResolverErrorCode::ResolverSealed,
            archive,
            format!("archive {} fed after the decision was read", archive),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> ResolverErrorCode {
        self.code
    }

    /// Returns the archive number of the rejected observation
    pub fn archive(&self) -> ArchiveNum {
        self.archive
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity of this error
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Resolver faults are always fatal to the pass
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for ResolverError {}

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;
