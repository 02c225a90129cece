//! Catalog errors
//!
//! Structured CATALOG_* codes. Integrity failures (checksum mismatch,
//! archive missing its catalog) are reported the same way as parse
//! failures: the chain cannot be trusted, but nothing was modified.
//! Resolver faults surfacing through the walker keep their FATAL severity.

use std::fmt;
use std::io;
use std::path::Path;

use crate::chain::{ArchiveNum, ChainError};
use crate::observability::Severity;
use crate::resolver::ResolverError;

/// Catalog error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Catalog file unreadable or malformed
    CatalogInvalid,
    /// I/O failure reading or writing a catalog
    CatalogIo,
    /// Catalog bytes do not match the manifest checksum
    CatalogChecksumMismatch,
    /// Path rejected (empty, absolute, or escaping the restore root)
    CatalogInvalidPath,
    /// Path recorded twice in one catalog
    CatalogDuplicatePath,
    /// Archive number not registered, or registered archive lacking a catalog
    CatalogUnknownArchive,
    /// Chain registry or manifest failure
    CatalogChain,
    /// The walker violated the resolver feed contract
    CatalogResolverFault,
}

impl CatalogErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogErrorCode::CatalogInvalid => "CATALOG_INVALID",
            CatalogErrorCode::CatalogIo => "CATALOG_IO",
            CatalogErrorCode::CatalogChecksumMismatch => "CATALOG_CHECKSUM_MISMATCH",
            CatalogErrorCode::CatalogInvalidPath => "CATALOG_INVALID_PATH",
            CatalogErrorCode::CatalogDuplicatePath => "CATALOG_DUPLICATE_PATH",
            CatalogErrorCode::CatalogUnknownArchive => "CATALOG_UNKNOWN_ARCHIVE",
            CatalogErrorCode::CatalogChain => "CATALOG_CHAIN",
            CatalogErrorCode::CatalogResolverFault => "CATALOG_RESOLVER_FAULT",
        }
    }

    /// Returns the severity level for this error code
    pub fn severity(&self) -> Severity {
        match self {
            CatalogErrorCode::CatalogResolverFault => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog error with full context
#[derive(Debug)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CatalogError {
    fn new(
        code: CatalogErrorCode,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source,
        }
    }

    /// Creates an invalid catalog error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorCode::CatalogInvalid, message, None)
    }

    /// Creates an I/O error at a specific path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self::new(
            CatalogErrorCode::CatalogIo,
            format!("I/O error at {}", path.display()),
            Some(Box::new(source)),
        )
    }

    /// Creates a checksum mismatch error
    pub fn checksum_mismatch(path: &Path, expected: &str, actual: &str) -> Self {
        Self::new(
            CatalogErrorCode::CatalogChecksumMismatch,
            format!(
                "{}: expected {}, found {}",
                path.display(),
                expected,
                actual
            ),
            None,
        )
    }

    /// Creates an invalid path error
    pub fn invalid_path(path: &str, reason: &str) -> Self {
        Self::new(
            CatalogErrorCode::CatalogInvalidPath,
            format!("'{}': {}", path, reason),
            None,
        )
    }

    /// Creates a duplicate path error
    pub fn duplicate_path(archive: ArchiveNum, path: &str) -> Self {
        Self::new(
            CatalogErrorCode::CatalogDuplicatePath,
            format!("archive {} records '{}' twice", archive, path),
            None,
        )
    }

    /// Creates an unknown archive error
    pub fn unknown_archive(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorCode::CatalogUnknownArchive, message, None)
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity of this error
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Only resolver faults are fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ChainError> for CatalogError {
    fn from(err: ChainError) -> Self {
        let message = err.message().to_string();
        Self::new(CatalogErrorCode::CatalogChain, message, Some(Box::new(err)))
    }
}

impl From<ResolverError> for CatalogError {
    fn from(err: ResolverError) -> Self {
        let message = err.message().to_string();
        Self::new(
            CatalogErrorCode::CatalogResolverFault,
            message,
            Some(Box::new(err)),
        )
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
