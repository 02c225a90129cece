//! Chain registry and manifest errors
//!
//! Structured codes in CHAIN_* format. A chain that fails to load cannot be
//! resolved against, but nothing on disk is modified, so these are ERROR
//! severity rather than FATAL.

use std::fmt;
use std::io;
use std::path::Path;

use crate::observability::Severity;

/// Chain error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainErrorCode {
    /// Manifest unreadable, malformed or of an unknown format version
    ChainManifestInvalid,
    /// I/O failure reading or writing the manifest
    ChainIo,
    /// Archive name registered twice
    ChainDuplicateArchive,
    /// Archive creation time earlier than its predecessor
    ChainDateRegression,
    /// No archive numbers left to assign
    ChainNumberingExhausted,
    /// Checksum string not in `crc32:xxxxxxxx` form
    ChainChecksumFormat,
}

impl ChainErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainErrorCode::ChainManifestInvalid => "CHAIN_MANIFEST_INVALID",
            ChainErrorCode::ChainIo => "CHAIN_IO",
            ChainErrorCode::ChainDuplicateArchive => "CHAIN_DUPLICATE_ARCHIVE",
            ChainErrorCode::ChainDateRegression => "CHAIN_DATE_REGRESSION",
            ChainErrorCode::ChainNumberingExhausted => "CHAIN_NUMBERING_EXHAUSTED",
            ChainErrorCode::ChainChecksumFormat => "CHAIN_CHECKSUM_FORMAT",
        }
    }

    /// Returns the severity level for this error code
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for ChainErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chain error with full context
#[derive(Debug)]
pub struct ChainError {
    code: ChainErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl ChainError {
    fn new(code: ChainErrorCode, message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self {
            code,
            message: message.into(),
            source,
        }
    }

    /// Creates an invalid manifest error
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::new(ChainErrorCode::ChainManifestInvalid, message, None)
    }

    /// Creates an I/O error at a specific path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self::new(
            ChainErrorCode::ChainIo,
            format!("I/O error at {}", path.display()),
            Some(source),
        )
    }

    /// Creates a duplicate archive name error
    pub fn duplicate_archive(name: &str) -> Self {
        Self::new(
            ChainErrorCode::ChainDuplicateArchive,
            format!("archive '{}' is already registered", name),
            None,
        )
    }

    /// Creates a date regression error
    pub fn date_regression(name: &str, previous: &str) -> Self {
        Self::new(
            ChainErrorCode::ChainDateRegression,
            format!("archive '{}' is older than its predecessor '{}'", name, previous),
            None,
        )
    }

    /// Creates a numbering exhausted error
    pub fn numbering_exhausted() -> Self {
        Self::new(
            ChainErrorCode::ChainNumberingExhausted,
            "archive numbering exhausted",
            None,
        )
    }

    /// Creates a checksum format error
    pub fn checksum_format(value: &str) -> Self {
        Self::new(
            ChainErrorCode::ChainChecksumFormat,
            format!("malformed checksum '{}'", value),
            None,
        )
    }

    /// Returns the error code
    pub fn code(&self) -> ChainErrorCode {
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

    /// Chain errors never require process termination
    pub fn is_fatal(&self) -> bool {
        false
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
