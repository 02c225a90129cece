//! Restore errors
//!
//! All restore errors are FATAL: a restore that hit one stopped at that
//! path, and files already written stay in the target directory.

use std::fmt;
use std::io;
use std::path::Path;

use crate::catalog::CatalogError;
use crate::observability::Severity;

use super::source::SourceError;

/// Restore error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreErrorCode {
    /// General restore failure
    RestoreFailed,
    /// I/O failure writing the target directory
    RestoreIo,
    /// The archive source could not supply content or metadata
    RestoreSource,
    /// A path would escape the target directory
    RestoreInvalidPath,
    /// Target file exists and overwriting was not requested
    RestoreTargetExists,
}

impl RestoreErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreErrorCode::RestoreFailed => "RESTORE_FAILED",
            RestoreErrorCode::RestoreIo => "RESTORE_IO",
            RestoreErrorCode::RestoreSource => "RESTORE_SOURCE",
            RestoreErrorCode::RestoreInvalidPath => "RESTORE_INVALID_PATH",
            RestoreErrorCode::RestoreTargetExists => "RESTORE_TARGET_EXISTS",
        }
    }

    /// Returns the severity level for this error code
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl fmt::Display for RestoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Restore error with full context
#[derive(Debug)]
pub struct RestoreError {
    code: RestoreErrorCode,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RestoreError {
    fn new(
        code: RestoreErrorCode,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source,
        }
    }

    /// Creates a general restore failure error
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(RestoreErrorCode::RestoreFailed, message, None)
    }

    /// Creates an I/O error at a specific path
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        let code = if source.kind() == io::ErrorKind::AlreadyExists {
            RestoreErrorCode::RestoreTargetExists
        } else {
            RestoreErrorCode::RestoreIo
        };
        Self::new(
            code,
            format!("I/O error at {}", path.display()),
            Some(Box::new(source)),
        )
    }

    /// Creates an invalid path error
    pub fn invalid_path(path: &str, source: CatalogError) -> Self {
        Self::new(
            RestoreErrorCode::RestoreInvalidPath,
            format!("refusing to restore '{}'", path),
            Some(Box::new(source)),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> RestoreErrorCode {
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

    /// Restore errors are always fatal
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code,
            self.message
        )?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for RestoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<SourceError> for RestoreError {
    fn from(err: SourceError) -> Self {
        Self::new(
            RestoreErrorCode::RestoreSource,
            "archive source failed",
            Some(Box::new(err)),
        )
    }
}

/// Result type for restore operations
pub type RestoreResult<T> = Result<T, RestoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RestoreErrorCode::RestoreFailed.as_str(), "RESTORE_FAILED");
        assert_eq!(RestoreErrorCode::RestoreIo.as_str(), "RESTORE_IO");
        assert_eq!(
            RestoreErrorCode::RestoreInvalidPath.as_str(),
            "RESTORE_INVALID_PATH"
        );
    }

    #[test]
    fn test_all_errors_are_fatal_severity() {
        let codes = [
            RestoreErrorCode::RestoreFailed,
            RestoreErrorCode::RestoreIo,
            RestoreErrorCode::RestoreSource,
            RestoreErrorCode::RestoreInvalidPath,
            RestoreErrorCode::RestoreTargetExists,
        ];

        for code in codes {
            assert_eq!(code.severity(), Severity::Fatal);
        }
    }

    #[test]
    fn test_already_exists_maps_to_target_exists() {
        let err = RestoreError::io_error_at_path(
            Path::new("out/etc/hosts"),
            io::Error::new(io::ErrorKind::AlreadyExists, "exists"),
        );
        assert_eq!(err.code(), RestoreErrorCode::RestoreTargetExists);

        let err = RestoreError::io_error_at_path(
            Path::new("out/etc/hosts"),
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert_eq!(err.code(), RestoreErrorCode::RestoreIo);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_source_error_conversion() {
        let err = RestoreError::from(SourceError::ObjectNotFound {
            archive: "full".into(),
            path: "etc/hosts".into(),
        });
        assert_eq!(err.code(), RestoreErrorCode::RestoreSource);
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("etc/hosts"));
    }
}
