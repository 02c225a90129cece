//! CLI-specific error types
//!
//! Subsystem errors are folded into a code plus message for the JSON error
//! response; the full subsystem error text is kept in the message.

use std::fmt;
use std::io;

use crate::catalog::CatalogError;
use crate::restore::RestoreError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout)
    IoError,
    /// Bad command line value
    InvalidArgument,
    /// Chain or catalog failed to load or resolve
    ChainError,
    /// Restore aborted
    RestoreFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::InvalidArgument => "CLI_INVALID_ARGUMENT",
            Self::ChainError => "CLI_CHAIN_ERROR",
            Self::RestoreFailed => "CLI_RESTORE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Invalid argument
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<regex::Error> for CliError {
    fn from(e: regex::Error) -> Self {
        Self::invalid_argument(format!("invalid --include pattern: {}", e))
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(CliErrorCode::ChainError, e.to_string())
    }
}

impl From<RestoreError> for CliError {
    fn from(e: RestoreError) -> Self {
        Self::new(CliErrorCode::RestoreFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_keeps_subsystem_code() {
        let err = CliError::from(CatalogError::unknown_archive("archive 9"));
        assert_eq!(err.code(), &CliErrorCode::ChainError);
        assert!(err.message().contains("CATALOG_UNKNOWN_ARCHIVE"));
        assert_eq!(err.code_str(), "CLI_CHAIN_ERROR");
    }

    #[test]
    fn test_regex_error_is_invalid_argument() {
        let err = CliError::from(regex::Regex::new("(").unwrap_err());
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }
}
