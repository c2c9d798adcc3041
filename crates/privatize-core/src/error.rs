//! Error types and error code constants for privatize.
//!
//! `PrivatizeError` bridges errors from every subsystem (configuration,
//! file collection, parsing) into one type suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, bad config values)
//! - `3`: File errors (input not found, unreadable, unwritable)
//! - `4`: Parse errors (input is not valid source)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller.
    InvalidArguments = 2,
    /// Input files missing or unreadable, or output unwritable.
    FileError = 3,
    /// Source text failed to parse.
    ParseError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum PrivatizeError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Configuration file could not be read or decoded.
    #[error("config error in {path}: {message}")]
    ConfigError { path: String, message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Reading or writing a file failed.
    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },

    /// Source text failed to parse.
    #[error("parse error in {file} at {line}:{col}: {message}")]
    ParseError {
        file: String,
        line: u32,
        col: u32,
        message: String,
        /// Rendered source excerpt, when available.
        snippet: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&PrivatizeError> for OutputErrorCode {
    fn from(err: &PrivatizeError) -> Self {
        match err {
            PrivatizeError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            PrivatizeError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            PrivatizeError::FileNotFound { .. } => OutputErrorCode::FileError,
            PrivatizeError::Io { .. } => OutputErrorCode::FileError,
            PrivatizeError::ParseError { .. } => OutputErrorCode::ParseError,
            PrivatizeError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<PrivatizeError> for OutputErrorCode {
    fn from(err: PrivatizeError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl PrivatizeError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        PrivatizeError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        PrivatizeError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        PrivatizeError::FileNotFound { path: path.into() }
    }

    /// Create an io error for a path.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        PrivatizeError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PrivatizeError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_invalid_arguments() {
            let err = PrivatizeError::invalid_args("bad prefix");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn config_error_maps_to_invalid_arguments() {
            let err = PrivatizeError::ConfigError {
                path: "privatize.json".to_string(),
                message: "unknown field".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn file_errors_map_to_file_error() {
            let err = PrivatizeError::file_not_found("missing.ts");
            assert_eq!(err.error_code().code(), 3);
            let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
            let err = PrivatizeError::io("locked.ts", &io);
            assert_eq!(err.error_code(), OutputErrorCode::FileError);
        }

        #[test]
        fn parse_error_maps_to_parse_error() {
            let err = PrivatizeError::ParseError {
                file: "a.ts".to_string(),
                line: 3,
                col: 7,
                message: "expected ';', found '}'".to_string(),
                snippet: None,
            };
            assert_eq!(err.error_code().code(), 4);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = PrivatizeError::internal("unexpected state");
            assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod display {
        use super::*;

        #[test]
        fn parse_error_display_includes_location() {
            let err = PrivatizeError::ParseError {
                file: "a.ts".to_string(),
                line: 3,
                col: 7,
                message: "expected type".to_string(),
                snippet: None,
            };
            assert_eq!(err.to_string(), "parse error in a.ts at 3:7: expected type");
        }

        #[test]
        fn output_error_code_display() {
            assert_eq!(OutputErrorCode::FileError.to_string(), "3");
        }
    }
}
