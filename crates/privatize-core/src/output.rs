//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** Absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigValue, ResolvedConfig};
use crate::error::{OutputErrorCode, PrivatizeError};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// A position in a source file (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a PrivatizeError.
    pub fn from_error(err: &PrivatizeError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            PrivatizeError::InvalidArguments { details, .. } => (details.clone(), None),
            PrivatizeError::ParseError {
                file,
                line,
                col,
                snippet,
                ..
            } => (
                snippet
                    .as_ref()
                    .map(|s| serde_json::json!({ "snippet": s })),
                Some(Location::new(file.clone(), *line, *col)),
            ),
            PrivatizeError::FileNotFound { path } | PrivatizeError::Io { path, .. } => {
                (Some(serde_json::json!({ "path": path })), None)
            }
            PrivatizeError::ConfigError { path, .. } => {
                (Some(serde_json::json!({ "config_file": path })), None)
            }
            PrivatizeError::InternalError { .. } => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

/// Response envelope for failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a PrivatizeError.
    pub fn from_error(err: &PrivatizeError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Transform
// ============================================================================

/// Outcome for one transformed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Input path as given or discovered.
    pub path: String,
    /// Where the output was written, when `--out-dir` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
    /// The transformed source, when not written to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Response for `privatize transform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformResponse {
    pub status: String,
    pub schema_version: String,
    pub include_internal: bool,
    pub prefix: String,
    pub files: Vec<FileResult>,
}

impl TransformResponse {
    pub fn new(include_internal: bool, prefix: impl Into<String>, files: Vec<FileResult>) -> Self {
        TransformResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            include_internal,
            prefix: prefix.into(),
            files,
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// One configuration value and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry<T> {
    pub value: T,
    pub source: String,
}

impl<T: Clone> From<&ConfigValue<T>> for ConfigEntry<T> {
    fn from(value: &ConfigValue<T>) -> Self {
        ConfigEntry {
            value: value.value.clone(),
            source: value.source.as_str().to_string(),
        }
    }
}

/// Response for `privatize config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub status: String,
    pub schema_version: String,
    pub include_internal: ConfigEntry<bool>,
    pub prefix: ConfigEntry<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
}

impl ConfigResponse {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        ConfigResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            include_internal: ConfigEntry::from(&config.include_internal),
            prefix: ConfigEntry::from(&config.prefix),
            config_file: config
                .config_file
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;

    #[test]
    fn status_is_first_field() {
        let response = TransformResponse::new(false, "_", vec![]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with(r#"{"status":"ok","schema_version":"1""#), "{}", json);
    }

    #[test]
    fn error_response_carries_code_and_location() {
        let err = PrivatizeError::ParseError {
            file: "a.ts".to_string(),
            line: 2,
            col: 5,
            message: "expected expression, found ';'".to_string(),
            snippet: None,
        };
        let response = ErrorResponse::from_error(&err);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], 4);
        assert_eq!(value["error"]["location"]["file"], "a.ts");
        assert_eq!(value["error"]["location"]["line"], 2);
        assert!(value["error"].get("details").is_none());
    }

    #[test]
    fn invalid_argument_details_are_passed_through() {
        let err = PrivatizeError::invalid_args_with_details(
            "bad prefix",
            serde_json::json!({ "prefix": "1x" }),
        );
        let info = ErrorInfo::from_error(&err);
        assert_eq!(info.code, 2);
        assert_eq!(info.details.unwrap()["prefix"], "1x");
    }

    #[test]
    fn file_result_omits_absent_fields() {
        let result = FileResult {
            path: "a.ts".to_string(),
            written_to: None,
            output: Some("class A {}\n".to_string()),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("written_to"));
        assert!(json.contains("output"));
    }

    #[test]
    fn config_response_reports_sources() {
        let config = ResolvedConfig {
            prefix: ConfigValue::new("p_".to_string(), ConfigSource::CliFlag),
            ..ResolvedConfig::default()
        };
        let response = ConfigResponse::from_resolved(&config);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["prefix"]["value"], "p_");
        assert_eq!(value["prefix"]["source"], "cli_flag");
        assert_eq!(value["include_internal"]["source"], "default");
        assert!(value.get("config_file").is_none());
    }

    #[test]
    fn emit_response_writes_pretty_json_line() {
        let mut buf = Vec::new();
        emit_response(&TransformResponse::new(true, "_", vec![]), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"status\": \"ok\""));
    }
}
