//! Error bridge implementations for syntax-tree errors.
//!
//! This module provides `impl From<X> for PrivatizeError` conversions from the
//! AST crate's error types to the unified `PrivatizeError` type.
//!
//! These bridges live in the root crate rather than `privatize-core` because
//! core does not depend on the AST crate.

use privatize_ast::{prettify_error, ParserError};
use privatize_core::error::PrivatizeError;

/// A parser error together with the file it came from.
#[derive(Debug)]
pub(crate) struct SourceParseError<'s> {
    pub file: &'s str,
    pub source: &'s str,
    pub error: ParserError,
}

// ============================================================================
// Bridge: ParserError -> PrivatizeError
// ============================================================================

impl From<SourceParseError<'_>> for PrivatizeError {
    fn from(err: SourceParseError<'_>) -> Self {
        let start = err.error.start();
        PrivatizeError::ParseError {
            file: err.file.to_string(),
            line: u32::try_from(start.line).unwrap_or(u32::MAX),
            col: u32::try_from(start.column).unwrap_or(u32::MAX),
            message: err.error.message().to_string(),
            snippet: Some(prettify_error(&err.error, err.source, err.file)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use privatize_ast::{new_source_map, parse_source_file};
    use privatize_core::error::OutputErrorCode;

    #[test]
    fn parser_error_converts_with_location_and_snippet() {
        let source = "class A {\n    value = ;\n}\n";
        let cm = new_source_map();
        let error = parse_source_file(&cm, "a.ts", source).unwrap_err();
        let err = PrivatizeError::from(SourceParseError {
            file: "a.ts",
            source,
            error,
        });
        assert_eq!(err.error_code(), OutputErrorCode::ParseError);
        match err {
            PrivatizeError::ParseError {
                file,
                line,
                snippet,
                ..
            } => {
                assert_eq!(file, "a.ts");
                assert_eq!(line, 2);
                assert!(snippet.unwrap().contains("value = ;"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
