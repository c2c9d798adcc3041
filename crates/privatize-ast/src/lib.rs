// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! TypeScript front end for class-member rewriting, built on swc.
//!
//! This crate wraps the swc parser, syntax tree and code generator with the
//! pieces privatization needs on top of them.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_source_file`] turns source text into a [`SourceFile`]
//!   holding the swc [`Module`](swc_ecma_ast::Module) and its comments. Files
//!   parsed into one [`new_source_map`] have disjoint spans.
//! - **JSDoc**: [`leading_js_doc`] reads the `/** ... */` blocks in front of a
//!   node and parses their tags.
//! - **Construction**: [`NodeFactory`] updates swc nodes while keeping spans.
//! - **Code Generation**: [`print_source_file`] prints a tree back to source,
//!   comments included.
//!
//! # Quick Start
//!
//! ```
//! use privatize_ast::{new_source_map, parse_source_file, print_source_file};
//!
//! let cm = new_source_map();
//! let file = parse_source_file(&cm, "a.ts", "class A { private x = 1; }").unwrap();
//! assert!(print_source_file(&file).unwrap().contains("private x = 1;"));
//! ```

use std::cmp::min;

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// JSDoc parsing and lookup.
pub mod jsdoc;
pub use jsdoc::{leading_js_doc, JsDoc, JsDocTag};

/// Node construction and update helpers.
pub mod factory;
pub use factory::NodeFactory;

/// Printing syntax trees back to source.
pub mod codegen;
pub use codegen::print_source_file;

mod source;
pub use source::{new_source_map, parse_source_file, SourceFile};

mod errors;
pub use errors::{ParserError, Position, Result};

/// Whether `text` can be written as a bare identifier.
pub fn is_identifier_text(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or(source.len())
}

/// Formats a parser error into a human-readable string with source context.
///
/// # Arguments
///
/// * `err` - The parser error to format.
/// * `source` - The text that failed to parse.
/// * `label` - A label for the error (e.g., file name).
///
/// # Example
///
/// ```
/// use privatize_ast::{new_source_map, parse_source_file, prettify_error};
///
/// let source = "class {";
/// let cm = new_source_map();
/// if let Err(e) = parse_source_file(&cm, "a.ts", source) {
///     println!("{}", prettify_error(&e, source, "a.ts"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let start_pos = err.start();
    let end_pos = err.end();
    let context: i64 = 1;
    let line_start = start_pos.line.saturating_sub(context as usize).max(1);
    let start_offset = bol_offset(source, start_pos.line as i64 - context);
    let end_offset = bol_offset(source, end_pos.line as i64 + context + 1);
    let text = &source[start_offset..end_offset];
    let start = min(start_pos.offset.saturating_sub(start_offset), text.len());
    let end = min(end_pos.offset.saturating_sub(start_offset), text.len()).max(start);
    let end = if start == end { min(end + 1, text.len()) } else { end };
    let message = format!("{} at {}", err.message(), start_pos);

    let rendered = Renderer::plain()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(text)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&message)]),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================
