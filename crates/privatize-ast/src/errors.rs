// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use thiserror::Error;

/// A location in source text. Lines and columns count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of byte `offset` in `source`, clamped to the text.
    pub fn at(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Position {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A syntax error reported by the swc parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parser error: {message} at {start}")]
pub struct ParserError {
    message: String,
    start: Position,
    end: Position,
}

impl ParserError {
    pub(crate) fn new(message: impl Into<String>, start: Position, end: Position) -> Self {
        ParserError {
            message: message.into(),
            start,
            end,
        }
    }

    /// Where the error starts.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Where the error ends.
    pub fn end(&self) -> Position {
        self.end
    }

    /// The message without location information.
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_count_lines_and_columns_from_one() {
        let source = "let a;\nlet bc = ;\n";
        assert_eq!(
            Position::at(source, 0),
            Position {
                offset: 0,
                line: 1,
                column: 1
            }
        );
        let second = Position::at(source, 16);
        assert_eq!((second.line, second.column), (2, 10));
        assert_eq!(second.to_string(), "2:10");
    }

    #[test]
    fn positions_clamp_to_the_text() {
        let end = Position::at("ab", 99);
        assert_eq!(end.offset, 2);
        assert_eq!((end.line, end.column), (1, 3));
        // Offset inside a multi-byte character backs up to its start.
        let inside = Position::at("é", 1);
        assert_eq!(inside.offset, 0);
    }
}
