// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parsed source files.
//!
//! Every file of a program is registered in one shared [`SourceMap`], so byte
//! positions (and therefore spans) are unique across files. Comments live
//! beside the tree in a [`SingleThreadedComments`] store keyed by position.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use swc_common::comments::SingleThreadedComments;
use swc_common::sync::Lrc;
use swc_common::{FileName, FilePathMapping, SourceMap, Span, Spanned};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};

use crate::errors::{ParserError, Position, Result};

/// A new, empty source map for a program.
pub fn new_source_map() -> Lrc<SourceMap> {
    Lrc::new(SourceMap::new(FilePathMapping::empty()))
}

/// One parsed TypeScript file.
#[derive(Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub module: Module,
    /// Comments by position. Clones share the same store.
    pub comments: SingleThreadedComments,
    source_map: Lrc<SourceMap>,
}

impl SourceFile {
    pub fn source_map(&self) -> &Lrc<SourceMap> {
        &self.source_map
    }

    /// Replace the tree, keeping the comments and source map.
    pub fn map_module(self, f: impl FnOnce(Module) -> Module) -> SourceFile {
        SourceFile {
            module: f(self.module),
            ..self
        }
    }

    /// A copy of the comment store that does not share state with this file.
    ///
    /// The printer consumes comments as it emits them, so it works on a copy.
    pub fn detached_comments(&self) -> SingleThreadedComments {
        let (leading, trailing) = self.comments.borrow_all();
        SingleThreadedComments::from_leading_and_trailing(
            Rc::new(RefCell::new((*leading).clone())),
            Rc::new(RefCell::new((*trailing).clone())),
        )
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("file_name", &self.file_name)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

fn syntax_for(file_name: &str) -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: file_name.ends_with(".tsx"),
        decorators: true,
        ..Default::default()
    })
}

/// Parses TypeScript source text into a [`SourceFile`] registered in
/// `source_map`.
///
/// Recoverable syntax errors are reported the same as fatal ones.
///
/// # Example
///
/// ```
/// use privatize_ast::{new_source_map, parse_source_file};
/// use swc_ecma_ast::{ModuleItem, Stmt};
///
/// let cm = new_source_map();
/// let file = parse_source_file(&cm, "x.ts", "let x = 1;").unwrap();
/// assert!(matches!(file.module.body[0], ModuleItem::Stmt(Stmt::Decl(_))));
/// ```
pub fn parse_source_file(
    source_map: &Lrc<SourceMap>,
    file_name: &str,
    source: &str,
) -> Result<SourceFile> {
    let fm = source_map.new_source_file(
        Lrc::new(FileName::Real(PathBuf::from(file_name))),
        source.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let to_error = |span: Span, message: String| {
        let start = span.lo.0.saturating_sub(fm.start_pos.0) as usize;
        let end = span.hi.0.saturating_sub(fm.start_pos.0) as usize;
        ParserError::new(message, Position::at(source, start), Position::at(source, end))
    };

    let module = {
        let lexer = Lexer::new(
            syntax_for(file_name),
            Default::default(),
            StringInput::from(&*fm),
            Some(&comments),
        );
        let mut parser = Parser::new_from(lexer);
        let module = parser
            .parse_module()
            .map_err(|e| to_error(e.span(), e.kind().msg().into_owned()))?;
        if let Some(e) = parser.take_errors().into_iter().next() {
            return Err(to_error(e.span(), e.kind().msg().into_owned()));
        }
        module
    };

    Ok(SourceFile {
        file_name: file_name.to_string(),
        module,
        comments,
        source_map: Lrc::clone(source_map),
    })
}
