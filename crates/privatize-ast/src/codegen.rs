// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Printing syntax trees back to source.

use std::io;

use swc_common::sync::Lrc;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};

use crate::source::SourceFile;

/// Print `file` with the swc emitter, comments included.
///
/// The file's own comment store is left intact, so a file can be printed
/// any number of times.
///
/// ```
/// use privatize_ast::{new_source_map, parse_source_file, print_source_file};
///
/// let cm = new_source_map();
/// let file = parse_source_file(&cm, "a.ts", "// note\nlet a = 1;").unwrap();
/// let printed = print_source_file(&file).unwrap();
/// assert!(printed.contains("// note"));
/// assert!(printed.contains("let a = 1;"));
/// ```
pub fn print_source_file(file: &SourceFile) -> io::Result<String> {
    let cm = Lrc::clone(file.source_map());
    let comments = file.detached_comments();
    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: Default::default(),
            cm: cm.clone(),
            comments: Some(&comments),
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        emitter.emit_module(&file.module)?;
    }
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
