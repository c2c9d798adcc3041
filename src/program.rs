//! A set of parsed source files that share one source map.

use privatize_ast::{new_source_map, parse_source_file, SourceFile};
use privatize_core::error::PrivatizeError;
use swc_common::sync::Lrc;
use swc_common::SourceMap;
use tracing::debug;

use crate::error_bridges::SourceParseError;

/// Parsed source files plus their text.
///
/// Every file is registered in one source map, so spans are unique across
/// the program and a resolver built over it can key on spans alone.
pub struct Program {
    source_map: Lrc<SourceMap>,
    files: Vec<SourceFile>,
    sources: Vec<String>,
}

impl Default for Program {
    fn default() -> Self {
        Program {
            source_map: new_source_map(),
            files: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `(file_name, source)` pair into one program.
    pub fn from_sources<I, N, S>(sources: I) -> Result<Self, PrivatizeError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut program = Program::new();
        for (file_name, source) in sources {
            program.add_file(file_name, source)?;
        }
        Ok(program)
    }

    /// Parse one more file into the program.
    pub fn add_file(
        &mut self,
        file_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<&SourceFile, PrivatizeError> {
        let file_name = file_name.into();
        let source = source.into();
        let file = parse_source_file(&self.source_map, &file_name, &source).map_err(|error| {
            PrivatizeError::from(SourceParseError {
                file: &file_name,
                source: &source,
                error,
            })
        })?;
        debug!(
            file = %file_name,
            items = file.module.body.len(),
            "parsed source file"
        );
        let index = self.files.len();
        self.files.push(file);
        self.sources.push(source);
        Ok(&self.files[index])
    }

    /// Files in the order they were added.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, file_name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    /// The text a file was parsed from.
    pub fn source_text(&self, file_name: &str) -> Option<&str> {
        self.files
            .iter()
            .position(|f| f.file_name == file_name)
            .map(|index| self.sources[index].as_str())
    }

    pub fn source_map(&self) -> &Lrc<SourceMap> {
        &self.source_map
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_keep_insertion_order_and_text() {
        let program =
            Program::from_sources([("b.ts", "let b = 2;"), ("a.ts", "let a = 1;")]).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.files()[0].file_name, "b.ts");
        assert_eq!(program.source_text("a.ts"), Some("let a = 1;"));
        assert!(program.file("c.ts").is_none());
    }

    #[test]
    fn spans_are_unique_across_files() {
        let program = Program::from_sources([("a.ts", "let a = 1;"), ("b.ts", "let a = 1;")])
            .unwrap();
        let (a, b) = (&program.files()[0].module, &program.files()[1].module);
        assert!(a.span.hi <= b.span.lo);
    }

    #[test]
    fn parse_failure_names_the_file() {
        let err = Program::from_sources([("ok.ts", "let a = 1;"), ("bad.ts", "class {")])
            .unwrap_err();
        match err {
            PrivatizeError::ParseError { file, .. } => assert_eq!(file, "bad.ts"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_program() {
        assert!(Program::new().is_empty());
    }
}
