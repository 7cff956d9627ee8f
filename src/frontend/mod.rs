//! The parts of the frontend the backend depends on: the source file a module
//! came from, spans into it, interned identifiers, and the AST handed over by
//! the parser.

use std::path::PathBuf;

pub mod ast;
pub mod intern;

#[derive(Debug)]
pub struct SourceFile {
    pub contents: String,
    pub origin: SourceFileOrigin,
}

impl SourceFile {
    pub fn memory(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            origin: SourceFileOrigin::Memory,
        }
    }

    pub fn value_of_span(&self, span: Span) -> &str {
        &self.contents[span.start..span.end]
    }

    /// 1-based line number of the byte at `position`
    pub fn row_for_position(&self, position: usize) -> usize {
        let position = position.min(self.contents.len());

        self.contents.as_bytes()[..position]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1
    }

    /// 1-based column of the byte at `position`
    pub fn column_for_position(&self, position: usize) -> usize {
        let position = position.min(self.contents.len());

        let line_start = self.contents.as_bytes()[..position]
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);

        position - line_start + 1
    }

    pub fn format_span_position(&self, span: Span) -> String {
        format!(
            "{}:{}:{}",
            self.origin,
            self.row_for_position(span.start),
            self.column_for_position(span.start)
        )
    }
}

#[derive(Debug)]
pub enum SourceFileOrigin {
    Memory,
    File(PathBuf),
}

impl core::fmt::Display for SourceFileOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFileOrigin::Memory => f.write_str("<memory>"),
            SourceFileOrigin::File(path) => f.write_fmt(format_args!("{}", path.display())),
        }
    }
}

/// Byte range into a [`SourceFile`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let source = SourceFile::memory("def main() {\n    return x;\n}\n");
        let x = source.contents.find('x').unwrap();

        assert_eq!(source.row_for_position(0), 1);
        assert_eq!(source.column_for_position(0), 1);
        assert_eq!(source.row_for_position(x), 2);
        assert_eq!(source.column_for_position(x), 12);
        assert_eq!(
            source.format_span_position(Span::new(x, x + 1)),
            "<memory>:2:12"
        );
    }

    #[test]
    fn positions_past_the_end_are_clamped() {
        let source = SourceFile::memory("a\nb");

        assert_eq!(source.row_for_position(100), 2);
        assert_eq!(source.column_for_position(100), 2);
    }
}
