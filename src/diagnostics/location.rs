//! Source location tracking for diagnostics

use crate::program::FileId;
use std::fmt;

/// A position in source text (1-indexed, as printed to users)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Character within the line (1-indexed, counted in chars)
    pub character: usize,
}

impl Position {
    /// Create a new position
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    /// Start of a file
    pub const fn start() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

/// Precomputed line starts for offset → position conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text: String,
}

impl LineIndex {
    /// Index the given source text
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// Convert a byte offset into a 1-indexed position
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        Position::new(line + 1, character + 1)
    }

    /// Number of lines in the text
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// File plus optional position, attached to every error
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct SourceLocation {
    /// File the error originates from
    pub file: FileId,
    /// Position inside the file, when known
    pub position: Option<Position>,
}

impl SourceLocation {
    /// Location with a known position
    pub fn new(file: FileId, position: Position) -> Self {
        Self {
            file,
            position: Some(position),
        }
    }

    /// Location that only names a file
    pub fn file(file: FileId) -> Self {
        Self {
            file,
            position: None,
        }
    }

    /// Location at the start of a file
    pub fn file_start(file: FileId) -> Self {
        Self::new(file, Position::start())
    }

    /// Location for errors that are not tied to any file
    pub fn unknown() -> Self {
        Self::file_start(FileId::unknown())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{}:{}", self.file, position),
            None => write!(f, "{}", self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let index = LineIndex::new("const a = 1;\nexport default a;\n");
        assert_eq!(index.position(0), Position::new(1, 1));
        assert_eq!(index.position(6), Position::new(1, 7));
        assert_eq!(index.position(13), Position::new(2, 1));
        assert_eq!(index.position(28), Position::new(2, 16));
        assert_eq!(index.line_count(), 3);
    }

    #[test]
    fn test_line_index_counts_chars_not_bytes() {
        let index = LineIndex::new("const é = 'ü';");
        // 'é' is two bytes; the quote after '=' sits at byte 11, char 10
        assert_eq!(index.position(11), Position::new(1, 11));
    }

    #[test]
    fn test_location_display() {
        let location = SourceLocation::new(FileId::new("/a/b.ts"), Position::new(3, 4));
        assert_eq!(location.to_string(), "/a/b.ts:3:4");
        assert_eq!(SourceLocation::file(FileId::new("x.ts")).to_string(), "x.ts");
    }
}
