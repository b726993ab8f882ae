//! Byte ranges and line/column positions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range `[start, end)` in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Creates a new range. `start` and `end` are swapped if given out of order.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty range at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Narrows the range so that it neither starts nor ends with whitespace.
    pub fn trim_whitespace(&self, text: &str) -> TextRange {
        let end = self.end.min(text.len());
        let start = self.start.min(end);
        let Some(slice) = text.get(start..end) else {
            return *self;
        };
        let leading = slice.len() - slice.trim_start().len();
        let trailing = slice.len() - slice.trim_end().len();
        if leading == slice.len() {
            return TextRange::empty(start + leading);
        }
        TextRange::new(start + leading, end - trailing)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A position in a text document (0-indexed line and character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Converts between byte offsets and line/column positions.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text: String,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// Convert a position to a byte offset, clamping past-the-end columns to the line end.
    pub fn offset(&self, pos: Position) -> usize {
        let Some(&line_start) = self.line_starts.get(pos.line as usize) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(pos.line as usize + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[line_start..line_end];
        let column = line
            .char_indices()
            .nth(pos.character as usize)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        line_start + column
    }

    /// Convert a byte offset to a position.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset].chars().count();
        Position::new(line as u32, character as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_whitespace() {
        let text = "let x =  1 + 2 ;";
        let range = TextRange::new(7, 15).trim_whitespace(text);
        assert_eq!(&text[range.start..range.end], "1 + 2");
    }

    #[test]
    fn test_trim_whitespace_only() {
        let text = "a    b";
        let range = TextRange::new(1, 5).trim_whitespace(text);
        assert!(range.is_empty());
    }

    #[test]
    fn test_new_orders_bounds() {
        assert_eq!(TextRange::new(5, 2), TextRange::new(2, 5));
    }

    #[test]
    fn test_position_to_offset() {
        let index = LineIndex::new("line one\nline two\nline three");

        assert_eq!(index.offset(Position::new(0, 0)), 0);
        assert_eq!(index.offset(Position::new(1, 0)), 9);
        assert_eq!(index.offset(Position::new(1, 4)), 13);
        assert_eq!(index.offset(Position::new(1, 40)), 17);
        assert_eq!(index.offset(Position::new(9, 0)), 28);
    }

    #[test]
    fn test_offset_to_position() {
        let index = LineIndex::new("line one\nline two\nline three");

        let pos = index.position(13);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.character, 4);
        assert_eq!(index.position(9), Position::new(1, 0));
    }

    #[test]
    fn test_multibyte_columns() {
        let index = LineIndex::new("let s = \"é\";\nx");
        let offset = index.offset(Position::new(0, 10));
        assert_eq!(&"let s = \"é\";\nx"[offset..offset + 1], "\"");
        assert_eq!(index.position(offset), Position::new(0, 10));
    }
}
