//! Accessors the engine consumes from its host, plus an in-memory buffer

use crate::span::{Cursor, Selection};

/// Line-level text access. The engine always replaces whole lines.
pub trait LineAccessor {
    fn line(&self, row: usize) -> Option<String>;
    fn set_line(&mut self, row: usize, text: String);
}

pub trait CursorAccessor {
    fn cursor(&self) -> Cursor;
    fn set_cursor(&mut self, cursor: Cursor);
}

/// Selection access, only consulted in range mode
pub trait SelectionAccessor {
    fn selection(&self) -> Option<Selection>;
}

/// Everything the engine needs from a host
pub trait Host: LineAccessor + CursorAccessor + SelectionAccessor {}

impl<T: LineAccessor + CursorAccessor + SelectionAccessor> Host for T {}

/// A simple line-based buffer implementing `Host`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: Cursor,
    selection: Option<Selection>,
}

impl TextBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: Cursor::default(),
            selection: None,
        }
    }

    /// Split `text` into lines. A trailing newline does not add an empty line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn with_cursor(mut self, row: usize, col: usize) -> Self {
        self.cursor = Cursor::new(row, col);
        self
    }

    pub fn select(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl LineAccessor for TextBuffer {
    fn line(&self, row: usize) -> Option<String> {
        self.lines.get(row).cloned()
    }

    fn set_line(&mut self, row: usize, text: String) {
        if let Some(line) = self.lines.get_mut(row) {
            *line = text;
        }
    }
}

impl CursorAccessor for TextBuffer {
    fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}

impl SelectionAccessor for TextBuffer {
    fn selection(&self) -> Option<Selection> {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        let buffer = TextBuffer::from_text("a\nb\n");
        assert_eq!(buffer.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(buffer.text(), "a\nb");
    }

    #[test]
    fn test_set_line_out_of_range_is_ignored() {
        let mut buffer = TextBuffer::from_text("a");
        buffer.set_line(3, "x".to_string());
        assert_eq!(buffer.text(), "a");
        buffer.set_line(0, "x".to_string());
        assert_eq!(buffer.line(0).as_deref(), Some("x"));
    }
}
