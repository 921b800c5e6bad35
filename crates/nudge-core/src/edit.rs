//! Column-span editing of a single line

use thiserror::Error;

use crate::span::Span;

/// Errors that can occur during edit application
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Overlapping edits detected at column {0}")]
    OverlappingEdits(usize),

    #[error("Edit span {start}..{end} out of bounds for line length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

/// Replacement of one column span of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start column
    pub start: usize,
    /// Exclusive end column
    pub end: usize,
    /// The replacement text
    pub replacement: String,
    /// Rule that produced the edit
    pub rule: String,
}

impl Edit {
    pub fn new(span: Span, replacement: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end + 1,
            replacement: replacement.into(),
            rule: rule.into(),
        }
    }
}

/// Apply edits to a line
///
/// Edits are applied in reverse order (from end to start) so that earlier
/// edits never invalidate the columns of edits not yet applied.
///
/// # Returns
/// * `Ok(String)` - The modified line
/// * `Err(EditError)` - If edits overlap or are out of bounds
pub fn apply_edits(line: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(line.to_string());
    }

    // Sort edits by start position (descending) for safe replacement
    let mut sorted_edits: Vec<&Edit> = edits.iter().collect();
    sorted_edits.sort_by(|a, b| b.start.cmp(&a.start));

    let line_len = line.len();
    let mut prev_start: Option<usize> = None;

    for edit in &sorted_edits {
        if edit.end > line_len
            || edit.start > edit.end
            || !line.is_char_boundary(edit.start)
            || !line.is_char_boundary(edit.end)
        {
            return Err(EditError::SpanOutOfBounds {
                start: edit.start,
                end: edit.end,
                len: line_len,
            });
        }

        if let Some(prev) = prev_start {
            if edit.end > prev {
                return Err(EditError::OverlappingEdits(edit.start));
            }
        }

        prev_start = Some(edit.start);
    }

    let mut result = line.to_string();
    for edit in sorted_edits {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let edit = Edit::new(Span::new(4, 6), "124", "integer");
        let result = apply_edits("foo 123 bar", &[edit]).unwrap();
        assert_eq!(result, "foo 124 bar");
    }

    #[test]
    fn test_multiple_edits_growing() {
        let edits = vec![
            Edit::new(Span::new(0, 0), "10", "integer"),
            Edit::new(Span::new(2, 2), "10", "integer"),
        ];
        let result = apply_edits("9 9", &edits).unwrap();
        assert_eq!(result, "10 10");
    }

    #[test]
    fn test_empty_edits() {
        assert_eq!(apply_edits("unchanged", &[]).unwrap(), "unchanged");
    }

    #[test]
    fn test_out_of_bounds() {
        let edit = Edit::new(Span::new(0, 100), "x", "oob");
        let result = apply_edits("short", &[edit]);
        assert!(matches!(result, Err(EditError::SpanOutOfBounds { .. })));
    }

    #[test]
    fn test_overlapping() {
        let edits = vec![
            Edit::new(Span::new(0, 3), "a", "one"),
            Edit::new(Span::new(2, 4), "b", "two"),
        ];
        let result = apply_edits("abcdef", &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }
}
