//! Data passed between `Rule::locate` and `Rule::transform`

use std::collections::BTreeMap;
use thiserror::Error;

use crate::span::Span;

/// Structural problems with a `Match` produced by a rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("end column {end} is before start column {start}")]
    Inverted { start: usize, end: usize },

    #[error("span {start}..={end} out of bounds for line length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("metadata text {found:?} does not match line text {expected:?}")]
    TextMismatch { expected: String, found: String },

    #[error("metadata text is empty")]
    EmptyText,
}

/// A rule-specific metadata value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Flag(bool),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Flag(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Open record carried from `locate` to `transform`.
///
/// `text` is mandatory and must equal the matched substring. Everything else a
/// rule needs (parsed value, detected field, case style...) goes in `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub text: String,
    fields: BTreeMap<&'static str, Value>,
}

impl Metadata {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<Value>) {
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(Value::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(Value::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(Value::Flag(v)) => Some(*v),
            _ => None,
        }
    }
}

/// A located candidate: inclusive column span plus metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    /// Inclusive end column
    pub end: usize,
    pub metadata: Metadata,
}

impl Match {
    pub fn new(start: usize, end: usize, metadata: Metadata) -> Self {
        Self {
            start,
            end,
            metadata,
        }
    }

    /// Build a match for `span` of `line`, filling `metadata.text` from the line
    pub fn from_span(line: &str, span: Span) -> Self {
        let text = line.get(span.range()).unwrap_or_default();
        Self::new(span.start, span.end, Metadata::new(text))
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn with(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Check the match against the line it was located on
    pub fn validate(&self, line: &str) -> Result<(), MatchError> {
        if self.end < self.start {
            return Err(MatchError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.metadata.text.is_empty() {
            return Err(MatchError::EmptyText);
        }
        let Some(actual) = line.get(self.start..self.end + 1) else {
            return Err(MatchError::OutOfBounds {
                start: self.start,
                end: self.end,
                len: line.len(),
            });
        };
        if actual != self.metadata.text {
            return Err(MatchError::TextMismatch {
                expected: actual.to_string(),
                found: self.metadata.text.clone(),
            });
        }
        Ok(())
    }
}

/// Result of `Rule::transform`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// New text; the engine keeps the cursor's offset within the token
    Text(String),
    /// New text plus an explicit cursor offset into it
    WithCursor { text: String, cursor_offset: usize },
}

impl Replacement {
    pub fn with_cursor(text: impl Into<String>, cursor_offset: usize) -> Self {
        Replacement::WithCursor {
            text: text.into(),
            cursor_offset,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Replacement::Text(text) => text,
            Replacement::WithCursor { text, .. } => text,
        }
    }

    pub fn cursor_offset(&self) -> Option<usize> {
        match self {
            Replacement::Text(_) => None,
            Replacement::WithCursor { cursor_offset, .. } => Some(*cursor_offset),
        }
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Text(text)
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Text(text.to_string())
    }
}
