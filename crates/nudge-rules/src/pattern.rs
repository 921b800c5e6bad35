//! Regex-plus-closure rules

use std::sync::Arc;

use nudge_core::scorer::best_span;
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span, DEFAULT_PRIORITY};
use regex::Regex;

/// Maps the matched text and a delta to the new text, or `None` at a boundary
pub type TransformFn = Arc<dyn Fn(&str, i64) -> Option<String> + Send + Sync>;

/// A rule defined by a regex and a closure.
///
/// When the regex has a first capture group, the group is the span that is
/// replaced; the rest of the regex is context only.
pub struct PatternRule {
    id: String,
    re: Regex,
    priority: i32,
    cyclic: bool,
    transform: TransformFn,
}

impl PatternRule {
    pub fn new<F>(id: impl Into<String>, re: Regex, transform: F) -> Self
    where
        F: Fn(&str, i64) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            re,
            priority: DEFAULT_PRIORITY,
            cyclic: false,
            transform: Arc::new(transform),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    /// Markdown ATX header level, `#` to `######`
    pub fn markdown_header() -> Self {
        Self::new(
            "markdown_header",
            Regex::new(r"^(#{1,6})(?:\s|$)").unwrap(),
            |text, delta| {
                let level = i64::try_from(text.len()).ok()?;
                let next = level.saturating_add(delta).clamp(1, 6);
                (next != level).then(|| "#".repeat(next as usize))
            },
        )
        .with_priority(60)
    }
}

impl Rule for PatternRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Custom regex rule"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn cyclic(&self) -> bool {
        self.cyclic
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self.re.captures_iter(line).filter_map(|caps| {
            let m = caps.get(1).or_else(|| caps.get(0))?;
            Span::from_range(m.range())
        });
        let span = best_span(spans, cursor.col)?;
        Some(Match::from_span(line, span))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        (self.transform)(&metadata.text, delta).map(Replacement::Text)
    }
}
