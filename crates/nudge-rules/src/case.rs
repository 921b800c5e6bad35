//! Identifier casing cycle

use nudge_core::scorer::{best_span, followed_by_word, preceded_by_word};
use nudge_core::{step_index, Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;
use std::sync::OnceLock;

/// Casing style of a multi-word identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStyle {
    /// fooBar
    Camel,
    /// foo_bar
    Snake,
    /// foo-bar
    Kebab,
    /// FooBar
    Pascal,
    /// FOO_BAR
    ScreamingSnake,
}

impl CaseStyle {
    pub const ALL: [CaseStyle; 5] = [
        CaseStyle::Camel,
        CaseStyle::Snake,
        CaseStyle::Kebab,
        CaseStyle::Pascal,
        CaseStyle::ScreamingSnake,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CaseStyle::Camel => "camel",
            CaseStyle::Snake => "snake",
            CaseStyle::Kebab => "kebab",
            CaseStyle::Pascal => "pascal",
            CaseStyle::ScreamingSnake => "screaming_snake",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }

    fn shape(self) -> &'static Regex {
        static SHAPES: OnceLock<[Regex; 5]> = OnceLock::new();
        let shapes = SHAPES.get_or_init(|| {
            [
                Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$").unwrap(),
                Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)+$").unwrap(),
                Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)+$").unwrap(),
                Regex::new(r"^[A-Z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$").unwrap(),
                Regex::new(r"^[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+$").unwrap(),
            ]
        });
        &shapes[self as usize]
    }

    /// The single style `text` is written in, if any.
    ///
    /// A lone word (`foo`, `Foo`, `FOO`) is not classified.
    pub fn classify(text: &str) -> Option<Self> {
        let style = Self::ALL.into_iter().find(|style| style.shape().is_match(text))?;
        if style == CaseStyle::Pascal && !text.chars().any(|c| c.is_ascii_lowercase()) {
            return None;
        }
        Some(style)
    }

    /// Lowercase words of an identifier in this style. Humped styles split
    /// before every capital, so `parseHTTP` gives `parse h t t p`.
    pub fn split(self, text: &str) -> Vec<String> {
        match self {
            CaseStyle::Snake | CaseStyle::ScreamingSnake => {
                text.split('_').map(str::to_ascii_lowercase).collect()
            }
            CaseStyle::Kebab => text.split('-').map(str::to_ascii_lowercase).collect(),
            CaseStyle::Camel | CaseStyle::Pascal => {
                let mut words: Vec<String> = Vec::new();
                for c in text.chars() {
                    match words.last_mut() {
                        Some(word) if !c.is_ascii_uppercase() => word.push(c),
                        _ => words.push(c.to_ascii_lowercase().to_string()),
                    }
                }
                words
            }
        }
    }

    pub fn join(self, words: &[String]) -> String {
        match self {
            CaseStyle::Snake => words.join("_"),
            CaseStyle::Kebab => words.join("-"),
            CaseStyle::ScreamingSnake => words.join("_").to_ascii_uppercase(),
            CaseStyle::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
                .collect(),
            CaseStyle::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Rewrites an identifier in the next style of a cycle
pub struct CaseRule {
    cycle: Vec<CaseStyle>,
    re: Regex,
}

impl CaseRule {
    /// camel -> snake -> kebab -> Pascal -> SCREAMING_SNAKE
    pub fn new() -> Self {
        Self::with_cycle(CaseStyle::ALL.to_vec())
    }

    pub fn with_cycle(cycle: Vec<CaseStyle>) -> Self {
        Self {
            cycle,
            re: Regex::new(r"[A-Za-z][A-Za-z0-9]*(?:[_-][A-Za-z0-9]+)*").unwrap(),
        }
    }
}

impl Default for CaseRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CaseRule {
    fn id(&self) -> &str {
        "case"
    }

    fn description(&self) -> &str {
        "Identifier casing: camel -> snake -> kebab -> Pascal -> SCREAMING_SNAKE"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn cyclic(&self) -> bool {
        true
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let mut styles = Vec::new();
        let spans: Vec<Span> = self
            .re
            .find_iter(line)
            .filter(|m| !preceded_by_word(line, m.start()) && !followed_by_word(line, m.end() - 1))
            .filter_map(|m| {
                let style = CaseStyle::classify(m.as_str()).filter(|s| self.cycle.contains(s))?;
                let span = Span::from_range(m.range())?;
                styles.push((span, style));
                Some(span)
            })
            .collect();
        let span = best_span(spans, cursor.col)?;
        let (_, style) = styles.into_iter().find(|(s, _)| *s == span)?;
        Some(Match::from_span(line, span).with("style", style.name()))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let style = match metadata.str("style") {
            Some(name) => CaseStyle::from_name(name)?,
            None => CaseStyle::classify(&metadata.text)?,
        };
        let index = self.cycle.iter().position(|s| *s == style)?;
        let next = self.cycle[step_index(index, delta, self.cycle.len(), self.cyclic())?];
        let words = style.split(&metadata.text);
        Some(Replacement::Text(next.join(&words)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, delta: i64) -> Option<String> {
        CaseRule::new()
            .transform(delta, &Metadata::new(text))
            .map(|r| r.text().to_string())
    }

    #[test]
    fn test_classify() {
        assert_eq!(CaseStyle::classify("fooBar"), Some(CaseStyle::Camel));
        assert_eq!(CaseStyle::classify("foo_bar"), Some(CaseStyle::Snake));
        assert_eq!(CaseStyle::classify("foo-bar"), Some(CaseStyle::Kebab));
        assert_eq!(CaseStyle::classify("FooBar"), Some(CaseStyle::Pascal));
        assert_eq!(CaseStyle::classify("FOO_BAR"), Some(CaseStyle::ScreamingSnake));
        assert_eq!(CaseStyle::classify("foo"), None);
        assert_eq!(CaseStyle::classify("Foo"), None);
        assert_eq!(CaseStyle::classify("FOO"), None);
        assert_eq!(CaseStyle::classify("foo_Bar"), None);
    }

    #[test]
    fn test_full_cycle() {
        let mut text = "fooBarBaz".to_string();
        let mut seen = Vec::new();
        for _ in 0..5 {
            text = apply(&text, 1).unwrap();
            seen.push(text.clone());
        }
        assert_eq!(
            seen,
            vec!["foo_bar_baz", "foo-bar-baz", "FooBarBaz", "FOO_BAR_BAZ", "fooBarBaz"]
        );
        assert_eq!(apply("fooBar", -1).as_deref(), Some("FOO_BAR"));
    }

    #[test]
    fn test_acronym_split_per_letter() {
        assert_eq!(
            CaseStyle::Camel.split("parseHTTP"),
            vec!["parse", "h", "t", "t", "p"]
        );
        assert_eq!(apply("parseHTTP", 1).as_deref(), Some("parse_h_t_t_p"));
    }

    #[test]
    fn test_locate_identifier() {
        let rule = CaseRule::new();
        let found = rule.locate("let my_value = other;", Cursor::new(0, 6)).unwrap();
        assert_eq!(found.metadata.text, "my_value");
        assert_eq!(found.metadata.str("style"), Some("snake"));
        assert!(rule.locate("let value = 1;", Cursor::new(0, 5)).is_none());
    }

    #[test]
    fn test_restricted_cycle() {
        let rule = CaseRule::with_cycle(vec![CaseStyle::Snake, CaseStyle::Camel]);
        let found = rule.locate("foo_bar", Cursor::new(0, 0)).unwrap();
        let next = rule.transform(1, &found.metadata).unwrap();
        assert_eq!(next.text(), "fooBar");
        assert!(rule.locate("foo-bar", Cursor::new(0, 0)).is_none());
    }
}
