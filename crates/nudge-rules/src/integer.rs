//! Decimal integers

use nudge_core::scorer::{best_span, preceded_by_word};
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;

/// Decimal integer literal, optionally signed.
///
/// A leading `-` only counts as a sign when it is not glued to a word
/// (`x-1` is `x` minus `1`). Zero-padded literals keep their width.
pub struct IntegerRule {
    id: &'static str,
    signed: bool,
    re: Regex,
}

impl IntegerRule {
    pub fn signed() -> Self {
        Self {
            id: "integer",
            signed: true,
            re: Regex::new(r"-?\d+").unwrap(),
        }
    }

    /// Non-negative integers; decrementing below zero is a boundary
    pub fn natural() -> Self {
        Self {
            id: "natural",
            signed: false,
            re: Regex::new(r"\d+").unwrap(),
        }
    }
}

impl Rule for IntegerRule {
    fn id(&self) -> &str {
        self.id
    }

    fn description(&self) -> &str {
        if self.signed {
            "Signed decimal integer"
        } else {
            "Non-negative decimal integer"
        }
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self.re.find_iter(line).filter_map(|m| {
            let mut start = m.start();
            if m.as_str().starts_with('-') && preceded_by_word(line, start) {
                start += 1;
            }
            Span::from_range(start..m.end())
        });
        let span = best_span(spans, cursor.col)?;
        let found = Match::from_span(line, span);
        let value: i64 = found.metadata.text.parse().ok()?;
        Some(found.with("value", value))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let text = metadata.text.as_str();
        let value = match metadata.int("value") {
            Some(value) => value,
            None => text.parse().ok()?,
        };
        let next = value.checked_add(delta)?;
        if !self.signed && next < 0 {
            return None;
        }

        let digits = text.trim_start_matches('-');
        let width = if digits.len() > 1 && digits.starts_with('0') {
            digits.len()
        } else {
            0
        };
        let sign = if next < 0 { "-" } else { "" };
        Some(Replacement::Text(format!(
            "{}{:0width$}",
            sign,
            next.unsigned_abs(),
            width = width
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(rule: &IntegerRule, line: &str, col: usize) -> Option<Match> {
        rule.locate(line, Cursor::new(0, col))
    }

    fn apply(rule: &IntegerRule, text: &str, delta: i64) -> Option<String> {
        rule.transform(delta, &Metadata::new(text))
            .map(|r| r.text().to_string())
    }

    #[test]
    fn test_locate_under_cursor() {
        let rule = IntegerRule::signed();
        let found = locate(&rule, "foo 123 bar", 5).unwrap();
        assert_eq!((found.start, found.end), (4, 6));
        assert_eq!(found.metadata.int("value"), Some(123));
    }

    #[test]
    fn test_negative_sign() {
        let rule = IntegerRule::signed();
        let found = locate(&rule, "x = -5", 5).unwrap();
        assert_eq!(found.metadata.text, "-5");

        let found = locate(&rule, "x-5", 2).unwrap();
        assert_eq!(found.metadata.text, "5");
    }

    #[test]
    fn test_increment_decrement() {
        let rule = IntegerRule::signed();
        assert_eq!(apply(&rule, "123", 1).as_deref(), Some("124"));
        assert_eq!(apply(&rule, "0", -1).as_deref(), Some("-1"));
        assert_eq!(apply(&rule, "-1", 3).as_deref(), Some("2"));
        assert_eq!(apply(&rule, "10", -10).as_deref(), Some("0"));
    }

    #[test]
    fn test_zero_padding_kept() {
        let rule = IntegerRule::signed();
        assert_eq!(apply(&rule, "007", 1).as_deref(), Some("008"));
        assert_eq!(apply(&rule, "099", 1).as_deref(), Some("100"));
        assert_eq!(apply(&rule, "01", -2).as_deref(), Some("-01"));
    }

    #[test]
    fn test_natural_boundary() {
        let rule = IntegerRule::natural();
        assert_eq!(apply(&rule, "0", -1), None);
        assert_eq!(apply(&rule, "0", -1), None);
        assert_eq!(apply(&rule, "1", -1).as_deref(), Some("0"));
    }

    #[test]
    fn test_overflow_is_boundary() {
        let rule = IntegerRule::signed();
        assert_eq!(apply(&rule, &i64::MAX.to_string(), 1), None);
    }
}
