//! Hex colors

use nudge_core::scorer::{best_span, preceded_by_word};
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;

/// Letter case for rewritten hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexCase {
    Upper,
    Lower,
    /// Follow the literal: uppercase if any of its letters is uppercase
    #[default]
    Preserve,
}

/// `#rrggbb` or `#rgb`.
///
/// The cursor on `#` steps every channel; on a digit it steps that digit's
/// channel. Channels clamp at 0 and 255 (0 and 15 for the short form).
pub struct ColorRule {
    case: HexCase,
    re: Regex,
}

impl ColorRule {
    pub fn new() -> Self {
        Self::with_case(HexCase::Preserve)
    }

    pub fn with_case(case: HexCase) -> Self {
        Self {
            case,
            // Longer form first so it wins at the same position
            re: Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})").unwrap(),
        }
    }

    fn upper(&self, original: &str) -> bool {
        match self.case {
            HexCase::Upper => true,
            HexCase::Lower => false,
            HexCase::Preserve => original.chars().any(|c| c.is_ascii_uppercase()),
        }
    }
}

impl Default for ColorRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ColorRule {
    fn id(&self) -> &str {
        "color"
    }

    fn description(&self) -> &str {
        "Hex color #rgb / #rrggbb, per channel or all channels from '#'"
    }

    fn priority(&self) -> i32 {
        65
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self
            .re
            .find_iter(line)
            .filter(|m| {
                !preceded_by_word(line, m.start())
                    && !line[m.end()..].starts_with(|c: char| c.is_ascii_hexdigit())
            })
            .filter_map(|m| Span::from_range(m.range()));
        let span = best_span(spans, cursor.col)?;
        let found = Match::from_span(line, span);

        // 0 selects all channels, 1..=3 a single one
        let digits_per_channel = (found.metadata.text.len() - 1) / 3;
        let offset = cursor.col.saturating_sub(span.start);
        let channel = if offset == 0 || !span.contains(cursor.col) {
            0
        } else {
            (offset - 1) / digits_per_channel + 1
        };
        Some(found.with("channel", channel))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let text = metadata.text.as_str();
        let digits = text.strip_prefix('#')?;
        let width = match digits.len() {
            6 => 2,
            3 => 1,
            _ => return None,
        };
        let max: i64 = if width == 2 { 255 } else { 15 };
        let channel = usize::try_from(metadata.int("channel").unwrap_or(0))
            .ok()?
            .min(3);

        let mut channels = [0i64; 3];
        for (i, value) in channels.iter_mut().enumerate() {
            *value = i64::from_str_radix(digits.get(i * width..(i + 1) * width)?, 16).ok()?;
        }
        let original = channels;
        for (i, value) in channels.iter_mut().enumerate() {
            if channel == 0 || channel == i + 1 {
                *value = value.saturating_add(delta).clamp(0, max);
            }
        }
        if channels == original {
            return None;
        }

        let upper = self.upper(digits);
        let mut out = String::from("#");
        for value in channels {
            if upper {
                out.push_str(&format!("{:0width$X}", value, width = width));
            } else {
                out.push_str(&format!("{:0width$x}", value, width = width));
            }
        }
        let cursor = if channel == 0 {
            0
        } else {
            1 + (channel - 1) * width
        };
        Some(Replacement::with_cursor(out, cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(rule: &ColorRule, text: &str, channel: i64, delta: i64) -> Option<String> {
        let meta = Metadata::new(text).with("channel", channel);
        rule.transform(delta, &meta).map(|r| r.text().to_string())
    }

    #[test]
    fn test_channel_under_cursor() {
        let rule = ColorRule::new();
        let line = "color: #ff8000;";
        assert_eq!(
            rule.locate(line, Cursor::new(0, 7)).unwrap().metadata.int("channel"),
            Some(0)
        );
        assert_eq!(
            rule.locate(line, Cursor::new(0, 9)).unwrap().metadata.int("channel"),
            Some(1)
        );
        assert_eq!(
            rule.locate(line, Cursor::new(0, 10)).unwrap().metadata.int("channel"),
            Some(2)
        );
        assert_eq!(
            rule.locate(line, Cursor::new(0, 13)).unwrap().metadata.int("channel"),
            Some(3)
        );
    }

    #[test]
    fn test_long_form_preferred() {
        let rule = ColorRule::new();
        let found = rule.locate("#abcdef", Cursor::new(0, 1)).unwrap();
        assert_eq!(found.metadata.text, "#abcdef");
        let found = rule.locate("#abc;", Cursor::new(0, 1)).unwrap();
        assert_eq!(found.metadata.text, "#abc");
        assert!(rule.locate("#abcd", Cursor::new(0, 1)).is_none());
    }

    #[test]
    fn test_clamped_channels() {
        let rule = ColorRule::new();
        assert_eq!(apply(&rule, "#ff8000", 1, 1), None);
        assert_eq!(apply(&rule, "#ff8000", 2, 1).as_deref(), Some("#ff8100"));
        assert_eq!(apply(&rule, "#ff8000", 0, 1).as_deref(), Some("#ff8101"));
        assert_eq!(apply(&rule, "#ff8000", 0, -300).as_deref(), Some("#000000"));
        assert_eq!(apply(&rule, "#000000", 0, -1), None);
    }

    #[test]
    fn test_short_form_steps_nibbles() {
        let rule = ColorRule::new();
        assert_eq!(apply(&rule, "#09f", 2, 1).as_deref(), Some("#0af"));
        assert_eq!(apply(&rule, "#09f", 0, 1).as_deref(), Some("#1af"));
    }

    #[test]
    fn test_case_policy() {
        assert_eq!(
            apply(&ColorRule::new(), "#AA0000", 3, 10).as_deref(),
            Some("#AA000A")
        );
        assert_eq!(
            apply(&ColorRule::with_case(HexCase::Upper), "#aa0000", 3, 10).as_deref(),
            Some("#AA000A")
        );
        assert_eq!(
            apply(&ColorRule::with_case(HexCase::Lower), "#AA0000", 3, 10).as_deref(),
            Some("#aa000a")
        );
    }
}
