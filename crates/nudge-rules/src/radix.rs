//! Prefixed hexadecimal, octal and binary literals

use nudge_core::scorer::{best_span, followed_by_word, preceded_by_word};
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;

/// Supported bases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Hex,
    Octal,
    Binary,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Hex => 16,
            Radix::Octal => 8,
            Radix::Binary => 2,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Radix::Hex => r"0[xX][0-9a-fA-F]+",
            Radix::Octal => r"0[oO][0-7]+",
            Radix::Binary => r"0[bB][01]+",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Radix::Hex => "hex",
            Radix::Octal => "octal",
            Radix::Binary => "binary",
        }
    }
}

/// Bounded-radix integer literal.
///
/// Letter case and digit width are preserved. Going below zero wraps modulo
/// `base ^ width` where width is the digit count of the original literal;
/// going above the largest value of that width grows the literal.
pub struct RadixRule {
    radix: Radix,
    re: Regex,
}

impl RadixRule {
    pub fn new(radix: Radix) -> Self {
        Self {
            radix,
            re: Regex::new(radix.pattern()).unwrap(),
        }
    }

    pub fn hex() -> Self {
        Self::new(Radix::Hex)
    }

    pub fn octal() -> Self {
        Self::new(Radix::Octal)
    }

    pub fn binary() -> Self {
        Self::new(Radix::Binary)
    }

    fn format(&self, value: u128, width: usize, upper: bool) -> String {
        match self.radix {
            Radix::Hex if upper => format!("{:0width$X}", value, width = width),
            Radix::Hex => format!("{:0width$x}", value, width = width),
            Radix::Octal => format!("{:0width$o}", value, width = width),
            Radix::Binary => format!("{:0width$b}", value, width = width),
        }
    }
}

impl Rule for RadixRule {
    fn id(&self) -> &str {
        self.radix.name()
    }

    fn description(&self) -> &str {
        match self.radix {
            Radix::Hex => "Hexadecimal literal (0x..), wraps at its digit width",
            Radix::Octal => "Octal literal (0o..), wraps at its digit width",
            Radix::Binary => "Binary literal (0b..), wraps at its digit width",
        }
    }

    fn priority(&self) -> i32 {
        70
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self
            .re
            .find_iter(line)
            .filter(|m| !preceded_by_word(line, m.start()) && !followed_by_word(line, m.end() - 1))
            .filter_map(|m| Span::from_range(m.range()));
        let span = best_span(spans, cursor.col)?;
        let found = Match::from_span(line, span);
        let value = u128::from_str_radix(&found.metadata.text[2..], self.radix.base()).ok()?;
        match i64::try_from(value) {
            Ok(value) => Some(found.with("value", value)),
            Err(_) => Some(found),
        }
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let text = metadata.text.as_str();
        let (prefix, digits) = (text.get(..2)?, text.get(2..)?);
        if digits.is_empty() {
            return None;
        }
        let value = match metadata.int("value") {
            Some(value) => u128::try_from(value).ok()?,
            None => u128::from_str_radix(digits, self.radix.base()).ok()?,
        };

        let width = digits.len();
        let next = i128::try_from(value).ok()?.checked_add(i128::from(delta))?;
        let next = if next < 0 {
            let modulus = i128::from(self.radix.base()).checked_pow(u32::try_from(width).ok()?)?;
            next.rem_euclid(modulus)
        } else {
            next
        };

        // Letter digits decide the case; without any, the prefix does (`0X`)
        let upper = if digits.chars().any(|c| c.is_ascii_alphabetic()) {
            digits.chars().any(|c| c.is_ascii_uppercase())
        } else {
            prefix.chars().any(|c| c.is_ascii_uppercase())
        };
        let formatted = self.format(u128::try_from(next).ok()?, width, upper);
        Some(Replacement::Text(format!("{}{}", prefix, formatted)))
    }
}
