//! Decimal fractions

use nudge_core::scorer::{best_span, preceded_by_word};
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;

/// Decimal fraction such as `1.25` or `-0.5`.
///
/// The number of fractional digits never changes. With the cursor on a
/// fractional digit the step applies at that decimal place; anywhere else
/// the integer part moves by the step and the fraction is kept as written,
/// so `0.50` decremented is `-1.50`.
pub struct DecimalRule {
    re: Regex,
}

impl DecimalRule {
    pub fn new() -> Self {
        Self {
            re: Regex::new(r"[+-]?\d+\.\d+").unwrap(),
        }
    }
}

impl Default for DecimalRule {
    fn default() -> Self {
        Self::new()
    }
}

struct Parsed<'a> {
    sign: &'a str,
    int_digits: &'a str,
    frac_digits: &'a str,
}

fn parse(text: &str) -> Option<Parsed<'_>> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' | b'-' => text.split_at(1),
        _ => ("", text),
    };
    let (int_digits, frac_digits) = rest.split_once('.')?;
    if int_digits.is_empty() || frac_digits.is_empty() {
        return None;
    }
    Some(Parsed {
        sign,
        int_digits,
        frac_digits,
    })
}

/// Move the integer component by `delta`. An integer part of zero carries
/// no sign, and `+` stays while the value is above zero.
fn step_integer_part(parsed: &Parsed<'_>, delta: i64) -> Option<String> {
    let magnitude: i128 = parsed.int_digits.parse().ok()?;
    let value = if parsed.sign == "-" { -magnitude } else { magnitude };
    let next = value.checked_add(i128::from(delta))?;
    let has_fraction = parsed.frac_digits.bytes().any(|b| b != b'0');
    let sign = if next < 0 {
        "-"
    } else if parsed.sign == "+" && (next > 0 || has_fraction) {
        "+"
    } else {
        ""
    };
    Some(format!("{}{}.{}", sign, next.unsigned_abs(), parsed.frac_digits))
}

impl Rule for DecimalRule {
    fn id(&self) -> &str {
        "decimal"
    }

    fn description(&self) -> &str {
        "Decimal fraction, stepping at the digit place under the cursor"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self.re.find_iter(line).filter_map(|m| {
            let mut start = m.start();
            if !m.as_str().starts_with(|c: char| c.is_ascii_digit()) && preceded_by_word(line, start) {
                start += 1;
            }
            Span::from_range(start..m.end())
        });
        let span = best_span(spans, cursor.col)?;
        let found = Match::from_span(line, span);

        let dot = span.start + found.metadata.text.find('.')?;
        let place = if cursor.col > dot && cursor.col <= span.end {
            cursor.col - dot
        } else {
            0
        };
        Some(found.with("place", place))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let parsed = parse(&metadata.text)?;
        let scale = u32::try_from(parsed.frac_digits.len()).ok()?;
        let place = u32::try_from(metadata.int("place").unwrap_or(0)).ok()?.min(scale);
        if place == 0 {
            return step_integer_part(&parsed, delta).map(Replacement::Text);
        }

        let magnitude: i128 = format!("{}{}", parsed.int_digits, parsed.frac_digits)
            .parse()
            .ok()?;
        let value = if parsed.sign == "-" { -magnitude } else { magnitude };
        let unit = 10i128.checked_pow(scale - place)?;
        let next = value.checked_add(i128::from(delta).checked_mul(unit)?)?;

        let divisor = 10i128.checked_pow(scale)?;
        let abs = next.unsigned_abs();
        let int_part = abs / divisor as u128;
        let frac_part = abs % divisor as u128;
        let sign = if next < 0 {
            "-"
        } else if parsed.sign == "+" && next > 0 {
            "+"
        } else {
            ""
        };
        let text = format!(
            "{}{}.{:0width$}",
            sign,
            int_part,
            frac_part,
            width = scale as usize
        );

        let dot = text.find('.')?;
        Some(Replacement::with_cursor(text, dot + place as usize))
    }
}
