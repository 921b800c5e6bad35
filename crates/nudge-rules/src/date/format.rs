//! Compilation of `%`-escaped date/time patterns

use regex::Regex;
use thiserror::Error;

/// Errors from compiling a date pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unknown escape '%{0}'")]
    UnknownEscape(char),

    #[error("pattern ends with a lone '%'")]
    TrailingPercent,

    #[error("pattern '{0}' has no date or time fields")]
    NoFields(String),

    #[error("field '%{0}' appears more than once")]
    DuplicateField(char),
}

/// A calendar or clock component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
        }
    }
}

/// First year of the century `%y` reads and writes
pub const SHORT_YEAR_BASE: i64 = 2000;

/// How a field is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// `%Y`: four digits
    Year4,
    /// `%y`: last two digits of a year in 2000-2099 (wraps)
    Year2,
    /// Two digits, zero-padded
    Padded,
    /// One or two digits
    Unpadded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(Field, Width),
}

/// A compiled date pattern: the tokens plus a regex with one group per field
#[derive(Debug, Clone)]
pub struct DatePattern {
    source: String,
    tokens: Vec<Token>,
    fields: Vec<(Field, Width)>,
    regex: Regex,
    anchored: Regex,
}

impl DatePattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let mut spec = chars.next().ok_or(PatternError::TrailingPercent)?;
            let unpadded = spec == '-';
            if unpadded {
                spec = chars.next().ok_or(PatternError::TrailingPercent)?;
            }
            let token = match (spec, unpadded) {
                ('%', false) => {
                    literal.push('%');
                    continue;
                }
                ('Y', false) => Token::Field(Field::Year, Width::Year4),
                ('y', false) => Token::Field(Field::Year, Width::Year2),
                ('m', _) => Token::Field(Field::Month, width(unpadded)),
                ('d', _) => Token::Field(Field::Day, width(unpadded)),
                ('H', _) => Token::Field(Field::Hour, width(unpadded)),
                ('M', false) => Token::Field(Field::Minute, Width::Padded),
                ('S', false) => Token::Field(Field::Second, Width::Padded),
                (other, _) => return Err(PatternError::UnknownEscape(other)),
            };
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(token);
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        let mut fields: Vec<(Field, Width)> = Vec::new();
        let mut source = String::new();
        for token in &tokens {
            match token {
                Token::Literal(text) => source.push_str(&regex::escape(text)),
                Token::Field(field, width) => {
                    if fields.iter().any(|(f, _)| f == field) {
                        return Err(PatternError::DuplicateField(escape_char(*field)));
                    }
                    fields.push((*field, *width));
                    source.push_str(match width {
                        Width::Year4 => r"(\d{4})",
                        Width::Year2 | Width::Padded => r"(\d{2})",
                        Width::Unpadded => r"(\d{1,2})",
                    });
                }
            }
        }
        if fields.is_empty() {
            return Err(PatternError::NoFields(pattern.to_string()));
        }

        let regex = Regex::new(&source).map_err(|_| PatternError::NoFields(pattern.to_string()))?;
        let anchored = Regex::new(&format!("^{}$", source))
            .map_err(|_| PatternError::NoFields(pattern.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            tokens,
            fields,
            regex,
            anchored,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fields in the order they appear in the pattern
    pub fn fields(&self) -> &[(Field, Width)] {
        &self.fields
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.iter().any(|(f, _)| *f == field)
    }

    /// Whether the year is written with two digits
    pub fn short_year(&self) -> bool {
        self.fields.contains(&(Field::Year, Width::Year2))
    }

    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|(f, _)| *f == field)
    }

    /// The unanchored search regex, one capture group per field
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Parse text that is exactly one occurrence of the pattern
    pub fn parse(&self, text: &str) -> Option<Vec<i64>> {
        let caps = self.anchored.captures(text)?;
        self.fields
            .iter()
            .enumerate()
            .map(|(i, (_, width))| {
                let value: i64 = caps.get(i + 1)?.as_str().parse().ok()?;
                Some(match width {
                    Width::Year2 => SHORT_YEAR_BASE + value,
                    _ => value,
                })
            })
            .collect()
    }

    /// Render values (in field order), returning the text and the byte
    /// range each field occupies in it
    pub fn render(&self, values: &[i64]) -> Option<(String, Vec<std::ops::Range<usize>>)> {
        let mut out = String::new();
        let mut ranges = Vec::with_capacity(self.fields.len());
        let mut next = 0;
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(_, width) => {
                    let value = *values.get(next)?;
                    next += 1;
                    let start = out.len();
                    match width {
                        Width::Year4 if (0..=9999).contains(&value) => {
                            out.push_str(&format!("{:04}", value))
                        }
                        Width::Year4 => return None,
                        Width::Year2 => out.push_str(&format!("{:02}", value.rem_euclid(100))),
                        Width::Padded if (0..=99).contains(&value) => {
                            out.push_str(&format!("{:02}", value))
                        }
                        Width::Unpadded if (0..=99).contains(&value) => {
                            out.push_str(&value.to_string())
                        }
                        _ => return None,
                    }
                    ranges.push(start..out.len());
                }
            }
        }
        Some((out, ranges))
    }
}

fn width(unpadded: bool) -> Width {
    if unpadded {
        Width::Unpadded
    } else {
        Width::Padded
    }
}

fn escape_char(field: Field) -> char {
    match field {
        Field::Year => 'Y',
        Field::Month => 'm',
        Field::Day => 'd',
        Field::Hour => 'H',
        Field::Minute => 'M',
        Field::Second => 'S',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_fields() {
        let pattern = DatePattern::compile("%Y-%m-%d %H:%M").unwrap();
        let fields: Vec<Field> = pattern.fields().iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![Field::Year, Field::Month, Field::Day, Field::Hour, Field::Minute]
        );
        assert!(pattern.regex().is_match("at 2024-01-05 10:30"));
    }

    #[test]
    fn test_literal_percent_and_unpadded() {
        let pattern = DatePattern::compile("%-d%%%-m").unwrap();
        assert_eq!(pattern.parse("5%12"), Some(vec![5, 12]));
        let (text, ranges) = pattern.render(&[7, 3]).unwrap();
        assert_eq!(text, "7%3");
        assert_eq!(ranges, vec![0..1, 2..3]);
    }

    #[test]
    fn test_short_year() {
        let pattern = DatePattern::compile("%d/%m/%y").unwrap();
        assert_eq!(pattern.parse("01/02/99"), Some(vec![1, 2, 2099]));
        assert_eq!(pattern.render(&[1, 2, 2100]).unwrap().0, "01/02/00");
    }

    #[test]
    fn test_parse_requires_whole_text() {
        let pattern = DatePattern::compile("%Y/%m/%d").unwrap();
        assert_eq!(pattern.parse("2024/12/31"), Some(vec![2024, 12, 31]));
        assert_eq!(pattern.parse("x2024/12/31"), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            DatePattern::compile("%Q").unwrap_err(),
            PatternError::UnknownEscape('Q')
        );
        assert_eq!(
            DatePattern::compile("%Y-%").unwrap_err(),
            PatternError::TrailingPercent
        );
        assert!(matches!(
            DatePattern::compile("plain").unwrap_err(),
            PatternError::NoFields(_)
        ));
        assert_eq!(
            DatePattern::compile("%d %d").unwrap_err(),
            PatternError::DuplicateField('d')
        );
    }

    #[test]
    fn test_render_rejects_out_of_width() {
        let pattern = DatePattern::compile("%Y").unwrap();
        assert!(pattern.render(&[10000]).is_none());
        assert!(pattern.render(&[-1]).is_none());
    }
}
