//! Date and time rules driven by `%`-escaped field patterns
//!
//! The field under the cursor is stepped with calendar carry:
//! - day changes roll over month and year ends, honoring leap years
//! - month changes carry into the year and keep the day as written
//! - time fields carry into each other, and into the day when the pattern
//!   has one; a clock without a date wraps at 24 hours
//! - a `%y` year stays within 2000-2099, so `00` minus one year is `99`
//!   and reads back as 2099

pub mod calendar;
pub mod format;

use nudge_core::scorer::best_span;
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use tracing::trace;

pub use format::{DatePattern, Field, PatternError, Width, SHORT_YEAR_BASE};

/// Date/time rule for one pattern
pub struct DateRule {
    id: String,
    pattern: DatePattern,
    valid_only: bool,
}

impl DateRule {
    /// Compile `pattern`; the rule id defaults to `date(<pattern>)`
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            id: format!("date({})", pattern),
            pattern: DatePattern::compile(pattern)?,
            valid_only: false,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Only match text that is a real calendar date and clock time
    pub fn valid_only(mut self, valid_only: bool) -> Self {
        self.valid_only = valid_only;
        self
    }

    pub fn pattern(&self) -> &DatePattern {
        &self.pattern
    }

    fn value(&self, values: &[i64], field: Field) -> Option<i64> {
        self.pattern.index_of(field).map(|i| values[i])
    }

    fn is_valid(&self, values: &[i64]) -> bool {
        let month = self.value(values, Field::Month);
        if month.is_some_and(|m| !(1..=12).contains(&m)) {
            return false;
        }
        if let Some(day) = self.value(values, Field::Day) {
            // Without a year, Feb 29 is allowed
            let year = self.value(values, Field::Year).unwrap_or(2000);
            let max = month.map_or(31, |m| calendar::days_in_month(year, m));
            if day < 1 || day > max {
                return false;
            }
        }
        self.value(values, Field::Hour).map_or(true, |h| h <= 23)
            && self.value(values, Field::Minute).map_or(true, |m| m <= 59)
            && self.value(values, Field::Second).map_or(true, |s| s <= 59)
    }

    /// Candidate spans, including ones overlapping a rejected neighbour
    fn candidates(&self, line: &str) -> Vec<(Span, Vec<std::ops::Range<usize>>)> {
        let re = self.pattern.regex();
        let mut found = Vec::new();
        let mut at = 0;
        while let Some(caps) = re.captures_at(line, at) {
            let Some(whole) = caps.get(0) else { break };
            let glued = line[..whole.start()].ends_with(|c: char| c.is_ascii_digit())
                || line[whole.end()..].starts_with(|c: char| c.is_ascii_digit());
            if !glued {
                let ranges: Vec<_> = (1..caps.len())
                    .filter_map(|i| caps.get(i).map(|m| m.range()))
                    .collect();
                if let Some(span) = Span::from_range(whole.range()) {
                    found.push((span, ranges));
                }
            }
            at = whole.start()
                + line[whole.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        found
    }

    fn step(&self, values: &mut [i64], field: Field, delta: i64) -> Option<()> {
        match field {
            Field::Year => {
                let i = self.pattern.index_of(Field::Year)?;
                values[i] = values[i].checked_add(delta)?;
            }
            Field::Month => {
                let i = self.pattern.index_of(Field::Month)?;
                match self.pattern.index_of(Field::Year) {
                    Some(y) => {
                        let (year, month) = calendar::add_months(values[y], values[i], delta);
                        values[y] = year;
                        values[i] = month;
                    }
                    None => values[i] = (values[i] - 1 + delta).rem_euclid(12) + 1,
                }
            }
            Field::Day => self.shift_days(values, delta)?,
            Field::Hour | Field::Minute | Field::Second => self.shift_clock(values, field, delta)?,
        }
        if self.pattern.short_year() {
            let y = self.pattern.index_of(Field::Year)?;
            values[y] = SHORT_YEAR_BASE + (values[y] - SHORT_YEAR_BASE).rem_euclid(100);
        }
        Some(())
    }

    fn shift_days(&self, values: &mut [i64], delta: i64) -> Option<()> {
        let d = self.pattern.index_of(Field::Day)?;
        match (
            self.pattern.index_of(Field::Year),
            self.pattern.index_of(Field::Month),
        ) {
            (year, Some(m)) => {
                // A pattern without a year uses a leap year so Feb 29 exists
                let y = year.map_or(2000, |y| values[y]);
                let (new_year, new_month, new_day) =
                    calendar::add_days(y, values[m], values[d], delta)?;
                if let Some(year) = year {
                    values[year] = new_year;
                }
                values[m] = new_month;
                values[d] = new_day;
            }
            (_, None) => values[d] = (values[d] - 1 + delta).rem_euclid(31) + 1,
        }
        Some(())
    }

    fn shift_clock(&self, values: &mut [i64], field: Field, delta: i64) -> Option<()> {
        let unit = match field {
            Field::Hour => 3600,
            Field::Minute => 60,
            _ => 1,
        };
        let hour = self.pattern.index_of(Field::Hour);
        let minute = self.pattern.index_of(Field::Minute);
        let second = self.pattern.index_of(Field::Second);
        let period = if hour.is_some() {
            86_400
        } else if minute.is_some() {
            3600
        } else {
            60
        };

        let seconds = hour.map_or(0, |i| values[i] * 3600)
            + minute.map_or(0, |i| values[i] * 60)
            + second.map_or(0, |i| values[i]);
        let total = seconds.checked_add(delta.checked_mul(unit)?)?;

        let carry = total.div_euclid(period);
        let within = total.rem_euclid(period);
        if let Some(i) = hour {
            values[i] = within / 3600;
        }
        if let Some(i) = minute {
            values[i] = within % 3600 / 60;
        }
        if let Some(i) = second {
            values[i] = within % 60;
        }
        if carry != 0 && hour.is_some() && self.pattern.has(Field::Day) {
            self.shift_days(values, carry)?;
        }
        Some(())
    }
}

/// Which field a cursor offset within the match belongs to: the field
/// containing it, else the nearest one, ties going to the earlier field
fn field_at(ranges: &[std::ops::Range<usize>], offset: usize) -> usize {
    let mut best = 0;
    let mut best_distance = usize::MAX;
    for (i, range) in ranges.iter().enumerate() {
        let distance = if offset < range.start {
            range.start - offset
        } else if offset >= range.end {
            offset + 1 - range.end
        } else {
            0
        };
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

impl Rule for DateRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Date or time, stepping the field under the cursor with calendar carry"
    }

    fn priority(&self) -> i32 {
        80
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let mut candidates = self.candidates(line);
        if self.valid_only {
            candidates.retain(|(span, _)| {
                self.pattern
                    .parse(&line[span.range()])
                    .is_some_and(|values| self.is_valid(&values))
            });
        }
        let span = best_span(candidates.iter().map(|(span, _)| *span), cursor.col)?;
        let (_, ranges) = candidates.into_iter().find(|(s, _)| *s == span)?;

        let offset = cursor.col.saturating_sub(span.start);
        let relative: Vec<_> = ranges
            .iter()
            .map(|r| r.start - span.start..r.end - span.start)
            .collect();
        let field = field_at(&relative, offset);
        let within = offset
            .saturating_sub(relative[field].start)
            .min(relative[field].len() - 1);
        trace!(
            rule = %self.id,
            field = self.pattern.fields()[field].0.name(),
            "date field under cursor"
        );

        Some(
            Match::from_span(line, span)
                .with("field", field)
                .with("field_offset", within),
        )
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let mut values = self.pattern.parse(&metadata.text)?;
        let index = usize::try_from(metadata.int("field").unwrap_or(0)).ok()?;
        let (field, _) = *self.pattern.fields().get(index)?;
        self.step(&mut values, field, delta)?;

        let (text, ranges) = self.pattern.render(&values)?;
        let within = usize::try_from(metadata.int("field_offset").unwrap_or(0)).ok()?;
        let range = &ranges[index];
        let offset = range.start + within.min(range.len() - 1);
        Some(Replacement::with_cursor(text, offset))
    }
}
