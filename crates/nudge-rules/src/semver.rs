//! Semantic versions

use nudge_core::scorer::best_span;
use nudge_core::{Cursor, Match, Metadata, Replacement, Rule, Span};
use regex::Regex;

/// `major.minor.patch`, stepping the component under the cursor.
///
/// Raising a component zeroes the ones after it. Lowering never does, and a
/// component never goes below zero.
pub struct SemverRule {
    re: Regex,
}

impl SemverRule {
    pub fn new() -> Self {
        Self {
            re: Regex::new(r"\d+\.\d+\.\d+").unwrap(),
        }
    }
}

impl Default for SemverRule {
    fn default() -> Self {
        Self::new()
    }
}

fn parts(text: &str) -> Option<[u64; 3]> {
    let mut it = text.split('.').map(|p| p.parse::<u64>().ok());
    let parsed = [it.next()??, it.next()??, it.next()??];
    if it.next().is_some() {
        return None;
    }
    Some(parsed)
}

impl Rule for SemverRule {
    fn id(&self) -> &str {
        "semver"
    }

    fn description(&self) -> &str {
        "Semantic version major.minor.patch"
    }

    fn priority(&self) -> i32 {
        75
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let spans = self
            .re
            .find_iter(line)
            .filter(|m| {
                let before = &line[..m.start()];
                let after = &line[m.end()..];
                !before.ends_with(|c: char| c.is_ascii_digit() || c == '.')
                    && !after.starts_with(|c: char| c.is_ascii_digit())
                    && !(after.starts_with('.') && after[1..].starts_with(|c: char| c.is_ascii_digit()))
            })
            .filter_map(|m| Span::from_range(m.range()));
        let span = best_span(spans, cursor.col)?;
        let found = Match::from_span(line, span);

        // The dot after a component belongs to it
        let offset = cursor.col.saturating_sub(span.start);
        let component = found.metadata.text[..offset.min(found.metadata.text.len())]
            .matches('.')
            .count();
        Some(found.with("component", component))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let mut version = parts(&metadata.text)?;
        let component = usize::try_from(metadata.int("component").unwrap_or(2))
            .ok()?
            .min(2);

        let current = i128::from(version[component]);
        let next = u64::try_from(current + i128::from(delta)).ok()?;
        version[component] = next;
        if delta > 0 {
            for lower in &mut version[component + 1..] {
                *lower = 0;
            }
        }

        let text = format!("{}.{}.{}", version[0], version[1], version[2]);
        let start = text
            .split('.')
            .take(component)
            .map(|p| p.len() + 1)
            .sum::<usize>();
        Some(Replacement::with_cursor(text, start))
    }
}
