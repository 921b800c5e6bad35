//! Ranking of candidate spans relative to the cursor
//!
//! Every rule uses these helpers to pick among its own occurrences on a line,
//! and the engine uses `pick_best` to choose between rules. A span containing
//! the cursor always outranks one that does not; after that rule priority,
//! then score, then closeness to the cursor, then discovery order decide.

use regex::Regex;
use std::cmp::{Ordering, Reverse};

use crate::span::Span;

/// Base score for spans that contain the cursor
pub const CONTAINS_BONUS: i64 = 1_000_000;
/// Base score for spans starting after the cursor, minus the distance
pub const AFTER_BASE: i64 = 10_000;
/// Base score for spans ending before the cursor, minus the distance
pub const BEFORE_BASE: i64 = -10_000;
/// Weight of span length within a category
pub const LENGTH_WEIGHT: i64 = 1;

/// Score of `span` for a cursor at `col`
pub fn score(span: Span, col: usize) -> i64 {
    let len = span.len() as i64;
    let base = if span.contains(col) {
        CONTAINS_BONUS + len
    } else if span.start > col {
        AFTER_BASE - (span.start - col) as i64
    } else {
        BEFORE_BASE - (col - span.end) as i64
    };
    base + len * LENGTH_WEIGHT
}

/// A span competing for selection, tagged with its rule priority
#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub span: Span,
    pub priority: i32,
    pub item: T,
}

impl<T> Candidate<T> {
    pub fn new(span: Span, priority: i32, item: T) -> Self {
        Self {
            span,
            priority,
            item,
        }
    }
}

fn rank(span: Span, priority: i32, col: usize) -> (bool, i32, i64, Reverse<usize>) {
    (
        span.contains(col),
        priority,
        score(span, col),
        Reverse(span.distance(col)),
    )
}

/// Pick the best candidate for a cursor at `col`. Ties keep the first found.
pub fn pick_best<T>(
    candidates: impl IntoIterator<Item = Candidate<T>>,
    col: usize,
) -> Option<Candidate<T>> {
    let mut best: Option<Candidate<T>> = None;
    for candidate in candidates {
        let better = match &best {
            None => true,
            Some(current) => {
                rank(candidate.span, candidate.priority, col)
                    .cmp(&rank(current.span, current.priority, col))
                    == Ordering::Greater
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Pick the best span produced by a single rule
pub fn best_span(spans: impl IntoIterator<Item = Span>, col: usize) -> Option<Span> {
    pick_best(spans.into_iter().map(|s| Candidate::new(s, 0, ())), col).map(|c| c.span)
}

/// All non-empty occurrences of `re` on `line`
pub fn find_all(re: &Regex, line: &str) -> Vec<Span> {
    re.find_iter(line)
        .filter_map(|m| Span::from_range(m.range()))
        .collect()
}

/// The best occurrence of `re` on `line` for a cursor at `col`
pub fn find_best(re: &Regex, line: &str, col: usize) -> Option<Span> {
    best_span(find_all(re, line), col)
}

/// Whether the byte before `start` is a word character
pub fn preceded_by_word(line: &str, start: usize) -> bool {
    line[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Whether the character at `end + 1` is a word character
pub fn followed_by_word(line: &str, end: usize) -> bool {
    line.get(end + 1..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_beats_longer_outside() {
        let inside = Span::new(4, 4);
        let after = Span::new(6, 30);
        assert!(score(inside, 4) > score(after, 4));
    }

    #[test]
    fn test_after_beats_before() {
        assert!(score(Span::new(10, 12), 5) > score(Span::new(0, 2), 5));
    }

    #[test]
    fn test_closer_after_wins() {
        assert!(score(Span::new(6, 7), 5) > score(Span::new(9, 10), 5));
    }

    #[test]
    fn test_longer_containing_wins() {
        assert!(score(Span::new(0, 9), 4) > score(Span::new(3, 5), 4));
    }

    #[test]
    fn test_containing_wins_over_priority() {
        let picked = pick_best(
            vec![
                Candidate::new(Span::new(10, 20), 100, "far"),
                Candidate::new(Span::new(3, 5), 1, "here"),
                Candidate::new(Span::new(0, 1), 90, "before"),
            ],
            4,
        )
        .unwrap();
        assert_eq!(picked.item, "here");
    }

    #[test]
    fn test_priority_breaks_containing_tie() {
        let picked = pick_best(
            vec![
                Candidate::new(Span::new(2, 5), 50, "integer"),
                Candidate::new(Span::new(0, 5), 70, "hex"),
            ],
            3,
        )
        .unwrap();
        assert_eq!(picked.item, "hex");

        let picked = pick_best(
            vec![
                Candidate::new(Span::new(0, 5), 50, "long"),
                Candidate::new(Span::new(2, 3), 70, "short"),
            ],
            3,
        )
        .unwrap();
        assert_eq!(picked.item, "short");
    }

    #[test]
    fn test_first_found_on_exact_tie() {
        let picked = pick_best(
            vec![
                Candidate::new(Span::new(2, 3), 50, "first"),
                Candidate::new(Span::new(2, 3), 50, "second"),
            ],
            2,
        )
        .unwrap();
        assert_eq!(picked.item, "first");
    }

    #[test]
    fn test_find_best() {
        let re = Regex::new(r"\d+").unwrap();
        assert_eq!(find_best(&re, "12 345 6", 4), Some(Span::new(3, 5)));
        assert_eq!(find_best(&re, "ab 12 cd 3", 0), Some(Span::new(3, 4)));
        assert_eq!(find_best(&re, "12 ab", 4), Some(Span::new(0, 1)));
        assert_eq!(find_best(&re, "none", 0), None);
    }

    #[test]
    fn test_word_neighbours() {
        assert!(preceded_by_word("a-1", 1));
        assert!(!preceded_by_word(" -1", 1));
        assert!(!preceded_by_word("-1", 0));
        assert!(followed_by_word("12ab", 1));
        assert!(!followed_by_word("12 ", 1));
        assert!(!followed_by_word("12", 1));
    }
}
