//! Execution engine: one user-triggered increment or decrement
//!
//! An operation resolves the rules for a scope, locates the winning match at
//! the cursor (or every match across a selection), asks the rule for the
//! replacement, rewrites whole lines through the host and repositions the
//! cursor. Any failure leaves the buffer and cursor untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::edit::{apply_edits, Edit};
use crate::error::EngineError;
use crate::host::Host;
use crate::matches::{Match, Replacement};
use crate::resolver::{Resolver, RuleEntry};
use crate::rule::{Direction, Rule};
use crate::scorer::{self, Candidate};
use crate::span::{Cursor, Span};

/// Operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The token under the cursor
    #[default]
    Single,
    /// Every token in the host selection
    Range,
}

/// Options for `Engine::execute`
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub mode: Mode,
    /// Range mode: the Nth match receives `step * N`
    pub sequential: bool,
    /// Step size, at least 1
    pub step: u32,
    /// Start a repeat-with-growing-step sequence (single mode only)
    pub cumulative: bool,
    /// Use exactly these rules for this call
    pub rule_override: Option<Vec<RuleEntry>>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            sequential: false,
            step: 1,
            cumulative: false,
            rule_override: None,
        }
    }
}

impl ExecuteOptions {
    pub fn single() -> Self {
        Self::default()
    }

    pub fn range() -> Self {
        Self {
            mode: Mode::Range,
            ..Self::default()
        }
    }

    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn rules(mut self, rules: Vec<RuleEntry>) -> Self {
        self.rule_override = Some(rules);
        self
    }
}

/// What an operation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `edits` tokens were rewritten and the cursor moved to `cursor`
    Applied { edits: usize, cursor: Cursor },
    /// No rule matched at the cursor or in the selection
    NoMatch,
    /// Matches were found but every transform was at its boundary
    BoundaryReached,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// State of a repeat-with-growing-step sequence
#[derive(Debug, Clone)]
pub struct PendingOperation {
    pub direction: Direction,
    pub rule: Arc<dyn Rule>,
    pub cumulative_sum: i64,
}

/// Runs operations against a host. Owns the resolver cache and the pending
/// cumulative state; a multi-threaded host must put it behind a mutex.
pub struct Engine {
    resolver: Resolver,
    pending: Option<PendingOperation>,
}

impl Engine {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            pending: None,
        }
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    pub fn pending(&self) -> Option<&PendingOperation> {
        self.pending.as_ref()
    }

    pub fn clear_cache(&mut self, scope: Option<&str>) {
        self.resolver.clear_cache(scope);
    }

    /// Run one operation. Any non-cumulative operation ends a repeat sequence.
    pub fn execute<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        scope: &str,
        direction: Direction,
        options: &ExecuteOptions,
    ) -> Result<Outcome, EngineError> {
        debug!(scope, ?direction, mode = ?options.mode, step = options.step, "execute");
        self.pending = None;

        let step = i64::from(options.step.max(1));
        let rules = self.resolver.resolve(scope, options.rule_override.as_deref());

        match options.mode {
            Mode::Range => run_range(host, &rules, direction, step, options.sequential),
            Mode::Single => {
                let cursor = host.cursor();
                let line = host
                    .line(cursor.row)
                    .ok_or(EngineError::LineOutOfRange(cursor.row))?;

                let Some((rule, found)) = locate_at(&rules, &line, cursor) else {
                    debug!(row = cursor.row, col = cursor.col, "no match at cursor");
                    return Ok(Outcome::NoMatch);
                };

                let outcome = apply_match(host, &line, cursor, rule.as_ref(), &found, direction.sign() * step)?;
                if options.cumulative {
                    self.pending = Some(PendingOperation {
                        direction,
                        rule,
                        cumulative_sum: step,
                    });
                }
                Ok(outcome)
            }
        }
    }

    /// Repeat the pending cumulative operation at the current cursor, growing
    /// the step by `step` (default 1). The stored rule is used directly.
    pub fn repeat<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        step: Option<u32>,
    ) -> Result<Outcome, EngineError> {
        let Some(pending) = self.pending.as_mut() else {
            debug!("repeat without a pending operation");
            return Ok(Outcome::NoMatch);
        };

        let cursor = host.cursor();
        let line = host
            .line(cursor.row)
            .ok_or(EngineError::LineOutOfRange(cursor.row))?;
        let rule = Arc::clone(&pending.rule);

        if !rule.is_enabled(cursor) {
            return Ok(Outcome::NoMatch);
        }
        let Some(found) = rule.locate(&line, cursor) else {
            return Ok(Outcome::NoMatch);
        };
        found.validate(&line).map_err(|source| EngineError::InvalidMatch {
            rule: rule.id().to_string(),
            source,
        })?;
        if !found.span().contains(cursor.col) {
            return Ok(Outcome::NoMatch);
        }

        pending.cumulative_sum += i64::from(step.unwrap_or(1).max(1));
        let delta = pending.direction.sign() * pending.cumulative_sum;
        debug!(rule = rule.id(), delta, "repeat");

        apply_match(host, &line, cursor, rule.as_ref(), &found, delta)
    }
}

/// The best containing match among `rules` for `cursor`
fn locate_at(rules: &[Arc<dyn Rule>], line: &str, cursor: Cursor) -> Option<(Arc<dyn Rule>, Match)> {
    let candidates = rules
        .iter()
        .filter(|rule| rule.is_enabled(cursor))
        .filter_map(|rule| {
            let found = rule.locate(line, cursor)?;
            if let Err(err) = found.validate(line) {
                warn!(rule = rule.id(), error = %err, "rule produced an invalid match");
                return None;
            }
            let span = found.span();
            if !span.contains(cursor.col) {
                return None;
            }
            Some(Candidate::new(span, rule.priority(), (Arc::clone(rule), found)))
        });

    scorer::pick_best(candidates, cursor.col).map(|c| c.item)
}

fn check_replacement(rule: &dyn Rule, replacement: &Replacement) -> Result<(), EngineError> {
    let text = replacement.text();
    if text.contains('\n') {
        return Err(EngineError::InvalidReplacement {
            rule: rule.id().to_string(),
            reason: "replacement spans multiple lines".to_string(),
        });
    }
    if let Some(offset) = replacement.cursor_offset() {
        let in_bounds = offset < text.len() || (offset == 0 && text.is_empty());
        if !in_bounds || !text.is_char_boundary(offset) {
            return Err(EngineError::InvalidReplacement {
                rule: rule.id().to_string(),
                reason: format!("cursor offset {} outside {:?}", offset, text),
            });
        }
    }
    Ok(())
}

/// New cursor column after replacing a token starting at `start`.
///
/// Keeps the cursor's offset within the token, clamped to the new text,
/// unless the replacement carries an explicit offset.
fn reposition(new_line: &str, start: usize, offset: usize, replacement: &Replacement) -> usize {
    let text = replacement.text();
    let within = replacement
        .cursor_offset()
        .unwrap_or(offset)
        .min(text.len().saturating_sub(1));
    floor_char_boundary(new_line, start + within)
}

fn floor_char_boundary(line: &str, mut col: usize) -> usize {
    col = col.min(line.len());
    while col > 0 && !line.is_char_boundary(col) {
        col -= 1;
    }
    col
}

fn apply_match<H: Host + ?Sized>(
    host: &mut H,
    line: &str,
    cursor: Cursor,
    rule: &dyn Rule,
    found: &Match,
    delta: i64,
) -> Result<Outcome, EngineError> {
    let Some(replacement) = rule.transform(delta, &found.metadata) else {
        debug!(rule = rule.id(), delta, "boundary reached");
        return Ok(Outcome::BoundaryReached);
    };
    check_replacement(rule, &replacement)?;

    let edit = Edit::new(found.span(), replacement.text(), rule.id());
    let new_line = apply_edits(line, std::slice::from_ref(&edit))?;
    let col = reposition(&new_line, found.start, cursor.col - found.start, &replacement);

    host.set_line(cursor.row, new_line);
    let cursor = Cursor::new(cursor.row, col);
    host.set_cursor(cursor);
    Ok(Outcome::Applied { edits: 1, cursor })
}

fn run_range<H: Host + ?Sized>(
    host: &mut H,
    rules: &[Arc<dyn Rule>],
    direction: Direction,
    step: i64,
    sequential: bool,
) -> Result<Outcome, EngineError> {
    let Some(selection) = host.selection() else {
        debug!("range operation without a selection");
        return Ok(Outcome::NoMatch);
    };

    let mut lines: BTreeMap<usize, String> = BTreeMap::new();
    let mut found: Vec<(usize, Arc<dyn Rule>, Match)> = Vec::new();

    for row in selection.rows() {
        let Some(line) = host.line(row) else {
            break;
        };
        let Some((from, to)) = selection.columns(row, line.len()) else {
            continue;
        };

        let mut last: Option<Span> = None;
        for col in from..=to {
            if !line.is_char_boundary(col) || last.is_some_and(|span| span.contains(col)) {
                continue;
            }
            trace!(row, col, "probing");
            let Some((rule, m)) = locate_at(rules, &line, Cursor::new(row, col)) else {
                continue;
            };
            let span = m.span();
            if last.is_some_and(|prev| prev.overlaps(&span)) {
                continue;
            }
            last = Some(span);
            found.push((row, rule, m));
        }
        lines.insert(row, line);
    }

    let Some((first_row, _, first)) = found.first() else {
        return Ok(Outcome::NoMatch);
    };
    let first_cursor = Cursor::new(*first_row, first.start);

    let mut edits: BTreeMap<usize, Vec<Edit>> = BTreeMap::new();
    for (n, (row, rule, m)) in found.iter().enumerate() {
        let multiplier = if sequential { n as i64 + 1 } else { 1 };
        let delta = direction.sign() * step * multiplier;
        let Some(replacement) = rule.transform(delta, &m.metadata) else {
            debug!(rule = rule.id(), row, col = m.start, "boundary reached");
            continue;
        };
        if let Err(err) = check_replacement(rule.as_ref(), &replacement) {
            warn!(error = %err, "skipping match");
            continue;
        }
        edits
            .entry(*row)
            .or_default()
            .push(Edit::new(m.span(), replacement.text(), rule.id()));
    }

    if edits.is_empty() {
        return Ok(Outcome::BoundaryReached);
    }

    // Build every new line before touching the host
    let mut rewritten: Vec<(usize, String)> = Vec::with_capacity(edits.len());
    for (row, row_edits) in &edits {
        let line = lines.get(row).ok_or(EngineError::LineOutOfRange(*row))?;
        rewritten.push((*row, apply_edits(line, row_edits)?));
    }

    let count = edits.values().map(Vec::len).sum();
    for (row, line) in rewritten.into_iter().rev() {
        host.set_line(row, line);
    }
    host.set_cursor(first_cursor);
    Ok(Outcome::Applied {
        edits: count,
        cursor: first_cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CursorAccessor, LineAccessor, TextBuffer};
    use crate::matches::Metadata;
    use crate::span::Selection;
    use regex::Regex;

    /// Unsigned integers, clamped at zero
    struct Digits {
        re: Regex,
    }

    impl Digits {
        fn new() -> Self {
            Self {
                re: Regex::new(r"\d+").unwrap(),
            }
        }
    }

    impl Rule for Digits {
        fn id(&self) -> &str {
            "digits"
        }

        fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
            let span = scorer::find_best(&self.re, line, cursor.col)?;
            Some(Match::from_span(line, span))
        }

        fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
            let value: i64 = metadata.text.parse().ok()?;
            let next = value + delta;
            if next < 0 {
                return None;
            }
            Some(Replacement::Text(next.to_string()))
        }
    }

    /// Always reports a span that does not match the line
    struct Broken;

    impl Rule for Broken {
        fn id(&self) -> &str {
            "broken"
        }

        fn priority(&self) -> i32 {
            99
        }

        fn locate(&self, _line: &str, cursor: Cursor) -> Option<Match> {
            Some(Match::new(cursor.col, cursor.col, Metadata::new("not there")))
        }

        fn transform(&self, _delta: i64, _metadata: &Metadata) -> Option<Replacement> {
            Some(Replacement::Text("x".to_string()))
        }
    }

    /// Returns an out-of-range cursor offset
    struct BadOffset;

    impl Rule for BadOffset {
        fn id(&self) -> &str {
            "bad_offset"
        }

        fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
            Some(Match::from_span(line, Span::new(cursor.col, cursor.col)))
        }

        fn transform(&self, _delta: i64, _metadata: &Metadata) -> Option<Replacement> {
            Some(Replacement::with_cursor("ab", 5))
        }
    }

    /// Digits stepped by hundreds, enabled on the first row only
    struct FirstRow(Digits);

    impl Rule for FirstRow {
        fn id(&self) -> &str {
            "first_row"
        }

        fn priority(&self) -> i32 {
            90
        }

        fn is_enabled(&self, cursor: Cursor) -> bool {
            cursor.row == 0
        }

        fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
            self.0.locate(line, cursor)
        }

        fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
            self.0.transform(delta * 100, metadata)
        }
    }

    fn engine() -> Engine {
        Engine::new(Resolver::new(vec![RuleEntry::rule(Digits::new())]))
    }

    fn gated_engine() -> Engine {
        Engine::new(Resolver::new(vec![
            RuleEntry::rule(FirstRow(Digits::new())),
            RuleEntry::rule(Digits::new()),
        ]))
    }

    #[test]
    fn test_single_increment() {
        let mut buffer = TextBuffer::from_text("foo 123 bar").with_cursor(0, 4);
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(buffer.text(), "foo 124 bar");
        assert_eq!(outcome, Outcome::Applied { edits: 1, cursor: Cursor::new(0, 4) });
    }

    #[test]
    fn test_single_cursor_offset_clamped() {
        let mut buffer = TextBuffer::from_text("x 100").with_cursor(0, 4);
        engine()
            .execute(&mut buffer, "buf", Direction::Decrement, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(buffer.text(), "x 99");
        assert_eq!(buffer.cursor(), Cursor::new(0, 3));
    }

    #[test]
    fn test_no_match_outside_token() {
        let mut buffer = TextBuffer::from_text("foo 123").with_cursor(0, 1);
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
        assert_eq!(buffer.text(), "foo 123");
        assert_eq!(buffer.cursor(), Cursor::new(0, 1));
    }

    #[test]
    fn test_boundary_leaves_buffer() {
        let mut buffer = TextBuffer::from_text("0").with_cursor(0, 0);
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Decrement, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(outcome, Outcome::BoundaryReached);
        assert_eq!(buffer.text(), "0");
    }

    #[test]
    fn test_step() {
        let mut buffer = TextBuffer::from_text("10").with_cursor(0, 0);
        engine()
            .execute(&mut buffer, "buf", Direction::Decrement, &ExecuteOptions::single().step(7))
            .unwrap();
        assert_eq!(buffer.text(), "3");
    }

    #[test]
    fn test_invalid_match_does_not_block_other_rules() {
        let mut engine = Engine::new(Resolver::new(vec![
            RuleEntry::rule(Broken),
            RuleEntry::rule(Digits::new()),
        ]));
        let mut buffer = TextBuffer::from_text("a 5").with_cursor(0, 2);
        engine
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(buffer.text(), "a 6");
    }

    #[test]
    fn test_invalid_replacement_aborts() {
        let mut engine = Engine::new(Resolver::new(vec![RuleEntry::rule(BadOffset)]));
        let mut buffer = TextBuffer::from_text("abc").with_cursor(0, 1);
        let result = engine.execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single());
        assert!(matches!(result, Err(EngineError::InvalidReplacement { .. })));
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.cursor(), Cursor::new(0, 1));
    }

    #[test]
    fn test_line_out_of_range() {
        let mut buffer = TextBuffer::from_text("1").with_cursor(4, 0);
        let result = engine().execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single());
        assert_eq!(result, Err(EngineError::LineOutOfRange(4)));
    }

    #[test]
    fn test_rule_override() {
        let mut engine = Engine::new(Resolver::default());
        let mut buffer = TextBuffer::from_text("41").with_cursor(0, 0);
        let options = ExecuteOptions::single().rules(vec![RuleEntry::rule(Digits::new())]);
        engine
            .execute(&mut buffer, "buf", Direction::Increment, &options)
            .unwrap();
        assert_eq!(buffer.text(), "42");

        let outcome = engine
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
    }

    #[test]
    fn test_range_uniform() {
        let mut buffer = TextBuffer::from_text("1 22\n9 x 3");
        buffer.select(Some(Selection::linear(Cursor::new(0, 0), Cursor::new(1, 2))));
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::range())
            .unwrap();
        assert_eq!(buffer.text(), "2 23\n10 x 3");
        assert_eq!(outcome, Outcome::Applied { edits: 3, cursor: Cursor::new(0, 0) });
    }

    #[test]
    fn test_range_sequential() {
        let mut buffer = TextBuffer::from_text("1\n1\n1");
        buffer.select(Some(Selection::linear(Cursor::new(0, 0), Cursor::new(2, 0))));
        engine()
            .execute(
                &mut buffer,
                "buf",
                Direction::Increment,
                &ExecuteOptions::range().sequential(true),
            )
            .unwrap();
        assert_eq!(buffer.lines(), &["2", "3", "4"]);
    }

    #[test]
    fn test_range_same_row_rewrites_back_to_front() {
        let mut buffer = TextBuffer::from_text("9 9 9");
        buffer.select(Some(Selection::linear(Cursor::new(0, 0), Cursor::new(0, 4))));
        engine()
            .execute(
                &mut buffer,
                "buf",
                Direction::Increment,
                &ExecuteOptions::range().sequential(true),
            )
            .unwrap();
        assert_eq!(buffer.text(), "10 11 12");
    }

    #[test]
    fn test_range_block() {
        let mut buffer = TextBuffer::from_text("1 5\n2 6");
        buffer.select(Some(Selection::block(Cursor::new(0, 2), Cursor::new(1, 2))));
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::range())
            .unwrap();
        assert_eq!(buffer.text(), "1 6\n2 7");
        assert_eq!(buffer.cursor(), Cursor::new(0, 2));
        assert!(outcome.is_applied());
    }

    #[test]
    fn test_range_without_selection() {
        let mut buffer = TextBuffer::from_text("1");
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::range())
            .unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
    }

    #[test]
    fn test_range_all_at_boundary() {
        let mut buffer = TextBuffer::from_text("0 0");
        buffer.select(Some(Selection::linear(Cursor::new(0, 0), Cursor::new(0, 2))));
        let outcome = engine()
            .execute(&mut buffer, "buf", Direction::Decrement, &ExecuteOptions::range())
            .unwrap();
        assert_eq!(outcome, Outcome::BoundaryReached);
        assert_eq!(buffer.text(), "0 0");
    }

    #[test]
    fn test_cumulative_repeat_grows_step() {
        let mut engine = engine();
        let mut buffer = TextBuffer::from_text("1").with_cursor(0, 0);
        engine
            .execute(
                &mut buffer,
                "buf",
                Direction::Increment,
                &ExecuteOptions::single().cumulative(true),
            )
            .unwrap();
        assert_eq!(buffer.text(), "2");

        engine.repeat(&mut buffer, None).unwrap();
        assert_eq!(buffer.text(), "4");
        engine.repeat(&mut buffer, None).unwrap();
        assert_eq!(buffer.text(), "7");
        engine.repeat(&mut buffer, Some(3)).unwrap();
        assert_eq!(buffer.text(), "13");
        assert_eq!(engine.pending().map(|p| p.cumulative_sum), Some(6));
    }

    #[test]
    fn test_disabled_rule_does_not_win() {
        let mut engine = gated_engine();
        let mut buffer = TextBuffer::from_text("1\n1").with_cursor(0, 0);
        engine
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(buffer.lines(), &["101", "1"]);

        buffer.set_cursor(Cursor::new(1, 0));
        engine
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert_eq!(buffer.lines(), &["101", "2"]);
    }

    #[test]
    fn test_repeat_with_disabled_rule_is_no_match() {
        let mut engine = gated_engine();
        let mut buffer = TextBuffer::from_text("1\n1").with_cursor(0, 0);
        engine
            .execute(
                &mut buffer,
                "buf",
                Direction::Increment,
                &ExecuteOptions::single().cumulative(true),
            )
            .unwrap();
        assert_eq!(buffer.lines(), &["101", "1"]);

        buffer.set_cursor(Cursor::new(1, 0));
        assert_eq!(engine.repeat(&mut buffer, None).unwrap(), Outcome::NoMatch);
        assert_eq!(buffer.lines(), &["101", "1"]);
        assert_eq!(buffer.cursor(), Cursor::new(1, 0));
    }

    #[test]
    fn test_non_cumulative_discards_pending() {
        let mut engine = engine();
        let mut buffer = TextBuffer::from_text("1").with_cursor(0, 0);
        engine
            .execute(
                &mut buffer,
                "buf",
                Direction::Increment,
                &ExecuteOptions::single().cumulative(true),
            )
            .unwrap();
        assert!(engine.pending().is_some());

        engine
            .execute(&mut buffer, "buf", Direction::Increment, &ExecuteOptions::single())
            .unwrap();
        assert!(engine.pending().is_none());
        assert_eq!(engine.repeat(&mut buffer, None).unwrap(), Outcome::NoMatch);
        assert_eq!(buffer.line(0).as_deref(), Some("3"));
    }
}
