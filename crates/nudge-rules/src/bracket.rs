//! Bracket pair cycling

use nudge_core::{step_index, Cursor, Match, Metadata, Replacement, Rule, Span};

/// Cycles a bracket pair through a fixed list of kinds, keeping the content.
///
/// Only matches when the cursor sits on the opening or closing character.
/// Pairs are found with a depth-counted scan, so `(a[b]c)` pairs the outer
/// parentheses with each other.
pub struct BracketRule {
    pairs: Vec<(char, char)>,
}

impl BracketRule {
    pub fn new() -> Self {
        Self::with_pairs(vec![('(', ')'), ('[', ']'), ('{', '}')])
    }

    pub fn with_pairs(pairs: Vec<(char, char)>) -> Self {
        Self { pairs }
    }

    fn kind_of_open(&self, c: char) -> Option<usize> {
        self.pairs.iter().position(|(open, _)| *open == c)
    }

    fn kind_of_close(&self, c: char) -> Option<usize> {
        self.pairs.iter().position(|(_, close)| *close == c)
    }

    /// Every properly nested pair on the line as (open byte, close byte, kind)
    fn pairs_in(&self, line: &str) -> Vec<(usize, usize, usize)> {
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut found = Vec::new();
        for (i, c) in line.char_indices() {
            if let Some(kind) = self.kind_of_open(c) {
                stack.push((i, kind));
            } else if let Some(kind) = self.kind_of_close(c) {
                // Unclosed openers above the match are abandoned
                if let Some(pos) = stack.iter().rposition(|(_, k)| *k == kind) {
                    let (open, _) = stack[pos];
                    stack.truncate(pos);
                    found.push((open, i, kind));
                }
            }
        }
        found
    }
}

impl Default for BracketRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for BracketRule {
    fn id(&self) -> &str {
        "bracket"
    }

    fn description(&self) -> &str {
        "Bracket pair kind: () -> [] -> {}"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn cyclic(&self) -> bool {
        true
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let (open, close, kind) = self
            .pairs_in(line)
            .into_iter()
            .find(|(open, close, _)| *open == cursor.col || *close == cursor.col)?;
        let close_len = line[close..].chars().next().map_or(1, char::len_utf8);
        let span = Span::new(open, close + close_len - 1);
        Some(Match::from_span(line, span).with("kind", kind))
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let text = metadata.text.as_str();
        if text.chars().count() < 2 {
            return None;
        }
        let first = text.chars().next()?;
        let last = text.chars().next_back()?;
        let kind = self.kind_of_open(first)?;
        if self.kind_of_close(last)? != kind {
            return None;
        }
        let next = step_index(kind, delta, self.pairs.len(), self.cyclic())?;
        let (open, close) = self.pairs[next];
        let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];
        Some(Replacement::Text(format!("{}{}{}", open, inner, close)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, delta: i64) -> Option<String> {
        BracketRule::new()
            .transform(delta, &Metadata::new(text))
            .map(|r| r.text().to_string())
    }

    #[test]
    fn test_cycle() {
        assert_eq!(apply("(x)", 1).as_deref(), Some("[x]"));
        assert_eq!(apply("[x]", 1).as_deref(), Some("{x}"));
        assert_eq!(apply("{x}", 1).as_deref(), Some("(x)"));
        assert_eq!(apply("(x)", -1).as_deref(), Some("{x}"));
    }

    #[test]
    fn test_full_cycle_keeps_content() {
        let original = "(a, [b], {c})";
        let mut text = original.to_string();
        for _ in 0..3 {
            text = apply(&text, 1).unwrap();
        }
        assert_eq!(text, original);
    }

    #[test]
    fn test_only_on_bracket_characters() {
        let rule = BracketRule::new();
        let line = "f(a[b]c)";
        let outer = rule.locate(line, Cursor::new(0, 1)).unwrap();
        assert_eq!((outer.start, outer.end), (1, 7));
        let outer = rule.locate(line, Cursor::new(0, 7)).unwrap();
        assert_eq!(outer.metadata.text, "(a[b]c)");
        let inner = rule.locate(line, Cursor::new(0, 3)).unwrap();
        assert_eq!(inner.metadata.text, "[b]");
        assert!(rule.locate(line, Cursor::new(0, 2)).is_none());
        assert!(rule.locate(line, Cursor::new(0, 0)).is_none());
    }

    #[test]
    fn test_depth_counted_pairing() {
        let rule = BracketRule::new();
        let found = rule.locate("((a)(b))", Cursor::new(0, 0)).unwrap();
        assert_eq!(found.metadata.text, "((a)(b))");
        assert!(rule.locate("(a", Cursor::new(0, 0)).is_none());
    }
}
