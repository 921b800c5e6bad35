//! Closed enumerations of literal values

use nudge_core::scorer::{best_span, followed_by_word, preceded_by_word};
use nudge_core::{step_index, Cursor, Match, Metadata, Replacement, Rule, Span};
use thiserror::Error;

/// Errors from building a grouped enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("enumeration has no values")]
    Empty,

    #[error("group {group} has {found} values, expected {expected}")]
    Mismatched {
        group: usize,
        expected: usize,
        found: usize,
    },
}

/// Cycles a literal through a list of values.
///
/// A flat list is one group. With several groups (`true/false`,
/// `True/False`...) a value steps within its own group, so its spelling is
/// kept.
pub struct ConstantRule {
    id: String,
    groups: Vec<Vec<String>>,
    word_boundary: bool,
    cyclic: bool,
    priority: i32,
}

impl ConstantRule {
    pub fn flat<S: Into<String>>(
        id: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Result<Self, GroupError> {
        Self::grouped(id, [values])
    }

    pub fn grouped<S, G>(
        id: impl Into<String>,
        groups: impl IntoIterator<Item = G>,
    ) -> Result<Self, GroupError>
    where
        S: Into<String>,
        G: IntoIterator<Item = S>,
    {
        let groups: Vec<Vec<String>> = groups
            .into_iter()
            .map(|g| g.into_iter().map(Into::into).collect())
            .collect();
        let expected = groups.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GroupError::Empty);
        }
        if let Some((group, values)) = groups
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(GroupError::Mismatched {
                group,
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            groups,
            word_boundary: true,
            cyclic: true,
            priority: nudge_core::DEFAULT_PRIORITY,
        })
    }

    /// Require the value not to be glued to word characters (default on)
    pub fn with_word_boundary(mut self, word_boundary: bool) -> Self {
        self.word_boundary = word_boundary;
        self
    }

    /// Wrap at the ends of the list (default on)
    pub fn with_cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn position(&self, text: &str) -> Option<(usize, usize)> {
        self.groups.iter().enumerate().find_map(|(g, values)| {
            values.iter().position(|v| v == text).map(|i| (g, i))
        })
    }
}

impl Rule for ConstantRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "One of a fixed list of values"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn cyclic(&self) -> bool {
        self.cyclic
    }

    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match> {
        let mut found = Vec::new();
        for (g, values) in self.groups.iter().enumerate() {
            for (i, value) in values.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                for (start, _) in line.match_indices(value.as_str()) {
                    let end = start + value.len() - 1;
                    if self.word_boundary
                        && (preceded_by_word(line, start) || followed_by_word(line, end))
                    {
                        continue;
                    }
                    found.push((Span::new(start, end), g, i));
                }
            }
        }
        let span = best_span(found.iter().map(|(span, _, _)| *span), cursor.col)?;
        let (_, group, index) = found.into_iter().find(|(s, _, _)| *s == span)?;
        Some(
            Match::from_span(line, span)
                .with("group", group)
                .with("index", index),
        )
    }

    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement> {
        let (group, index) = match (metadata.int("group"), metadata.int("index")) {
            (Some(g), Some(i)) => (usize::try_from(g).ok()?, usize::try_from(i).ok()?),
            _ => self.position(&metadata.text)?,
        };
        let values = self.groups.get(group)?;
        if values.get(index)? != &metadata.text {
            return None;
        }
        let next = step_index(index, delta, values.len(), self.cyclic)?;
        Some(Replacement::Text(values[next].clone()))
    }
}
