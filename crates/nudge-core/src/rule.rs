//! The rule contract implemented by every token recognizer

use crate::matches::{Match, Metadata, Replacement};
use crate::span::Cursor;

/// Default rule priority
pub const DEFAULT_PRIORITY: i32 = 50;

/// Direction of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    /// Sign applied to the requested step
    pub fn sign(self) -> i64 {
        match self {
            Direction::Increment => 1,
            Direction::Decrement => -1,
        }
    }
}

/// A token recognizer and transformer.
///
/// `locate` and `transform` must be pure: the engine calls `locate` once per
/// probed column in range mode. A rule backed by an asynchronous source (a
/// language server, a syntax tree worker) must answer `locate` synchronously
/// with a timeout and return `None` when the timeout expires.
pub trait Rule: Send + Sync {
    /// Unique identifier (e.g., "integer", "date.iso")
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Higher priority rules win ties between competing matches
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Whether the value space wraps at its boundary
    fn cyclic(&self) -> bool {
        false
    }

    /// Gate evaluated before `locate`
    fn is_enabled(&self, _cursor: Cursor) -> bool {
        true
    }

    /// Find the most relevant match on `line` for `cursor`
    fn locate(&self, line: &str, cursor: Cursor) -> Option<Match>;

    /// Compute the replacement for a match moved by `delta`.
    /// `None` means the boundary was reached or the transform does not apply.
    fn transform(&self, delta: i64, metadata: &Metadata) -> Option<Replacement>;
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id())
            .field("priority", &self.priority())
            .field("cyclic", &self.cyclic())
            .finish()
    }
}

/// Step a position within `0..len` by `delta`. Cyclic steps wrap; other
/// steps clamp to the ends and return `None` when the position does not move.
pub fn step_index(index: usize, delta: i64, len: usize, cyclic: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let target = index as i64 + delta;
    if cyclic {
        let next = target.rem_euclid(len as i64) as usize;
        return Some(next);
    }
    let next = target.clamp(0, len as i64 - 1) as usize;
    (next != index).then_some(next)
}
