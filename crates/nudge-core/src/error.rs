//! Engine and resolver errors
//!
//! None of these are fatal: an `EngineError` means the operation was aborted
//! and the buffer and cursor were left as they were.

use thiserror::Error;

use crate::edit::EditError;
use crate::matches::MatchError;

/// Failure to resolve a rule reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    #[error("Rule '{name}' could not be built: {reason}")]
    Invalid { name: String, reason: String },
}

/// An operation aborted without touching the buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Rule '{rule}' produced an invalid match: {source}")]
    InvalidMatch {
        rule: String,
        #[source]
        source: MatchError,
    },

    #[error("Rule '{rule}' returned an invalid replacement: {reason}")]
    InvalidReplacement { rule: String, reason: String },

    #[error("Line {0} is out of range")]
    LineOutOfRange(usize),

    #[error(transparent)]
    Edit(#[from] EditError),
}
