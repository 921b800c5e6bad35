//! nudge-core: rule engine for cursor-driven increment/decrement of text tokens
//!
//! This crate provides:
//! - `Rule`: the pluggable contract every token recognizer implements
//! - `Match` / `Metadata` / `Replacement`: the data passed between `locate` and `transform`
//! - `scorer`: ranking of candidate spans relative to the cursor
//! - `Resolver`: per-scope rule lists with lazy references and caching
//! - `Engine`: single-point, range and cumulative-repeat execution
//! - `Edit` / `apply_edits()`: column-span edits applied back to front
//!
//! Columns are byte offsets into a line. A `Match` end column is inclusive.

mod edit;
mod engine;
mod error;
mod host;
mod matches;
mod resolver;
mod rule;
pub mod scorer;
mod span;

pub use edit::{apply_edits, Edit, EditError};
pub use engine::{Engine, ExecuteOptions, Mode, Outcome, PendingOperation};
pub use error::{EngineError, ResolveError};
pub use host::{CursorAccessor, Host, LineAccessor, SelectionAccessor, TextBuffer};
pub use matches::{Match, MatchError, Metadata, Replacement, Value};
pub use resolver::{RuleEntry, RuleFactory, RuleList, RuleLoader, Resolver};
pub use rule::{step_index, Direction, Rule, DEFAULT_PRIORITY};
pub use span::{Cursor, Selection, Span};
