//! nudge-rules: built-in token rules
//!
//! Numbers (integer, radix, decimal), dates and times, semantic versions,
//! hex colors, bracket pairs, identifier casing, closed enumerations and
//! custom regex rules, plus the registry that names them and the presets
//! that group them.

pub mod bracket;
pub mod case;
pub mod color;
pub mod constant;
pub mod date;
pub mod decimal;
pub mod integer;
pub mod pattern;
pub mod presets;
pub mod radix;
pub mod registry;
pub mod semver;

pub use bracket::BracketRule;
pub use case::{CaseRule, CaseStyle};
pub use color::{ColorRule, HexCase};
pub use constant::{ConstantRule, GroupError};
pub use date::{DateRule, PatternError};
pub use decimal::DecimalRule;
pub use integer::IntegerRule;
pub use pattern::PatternRule;
pub use presets::{get_preset_rules, Preset};
pub use radix::{Radix, RadixRule};
pub use registry::{RuleInfo, RuleRegistry};
pub use semver::SemverRule;
