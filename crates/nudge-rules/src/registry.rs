//! Rule registry for looking up built-in rules by name
//!
//! The registry owns one instance of every built-in rule and doubles as the
//! resolver's loader for named rule references.

use std::collections::HashMap;
use std::sync::Arc;

use nudge_core::{ResolveError, Rule, RuleEntry, RuleLoader};
use tracing::debug;

use crate::bracket::BracketRule;
use crate::case::CaseRule;
use crate::color::ColorRule;
use crate::constant::{ConstantRule, GroupError};
use crate::date::DateRule;
use crate::decimal::DecimalRule;
use crate::integer::IntegerRule;
use crate::pattern::PatternRule;
use crate::presets::Preset;
use crate::radix::RadixRule;
use crate::semver::SemverRule;

/// Information about a registered rule
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub name: String,
    pub description: String,
    pub priority: i32,
    pub cyclic: bool,
}

/// Registry of all built-in rules
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
    by_name: HashMap<String, usize>,
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn date(id: &str, pattern: &str) -> Arc<dyn Rule> {
    Arc::new(
        DateRule::new(pattern)
            .expect("built-in date pattern")
            .with_id(id),
    )
}

fn constant(rule: Result<ConstantRule, GroupError>) -> ConstantRule {
    rule.expect("built-in enumeration")
}

fn letters(id: &str, range: std::ops::RangeInclusive<char>) -> Arc<dyn Rule> {
    let values: Vec<String> = range.map(String::from).collect();
    Arc::new(constant(ConstantRule::flat(id, values)).with_cyclic(false))
}

/// Every built-in rule, in registration order
fn builtin() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(IntegerRule::signed()),
        Arc::new(IntegerRule::natural()),
        Arc::new(RadixRule::hex()),
        Arc::new(RadixRule::octal()),
        Arc::new(RadixRule::binary()),
        Arc::new(DecimalRule::new()),
        date("date.ymd", "%Y/%m/%d"),
        date("date.iso", "%Y-%m-%d"),
        date("date.md", "%m/%d"),
        date("date.dmy", "%d.%m.%Y"),
        date("time.hms", "%H:%M:%S"),
        date("time.hm", "%H:%M"),
        date("datetime.iso", "%Y-%m-%d %H:%M:%S"),
        Arc::new(SemverRule::new()),
        Arc::new(ColorRule::new()),
        Arc::new(BracketRule::new()),
        Arc::new(CaseRule::new()),
        Arc::new(
            constant(ConstantRule::grouped(
                "bool",
                [["true", "false"], ["True", "False"], ["TRUE", "FALSE"]],
            )),
        ),
        Arc::new(constant(ConstantRule::flat("onoff", ["on", "off"]))),
        Arc::new(constant(ConstantRule::flat("yesno", ["yes", "no"]))),
        Arc::new(
            constant(ConstantRule::flat("logical", ["&&", "||"])).with_word_boundary(false),
        ),
        letters("alpha", 'a'..='z'),
        letters("Alpha", 'A'..='Z'),
        Arc::new(
            constant(ConstantRule::grouped(
                "weekday",
                [WEEKDAYS.to_vec(), WEEKDAYS_SHORT.to_vec()],
            )),
        ),
        Arc::new(
            constant(ConstantRule::grouped(
                "month",
                [MONTHS.to_vec(), MONTHS_SHORT.to_vec()],
            )),
        ),
        Arc::new(PatternRule::markdown_header()),
    ]
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for rule in builtin() {
            registry.register(rule);
        }
        registry
    }

    /// Register a rule under its id, replacing any rule with the same id
    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        let name = rule.id().to_string();
        match self.by_name.get(&name) {
            Some(&idx) => {
                debug!(rule = %name, "replacing registered rule");
                self.rules[idx] = rule;
            }
            None => {
                self.by_name.insert(name, self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// Get a rule by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    pub fn all_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Get information about all rules
    pub fn list(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|r| RuleInfo {
                name: r.id().to_string(),
                description: r.description().to_string(),
                priority: r.priority(),
                cyclic: r.cyclic(),
            })
            .collect()
    }

    /// Named references for `names`, to be resolved lazily through this
    /// registry
    pub fn entries<S: AsRef<str>>(names: &[S]) -> Vec<RuleEntry> {
        names
            .iter()
            .map(|name| match name.as_ref() {
                "inherit" => RuleEntry::Inherit,
                name => RuleEntry::named(name),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleLoader for RuleRegistry {
    fn load(&self, name: &str) -> Result<Arc<dyn Rule>, ResolveError> {
        if let Some(rule) = self.get(name) {
            return Ok(Arc::clone(rule));
        }
        if Preset::from_str(name).is_some() {
            return Err(ResolveError::Invalid {
                name: name.to_string(),
                reason: "a preset is not a rule; set it as [rules] preset".to_string(),
            });
        }
        Err(ResolveError::UnknownRule(name.to_string()))
    }
}
