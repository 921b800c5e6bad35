//! Per-scope rule resolution
//!
//! A scope (usually one open document) may carry its own rule list on top of
//! the global one. Entries can be rules, named references resolved lazily
//! through a `RuleLoader`, or factories. Resolved sets are cached per scope
//! and rebuilt when either list is replaced or the cache is cleared.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::rule::Rule;

/// Zero-argument rule constructor
pub type RuleFactory = Arc<dyn Fn() -> Arc<dyn Rule> + Send + Sync>;

/// One entry of a rule list
#[derive(Clone)]
pub enum RuleEntry {
    /// A rule value
    Rule(Arc<dyn Rule>),
    /// A reference resolved through the `RuleLoader` on first use
    Named(String),
    /// A constructor invoked at resolution time
    Factory(RuleFactory),
    /// As the first entry of a scope list: global rules first, then the rest
    Inherit,
}

impl RuleEntry {
    pub fn rule(rule: impl Rule + 'static) -> Self {
        RuleEntry::Rule(Arc::new(rule))
    }

    pub fn named(name: impl Into<String>) -> Self {
        RuleEntry::Named(name.into())
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Rule> + Send + Sync + 'static,
    {
        RuleEntry::Factory(Arc::new(factory))
    }
}

impl fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleEntry::Rule(rule) => write!(f, "Rule({})", rule.id()),
            RuleEntry::Named(name) => write!(f, "Named({name})"),
            RuleEntry::Factory(_) => write!(f, "Factory"),
            RuleEntry::Inherit => write!(f, "Inherit"),
        }
    }
}

/// A rule list. Replacing a list (a new `Arc`) invalidates cached resolutions.
pub type RuleList = Arc<[RuleEntry]>;

/// Resolves named rule references
pub trait RuleLoader: Send + Sync {
    fn load(&self, name: &str) -> Result<Arc<dyn Rule>, ResolveError>;
}

struct CachedRules {
    scope_list: Option<RuleList>,
    global: RuleList,
    rules: Arc<[Arc<dyn Rule>]>,
}

/// Merges the global and per-scope rule lists and caches the result per scope
pub struct Resolver {
    loader: Option<Arc<dyn RuleLoader>>,
    global: RuleList,
    scopes: HashMap<String, RuleList>,
    cache: HashMap<String, CachedRules>,
    references: HashMap<(String, String), Arc<dyn Rule>>,
}

impl Resolver {
    pub fn new(global: impl Into<RuleList>) -> Self {
        Self {
            loader: None,
            global: global.into(),
            scopes: HashMap::new(),
            cache: HashMap::new(),
            references: HashMap::new(),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn RuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn set_global(&mut self, list: impl Into<RuleList>) {
        self.global = list.into();
    }

    pub fn set_scope(&mut self, scope: impl Into<String>, list: impl Into<RuleList>) {
        self.scopes.insert(scope.into(), list.into());
    }

    /// Drop cached resolutions and resolved references for one scope, or all
    pub fn clear_cache(&mut self, scope: Option<&str>) {
        match scope {
            Some(scope) => {
                self.cache.remove(scope);
                self.references.retain(|(s, _), _| s != scope);
            }
            None => {
                self.cache.clear();
                self.references.clear();
            }
        }
    }

    /// Resolve the active rules for `scope`, sorted by descending priority.
    ///
    /// An override list replaces the global and scope lists for this call only.
    pub fn resolve(
        &mut self,
        scope: &str,
        override_list: Option<&[RuleEntry]>,
    ) -> Arc<[Arc<dyn Rule>]> {
        if let Some(list) = override_list {
            return self.build(scope, list.iter()).into();
        }

        let global = Arc::clone(&self.global);
        let scope_list = self.scopes.get(scope).cloned();

        if let Some(cached) = self.cache.get(scope) {
            let same_scope = match (&cached.scope_list, &scope_list) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if same_scope && Arc::ptr_eq(&cached.global, &global) {
                debug!(scope, "rule set cache hit");
                return Arc::clone(&cached.rules);
            }
        }

        let entries: Vec<&RuleEntry> = match scope_list.as_deref() {
            Some([RuleEntry::Inherit, rest @ ..]) => global.iter().chain(rest.iter()).collect(),
            Some(list) => list.iter().chain(global.iter()).collect(),
            None => global.iter().collect(),
        };
        let rules: Arc<[Arc<dyn Rule>]> = self.build(scope, entries.into_iter()).into();

        self.cache.insert(
            scope.to_string(),
            CachedRules {
                scope_list,
                global,
                rules: Arc::clone(&rules),
            },
        );
        rules
    }

    fn build<'a>(
        &mut self,
        scope: &str,
        entries: impl Iterator<Item = &'a RuleEntry>,
    ) -> Vec<Arc<dyn Rule>> {
        let mut rules: Vec<Arc<dyn Rule>> = Vec::new();

        for entry in entries {
            let rule = match entry {
                RuleEntry::Rule(rule) => Arc::clone(rule),
                RuleEntry::Factory(factory) => factory(),
                RuleEntry::Named(name) => match self.load_reference(scope, name) {
                    Ok(rule) => rule,
                    Err(err) => {
                        warn!(scope, rule = %name, error = %err, "skipping rule reference");
                        continue;
                    }
                },
                RuleEntry::Inherit => {
                    debug!(scope, "ignoring inherit marker outside the first position");
                    continue;
                }
            };
            if rules.iter().any(|existing| Arc::ptr_eq(existing, &rule)) {
                continue;
            }
            rules.push(rule);
        }

        // Stable: entries listed first keep precedence among equal priorities
        rules.sort_by_key(|rule| Reverse(rule.priority()));
        rules
    }

    fn load_reference(&mut self, scope: &str, name: &str) -> Result<Arc<dyn Rule>, ResolveError> {
        let key = (scope.to_string(), name.to_string());
        if let Some(rule) = self.references.get(&key) {
            return Ok(Arc::clone(rule));
        }
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| ResolveError::UnknownRule(name.to_string()))?;
        let rule = loader.load(name)?;
        self.references.insert(key, Arc::clone(&rule));
        Ok(rule)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
