//! Rule presets
//!
//! Maps preset names to the registry names they enable.

/// Available presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Default,
    Minimal,
    All,
}

impl Preset {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim_start_matches('@') {
            "default" => Some(Preset::Default),
            "minimal" | "min" => Some(Preset::Minimal),
            "all" => Some(Preset::All),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Minimal => "minimal",
            Preset::All => "all",
        }
    }

    pub fn rules(self) -> &'static [&'static str] {
        match self {
            Preset::Default => DEFAULT_RULES,
            Preset::Minimal => MINIMAL_RULES,
            Preset::All => ALL_RULES,
        }
    }
}

/// Get the list of rules for a preset; empty for an unknown name
pub fn get_preset_rules(preset_name: &str) -> &'static [&'static str] {
    Preset::from_str(preset_name).map_or(&[], Preset::rules)
}

/// Numbers, dates, versions, colors and booleans
pub const DEFAULT_RULES: &[&str] = &[
    // Numbers
    "integer",
    "hex",
    "octal",
    "binary",
    "decimal",

    // Dates and times
    "date.ymd",
    "date.iso",
    "time.hms",
    "time.hm",

    // Everything else
    "semver",
    "color",
    "bool",
];

pub const MINIMAL_RULES: &[&str] = &["integer", "hex", "date.iso"];

/// Every built-in rule
pub const ALL_RULES: &[&str] = &[
    "integer",
    "natural",
    "hex",
    "octal",
    "binary",
    "decimal",
    "date.ymd",
    "date.iso",
    "date.md",
    "date.dmy",
    "time.hms",
    "time.hm",
    "datetime.iso",
    "semver",
    "color",
    "bracket",
    "case",
    "bool",
    "onoff",
    "yesno",
    "logical",
    "alpha",
    "Alpha",
    "weekday",
    "month",
    "markdown_header",
];
