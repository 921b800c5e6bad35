//! Configuration file support for nudge
//!
//! Loads `.nudge.toml` from the current directory or its parents, falling
//! back to `<config dir>/nudge/config.toml`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use nudge_rules::Preset;

pub const CONFIG_FILE: &str = ".nudge.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    /// Per file extension rule lists
    pub scope: BTreeMap<String, ScopeConfig>,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Preset to use (default, minimal, all)
    pub preset: Option<String>,
    /// If set, only these rules are global (overrides preset)
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled/preset)
    pub disabled: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Rule names for this scope; a leading "inherit" keeps the global rules
    pub rules: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.nudge.toml` searching from the current directory
    /// upward, then the user config directory
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        if let Some(found) = Self::load_from(std::env::current_dir()?)? {
            return Ok(Some(found));
        }
        match dirs::config_dir().map(|dir| dir.join("nudge").join("config.toml")) {
            Some(path) if path.exists() => Ok(Some((Self::load_path(&path)?, path))),
            _ => Ok(None),
        }
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Global rule names in order: `enabled` if set, else the preset, minus
    /// `disabled`. Names the registry does not know are dropped with a warning.
    pub fn global_rules(&self, known: &[&str]) -> Result<Vec<String>> {
        let mut rules: Vec<String> = match &self.rules.enabled {
            Some(enabled) => enabled.clone(),
            None => {
                let name = self.rules.preset.as_deref().unwrap_or("default");
                let Some(preset) = Preset::from_str(name) else {
                    bail!(
                        "Unknown preset '{}'. Valid options: default, minimal, all",
                        name
                    );
                };
                preset.rules().iter().map(|s| s.to_string()).collect()
            }
        };

        rules.retain(|rule| !self.rules.disabled.contains(rule));
        rules.retain(|rule| {
            let ok = known.contains(&rule.as_str());
            if !ok {
                warn!(rule = %rule, "unknown rule in config, ignoring");
            }
            ok
        });
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    const KNOWN: &[&str] = &["integer", "hex", "date.iso", "semver", "bool", "case"];

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rules]
enabled = ["integer", "hex", "case"]
disabled = ["case"]

[scope.md]
rules = ["inherit", "markdown_header"]

[output]
format = "json"
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(
            config.rules.enabled,
            Some(vec!["integer".to_string(), "hex".to_string(), "case".to_string()])
        );
        assert_eq!(config.rules.disabled, vec!["case".to_string()]);
        assert_eq!(
            config.scope["md"].rules,
            vec!["inherit".to_string(), "markdown_header".to_string()]
        );
        assert_eq!(config.output.format, Some("json".to_string()));
    }

    #[test]
    fn test_load_from_parent_directory() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\npreset = \"minimal\"\n");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.rules.preset.as_deref(), Some("minimal"));
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert!(config.rules.enabled.is_none());
        assert!(config.rules.disabled.is_empty());
        assert!(config.scope.is_empty());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules]\nenabled = 3\n");
        assert!(Config::load_from(temp.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_global_rules_from_preset() {
        let config = Config {
            rules: RulesConfig {
                preset: Some("minimal".to_string()),
                enabled: None,
                disabled: vec!["hex".to_string()],
            },
            ..Default::default()
        };
        assert_eq!(
            config.global_rules(KNOWN).unwrap(),
            vec!["integer".to_string(), "date.iso".to_string()]
        );
    }

    #[test]
    fn test_global_rules_enabled_overrides_preset() {
        let config = Config {
            rules: RulesConfig {
                preset: Some("all".to_string()),
                enabled: Some(vec!["semver".to_string(), "nope".to_string()]),
                disabled: vec![],
            },
            ..Default::default()
        };
        assert_eq!(config.global_rules(KNOWN).unwrap(), vec!["semver".to_string()]);
    }

    #[test]
    fn test_unknown_preset() {
        let config = Config {
            rules: RulesConfig {
                preset: Some("psr12".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.global_rules(KNOWN).is_err());
    }
}
