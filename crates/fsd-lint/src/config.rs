use crate::error::PolicyError;
use crate::registry::{fsd_preset, LayerDecl, Policy};
use crate::rules::{RuleKind, RuleSet};
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "fsd-lint.toml";

/// Written by `fsd-lint init`.
pub const DEFAULT_CONFIG: &str = r#"[analyzer]
source_dir = "src"
exclude = ["**/node_modules/**", "**/.next/**", "**/dist/**", "**/build/**"]
# 0 = one worker per available CPU
jobs = 1

# Layers in ascending rank: a layer may import only from itself and those above it here.
[[layers]]
name = "shared"
public_entry_roots = ["@shared", "@shared/server", "@/shared"]

[[layers]]
name = "entities"
sliced = true
public_entry_roots = ["@entities", "@/entities"]

[[layers]]
name = "features"
sliced = true
public_entry_roots = ["@features", "@/features"]

[[layers]]
name = "widgets"
sliced = true
public_entry_roots = ["@widgets", "@/widgets"]

[[layers]]
name = "views"
sliced = true
public_entry_roots = ["@views", "@/views"]

[[layers]]
name = "app"
public_entry_roots = ["@app", "@/app"]

[rules.layer-order]
enabled = true
severity = "error"

[rules.public-api]
enabled = true
severity = "error"
"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Empty means the built-in FSD preset.
    #[serde(default)]
    pub layers: Vec<LayerDecl>,

    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Builds the policy from `[[layers]]`, or the FSD preset when none are given.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the declared layers are inconsistent.
    pub fn policy(&self) -> Result<Policy, PolicyError> {
        if self.layers.is_empty() {
            Policy::new(fsd_preset())
        } else {
            Policy::new(self.layers.clone())
        }
    }

    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    #[must_use]
    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            ordering: self.is_rule_enabled(RuleKind::Ordering.name()),
            encapsulation: self.is_rule_enabled(RuleKind::Encapsulation.name()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Directory whose children are the layer directories.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            exclude: default_exclude(),
            jobs: default_jobs(),
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_exclude() -> Vec<String> {
    ["**/node_modules/**", "**/.next/**", "**/dist/**", "**/build/**"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_jobs() -> usize {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.rules.is_empty());
        assert!(config.layers.is_empty());
        assert!(config.is_rule_enabled("any-rule"));
        assert_eq!(config.analyzer.source_dir, PathBuf::from("src"));
        assert_eq!(config.rule_set(), RuleSet::all());
    }

    #[test]
    fn default_config_uses_preset() {
        let policy = Config::default().policy().expect("preset is valid");
        assert_eq!(policy.ordered_layers().len(), 6);
        assert!(policy.is_sliced("features"));
    }

    #[test]
    fn init_template_parses_to_preset() {
        let config = Config::parse(DEFAULT_CONFIG).expect("template parses");
        let from_template = config.policy().expect("template policy valid");
        let preset = Config::default().policy().expect("preset is valid");
        assert_eq!(from_template.ordered_layers(), preset.ordered_layers());
        assert_eq!(
            from_template.public_roots("shared"),
            preset.public_roots("shared")
        );
        assert_eq!(config.analyzer.exclude, default_exclude());
    }

    #[test]
    fn parse_config() {
        let toml = r#"
[analyzer]
source_dir = "web/src"
jobs = 4

[[layers]]
name = "shared"
public_entry_roots = ["~/shared"]

[[layers]]
name = "modules"
sliced = true
public_entry_roots = ["~/modules"]
slices = ["billing", "auth"]

[rules.public-api]
enabled = true
severity = "warning"
"#;
        let config = Config::parse(toml).expect("parse failed");
        assert_eq!(config.analyzer.source_dir, PathBuf::from("web/src"));
        assert_eq!(config.analyzer.jobs, 4);
        assert_eq!(config.rule_severity("public-api"), Some(Severity::Warning));

        let policy = config.policy().expect("valid policy");
        assert_eq!(policy.rank_of("modules"), Ok(1));
        assert!(policy.declared_slices("modules").is_some());
    }

    #[test]
    fn disabled_rule() {
        let toml = r#"
[rules.layer-order]
enabled = false
"#;
        let config = Config::parse(toml).expect("parse failed");
        assert!(!config.is_rule_enabled("layer-order"));
        assert!(!config.rule_set().ordering);
        assert!(config.rule_set().encapsulation);
    }

    #[test]
    fn duplicate_rank_in_config_is_rejected() {
        let toml = r#"
[[layers]]
name = "shared"
rank = 0
public_entry_roots = ["@shared"]

[[layers]]
name = "entities"
rank = 0
sliced = true
public_entry_roots = ["@entities"]
"#;
        let config = Config::parse(toml).expect("parse failed");
        let err = config.policy().expect_err("duplicate rank");
        assert_eq!(err.code(), "POLICY_DUPLICATE_RANK");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse("[[layers]\nname = ").expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
