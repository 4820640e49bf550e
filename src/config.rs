use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Default project configuration file name
pub const CONFIG_FILE: &str = "versioning.toml";

/// Project configuration.
///
/// ```toml
/// versioning = "tag(master,release):{major}.{minor}.{patch}+{commitid}"
///
/// [version]
/// sources = ["mypkg/__init__.py:3"]
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub versioning: Option<VersioningSpec>,

    #[serde(default)]
    pub version: Option<VersionDeclaration>,
}

/// How versioning was declared: `true`, `"tag"`, `"changes"`, a compact
/// strategy string, or a table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum VersioningSpec {
    Enabled(bool),
    Compact(String),
    Table(StrategyTable),
}

impl VersioningSpec {
    /// Whether this declaration turns versioning on at all
    pub fn is_truthy(&self) -> bool {
        match self {
            VersioningSpec::Enabled(enabled) => *enabled,
            VersioningSpec::Compact(text) => !text.is_empty(),
            VersioningSpec::Table(table) => !table.is_empty(),
        }
    }
}

impl std::fmt::Display for VersioningSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersioningSpec::Enabled(enabled) => write!(f, "{}", enabled),
            VersioningSpec::Compact(text) => f.write_str(text),
            VersioningSpec::Table(table) => write!(f, "{:?}", table),
        }
    }
}

/// Table form of a versioning declaration
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct StrategyTable {
    #[serde(default)]
    pub main: Option<String>,

    #[serde(default)]
    pub extra: Option<String>,

    #[serde(default)]
    pub separator: Option<String>,

    #[serde(default)]
    pub branches: Option<BranchList>,

    /// Keys that are not part of a strategy
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

impl StrategyTable {
    pub fn is_empty(&self) -> bool {
        self.main.is_none()
            && self.extra.is_none()
            && self.separator.is_none()
            && self.branches.is_none()
            && self.other.is_empty()
    }
}

/// Branches allowed to bump, as a list or a comma-separated string
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum BranchList {
    List(Vec<String>),
    Text(String),
}

/// Declared version value and the `path:line` pointers where it lives
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct VersionDeclaration {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub sources: Vec<String>,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versioning.toml` in current directory
/// 3. Default configuration (versioning disabled) if no file found
///
/// # Returns
/// * `Ok(ProjectConfig)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<ProjectConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE).exists() {
        fs::read_to_string(CONFIG_FILE)?
    } else {
        return Ok(ProjectConfig::default());
    };

    let config: ProjectConfig = toml::from_str(&config_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_spec() {
        let config: ProjectConfig = toml::from_str("versioning = true").unwrap();
        assert_eq!(config.versioning, Some(VersioningSpec::Enabled(true)));
        assert!(config.versioning.unwrap().is_truthy());
    }

    #[test]
    fn test_compact_spec() {
        let config: ProjectConfig = toml::from_str(r#"versioning = "changes""#).unwrap();
        assert_eq!(
            config.versioning,
            Some(VersioningSpec::Compact("changes".to_string()))
        );
    }

    #[test]
    fn test_table_spec_with_branch_string() {
        let config: ProjectConfig = toml::from_str(
            r#"
[versioning]
main = "{major}.{minor}"
separator = "-"
branches = "master, release"
"#,
        )
        .unwrap();
        let Some(VersioningSpec::Table(table)) = config.versioning else {
            panic!("expected a table");
        };
        assert_eq!(table.main.as_deref(), Some("{major}.{minor}"));
        assert_eq!(table.separator.as_deref(), Some("-"));
        assert_eq!(
            table.branches,
            Some(BranchList::Text("master, release".to_string()))
        );
        assert!(table.other.is_empty());
    }

    #[test]
    fn test_empty_table_is_falsy() {
        let config: ProjectConfig = toml::from_str("[versioning]").unwrap();
        assert!(!config.versioning.unwrap().is_truthy());
    }

    #[test]
    fn test_version_declaration() {
        let config: ProjectConfig = toml::from_str(
            r#"
versioning = "tag"

[version]
value = "1.2.3"
sources = ["pkg/__init__.py:1", "setup.py:12"]
"#,
        )
        .unwrap();
        let version = config.version.unwrap();
        assert_eq!(version.value.as_deref(), Some("1.2.3"));
        assert_eq!(version.sources.len(), 2);
    }

    #[test]
    fn test_default_has_no_versioning() {
        let config = ProjectConfig::default();
        assert!(config.versioning.is_none());
        assert!(config.version.is_none());
    }
}
