//! Package metadata as seen by versioning: the versioning declaration
//! and the definitions (with their provenance) of fields such as `version`.

use std::collections::BTreeMap;

use crate::config::{ProjectConfig, VersioningSpec};

/// Build system whose declared version is left untouched by auto-fill
pub const ALTERNATE_BUILD_SOURCE: &str = "pygradle";

/// One place a value was declared or filled in from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionEntry {
    /// `path:line` for values read from a file, otherwise a provenance tag
    pub source: String,
    pub value: String,
}

impl DefinitionEntry {
    pub fn new(source: impl Into<String>, value: impl Into<String>) -> Self {
        DefinitionEntry {
            source: source.into(),
            value: value.into(),
        }
    }

    /// `(path, line)` when the source points at a line of a file
    pub fn file_pointer(&self) -> Option<(&str, usize)> {
        let (path, line) = self.source.rsplit_once(':')?;
        let line = line.trim().parse::<usize>().ok()?;
        if path.is_empty() || line == 0 {
            return None;
        }
        Some((path, line))
    }
}

/// A metadata field and everywhere it was defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub key: String,
    pub value: String,
    /// Provenance of the current value
    pub source: String,
    pub sources: Vec<DefinitionEntry>,
}

impl Definition {
    /// Value of the first declaration
    pub fn declared_value(&self) -> Option<&str> {
        self.sources.first().map(|e| e.value.as_str())
    }
}

/// What versioning needs from the surrounding metadata model
pub trait ProjectMeta {
    /// Declared versioning specification
    fn versioning(&self) -> Option<&VersioningSpec>;

    fn definition(&self, key: &str) -> Option<&Definition>;

    /// Record `value` for `key`. An existing definition is only replaced
    /// when `override_existing` is set.
    fn auto_fill(&mut self, key: &str, value: &str, source: &str, override_existing: bool);
}

/// In-memory metadata
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    versioning: Option<VersioningSpec>,
    definitions: BTreeMap<String, Definition>,
}

impl Metadata {
    pub fn new(versioning: Option<VersioningSpec>) -> Self {
        Metadata {
            versioning,
            definitions: BTreeMap::new(),
        }
    }

    /// Seed from a project configuration. Each declared source gets the
    /// declared value; a value without sources is attributed to the config.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut meta = Metadata::new(config.versioning.clone());
        if let Some(version) = &config.version {
            let value = version.value.clone().unwrap_or_default();
            for source in &version.sources {
                meta.declare("version", source, &value);
            }
            if version.sources.is_empty() && !value.is_empty() {
                meta.declare("version", crate::config::CONFIG_FILE, &value);
            }
        }
        meta
    }

    /// Add a declaration of `key` found at `source`
    pub fn declare(&mut self, key: &str, source: &str, value: &str) {
        let entry = DefinitionEntry::new(source, value);
        match self.definitions.get_mut(key) {
            Some(definition) => definition.sources.push(entry),
            None => {
                self.definitions.insert(
                    key.to_string(),
                    Definition {
                        key: key.to_string(),
                        value: value.to_string(),
                        source: source.to_string(),
                        sources: vec![entry],
                    },
                );
            }
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.definitions.get(key).map(|d| d.value.as_str())
    }
}

impl ProjectMeta for Metadata {
    fn versioning(&self) -> Option<&VersioningSpec> {
        self.versioning.as_ref()
    }

    fn definition(&self, key: &str) -> Option<&Definition> {
        self.definitions.get(key)
    }

    fn auto_fill(&mut self, key: &str, value: &str, source: &str, override_existing: bool) {
        match self.definitions.get_mut(key) {
            Some(_) if !override_existing => {
                log::trace!("not auto-filling '{}', already defined", key);
            }
            Some(definition) => {
                definition.value = value.to_string();
                definition.source = source.to_string();
                definition.sources.push(DefinitionEntry::new(source, value));
            }
            None => {
                self.definitions.insert(
                    key.to_string(),
                    Definition {
                        key: key.to_string(),
                        value: value.to_string(),
                        source: source.to_string(),
                        sources: vec![DefinitionEntry::new(source, value)],
                    },
                );
            }
        }
    }
}
