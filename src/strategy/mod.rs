//! Versioning strategy: parsing of format templates, rendering of a
//! repository version into a version string, and bump computation.
//!
//! A strategy is declared either as a table (`main`, `extra`, `separator`,
//! `branches`), as one of the tokens `tag`/`changes`, or as a compact string:
//!
//! ```text
//! tag(master,release):{major}.{minor}.{patch}+{commitid}
//! ```
//!
//! The `main` template is always rendered. The `extra` template is appended,
//! after the separator, only when the working tree is dirty, unless it is
//! prefixed with `!` in which case it is always appended.

pub mod bit;
pub mod env;

pub use bit::{BitKind, VersionBit};
pub use env::{EnvLookup, EnvPattern};

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::config::{BranchList, VersioningSpec};
use crate::domain::{RepositoryVersion, VersionBump};
use crate::error::{Result, VersioningError};

pub const DEFAULT_SEPARATOR: &str = "+";
pub const DEFAULT_MAIN: &str = "{major}.{minor}.{patch}{post}";
pub const CHANGES_MAIN: &str = "{major}.{minor}.{changes}";
pub const DEFAULT_EXTRA: &str = "{commitid}";
pub const DEFAULT_BRANCHES: &str = "master";

const RE_VERSIONING: &str = r"^(tag(\([\w\s,\-]+\))?:)?(.*?)([ +@#%^;/,]!?(.*))?$";

/// Caller-supplied renderer used in place of a parsed template
pub type CustomRenderer = Arc<dyn Fn(&RepositoryVersion) -> Option<String> + Send + Sync>;

/// A format as declared, before parsing
#[derive(Clone)]
pub enum FormatSpec {
    Template(String),
    Custom(CustomRenderer),
}

impl From<&str> for FormatSpec {
    fn from(text: &str) -> Self {
        FormatSpec::Template(text.to_string())
    }
}

impl From<String> for FormatSpec {
    fn from(text: String) -> Self {
        FormatSpec::Template(text)
    }
}

/// A parsed format
#[derive(Clone)]
pub enum Format {
    /// Template text as declared (including any leading `!`) and its bits
    Bits { text: String, bits: Vec<VersionBit> },
    Custom(CustomRenderer),
}

impl Format {
    pub fn parse(spec: FormatSpec) -> Self {
        match spec {
            FormatSpec::Custom(renderer) => Format::Custom(renderer),
            FormatSpec::Template(text) => {
                let bits = parse_bits(&text);
                Format::Bits { text, bits }
            }
        }
    }

    pub fn bits(&self) -> Option<&[VersionBit]> {
        match self {
            Format::Bits { bits, .. } => Some(bits),
            Format::Custom(_) => None,
        }
    }

    fn is_declared(&self) -> bool {
        match self {
            Format::Bits { text, .. } => !text.is_empty(),
            Format::Custom(_) => true,
        }
    }

    fn forced(&self) -> bool {
        match self {
            Format::Bits { text, .. } => text.starts_with('!'),
            Format::Custom(_) => true,
        }
    }

    fn rendered(&self, version: &RepositoryVersion) -> Vec<String> {
        match self {
            Format::Bits { bits, .. } => bits.iter().filter_map(|b| b.rendered(version)).collect(),
            Format::Custom(renderer) => renderer(version)
                .filter(|value| !value.is_empty())
                .into_iter()
                .collect(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Bits { text, .. } => f.write_str(text),
            Format::Custom(_) => f.write_str("<custom>"),
        }
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Bits { text, bits } => f
                .debug_struct("Bits")
                .field("text", text)
                .field("bits", bits)
                .finish(),
            Format::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Split a template into bits.
///
/// A leading `!` is dropped. Text outside braces becomes constants, each
/// `{name}` or `{name:alternative}` a placeholder. A `{` without a closing
/// `}` ends the template; whatever follows it is ignored.
pub fn parse_bits(template: &str) -> Vec<VersionBit> {
    let mut rest = template.strip_prefix('!').unwrap_or(template);
    let mut bits = Vec::new();
    while !rest.is_empty() {
        let Some((before, after)) = rest.split_once('{') else {
            bits.push(VersionBit::constant(rest));
            break;
        };
        if !before.is_empty() {
            bits.push(VersionBit::constant(before));
        }
        let Some((part, remainder)) = after.split_once('}') else {
            break;
        };
        let bit = match part.split_once(':') {
            Some((name, alternative)) => {
                VersionBit::placeholder(name, Some(alternative.to_string()))
            }
            None => VersionBit::placeholder(part, None),
        };
        bits.push(bit);
        rest = remainder;
    }
    bits
}

/// Normalize `"(a, b)"` or `"a,b"` into branch names
pub fn parse_branches(text: &str) -> Vec<String> {
    text.trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// How to turn a repository version into a version string
#[derive(Debug, Clone)]
pub struct Strategy {
    main: Format,
    extra: Format,
    separator: String,
    branches: Vec<String>,
    ignored_fields: Vec<String>,
    problem: Option<String>,
}

impl Strategy {
    /// Build a strategy; an empty separator or branch list falls back to the default.
    pub fn new(
        main: impl Into<FormatSpec>,
        extra: impl Into<FormatSpec>,
        separator: &str,
        branches: Vec<String>,
    ) -> Self {
        let main = Format::parse(main.into());
        let extra = Format::parse(extra.into());
        let separator = if separator.is_empty() {
            DEFAULT_SEPARATOR.to_string()
        } else {
            separator.to_string()
        };
        let branches = if branches.is_empty() {
            parse_branches(DEFAULT_BRANCHES)
        } else {
            branches
        };

        let problem = match main.bits() {
            Some([]) => Some("No versioning format specified".to_string()),
            _ => {
                let problems: Vec<&str> = main
                    .bits()
                    .into_iter()
                    .chain(extra.bits())
                    .flatten()
                    .filter_map(VersionBit::problem)
                    .collect();
                if problems.is_empty() {
                    None
                } else {
                    Some(problems.join("\n"))
                }
            }
        };

        Strategy {
            main,
            extra,
            separator,
            branches,
            ignored_fields: Vec::new(),
            problem,
        }
    }

    /// Build from a declared versioning specification; `None` when versioning is off.
    pub fn from_meta(given: &VersioningSpec) -> Option<Self> {
        if !given.is_truthy() {
            return None;
        }

        let mut main = DEFAULT_MAIN.to_string();
        let mut extra = DEFAULT_EXTRA.to_string();
        let mut separator = DEFAULT_SEPARATOR.to_string();
        let mut branches = DEFAULT_BRANCHES.to_string();
        let mut ignored_fields = Vec::new();

        match given {
            VersioningSpec::Enabled(_) => {}
            VersioningSpec::Table(table) => {
                if let Some(value) = &table.main {
                    main = value.clone();
                }
                if let Some(value) = &table.extra {
                    extra = value.clone();
                }
                if let Some(value) = &table.separator {
                    separator = value.clone();
                }
                match &table.branches {
                    Some(BranchList::List(list)) => branches = list.join(","),
                    Some(BranchList::Text(text)) => branches = text.clone(),
                    None => {}
                }
                ignored_fields = table.other.keys().cloned().collect();
            }
            VersioningSpec::Compact(text) if text == "changes" => main = CHANGES_MAIN.to_string(),
            VersioningSpec::Compact(text) if text == "tag" => {}
            VersioningSpec::Compact(text) => {
                let captures = Regex::new(RE_VERSIONING)
                    .ok()
                    .and_then(|re| re.captures(text));
                main = String::new();
                extra = String::new();
                if let Some(captures) = captures {
                    if let Some(declared) = captures.get(2) {
                        branches = declared.as_str().to_string();
                    }
                    main = captures
                        .get(3)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default();
                    if let Some(tail) = captures.get(4).map(|m| m.as_str()) {
                        let mut chars = tail.chars();
                        if let Some(sep) = chars.next() {
                            separator = sep.to_string();
                            extra = chars.as_str().to_string();
                        }
                    }
                }
            }
        }

        let mut strategy = Strategy::new(main, extra, &separator, parse_branches(&branches));
        strategy.ignored_fields = ignored_fields;
        Some(strategy)
    }

    /// Textual form `tag(b1,b2):main<sep>extra`
    pub fn formatted(branches: &[String], main: &str, separator: &str, extra: &str) -> String {
        let mut result = main.to_string();
        if !result.is_empty() || !extra.is_empty() {
            result.push_str(separator);
        }
        result.push_str(extra);
        if branches.is_empty() {
            result
        } else {
            format!("tag({}):{}", branches.join(","), result)
        }
    }

    pub fn main(&self) -> &Format {
        &self.main
    }

    pub fn extra(&self) -> &Format {
        &self.extra
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    /// Keys of a versioning table that were not understood
    pub fn ignored_fields(&self) -> &[String] {
        &self.ignored_fields
    }

    /// Whether the extra part belongs in the rendering of `version`
    pub fn needs_extra(&self, version: &RepositoryVersion) -> bool {
        if !self.extra.is_declared() {
            return false;
        }
        self.extra.forced() || version.dirty
    }

    pub fn rendered(&self, version: &RepositoryVersion, extra: bool) -> String {
        let mut result = self.main.rendered(version);
        if extra && self.needs_extra(version) {
            let rendered_extra = self.extra.rendered(version);
            if !rendered_extra.is_empty() {
                if self.separator != " " {
                    result.push(self.separator.clone());
                }
                result.extend(rendered_extra);
            }
        }
        result.concat()
    }

    /// Next version with `what` bumped, rendered without the extra part.
    pub fn bumped(&self, what: VersionBump, current: &RepositoryVersion) -> Result<String> {
        let Some(bits) = self.main.bits() else {
            return Err(VersioningError::CustomMainFormat(self.main.to_string()));
        };

        let in_scope = bits
            .iter()
            .filter_map(|bit| bit.field().and_then(|f| f.bump()))
            .any(|component| component == what);
        if !in_scope {
            return Err(VersioningError::OutOfScope {
                component: what.to_string(),
                format: self.main.to_string(),
            });
        }

        let next = what.apply(&current.bump_triplet())?;
        let next_version = RepositoryVersion::from_triplet(next.major, next.minor, next.patch);
        Ok(self.rendered(&next_version, false))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Strategy::formatted(
            &self.branches,
            &self.main.to_string(),
            &self.separator,
            &self.extra.to_string(),
        );
        f.write_str(&text)
    }
}
