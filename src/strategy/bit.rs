use std::fmt;

use crate::domain::{RepositoryVersion, VersionField};
use crate::strategy::env::EnvLookup;

/// How a bit produces its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitKind {
    Constant,
    Attribute(VersionField),
    Env(EnvLookup),
    /// Unknown placeholder, see [`VersionBit::problem`]
    Invalid,
}

/// One renderable unit of a format template: literal text, a
/// `{field}` placeholder, or a `{prefix$VAR:default}` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBit {
    text: String,
    alternative: Option<String>,
    kind: BitKind,
    problem: Option<String>,
}

impl VersionBit {
    pub fn constant(text: impl Into<String>) -> Self {
        VersionBit {
            text: text.into(),
            alternative: None,
            kind: BitKind::Constant,
            problem: None,
        }
    }

    /// Placeholder from the inside of a `{...}` pair
    pub fn placeholder(text: impl Into<String>, alternative: Option<String>) -> Self {
        let text = text.into();
        let mut problem = None;
        let kind = if let Some(lookup) = EnvLookup::parse(&text, alternative.clone()) {
            BitKind::Env(lookup)
        } else if let Some(field) = VersionField::from_name(&text) {
            BitKind::Attribute(field)
        } else {
            problem = Some(format!("invalid versioning part '{}'", text));
            BitKind::Invalid
        };
        VersionBit {
            text,
            alternative,
            kind,
            problem,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &BitKind {
        &self.kind
    }

    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    /// Field referenced by this bit, if it is a plain placeholder
    pub fn field(&self) -> Option<VersionField> {
        match self.kind {
            BitKind::Attribute(field) => Some(field),
            _ => None,
        }
    }

    /// Text for `version`; `None` means the bit contributes nothing.
    pub fn rendered(&self, version: &RepositoryVersion) -> Option<String> {
        match &self.kind {
            BitKind::Constant => Some(self.text.clone()),
            BitKind::Attribute(field) => version.field(*field),
            BitKind::Env(lookup) => lookup.resolve(),
            BitKind::Invalid => Some("invalid".to_string()),
        }
    }
}

impl fmt::Display for VersionBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BitKind::Constant => write!(f, "'{}'", self.text)?,
            _ => match &self.alternative {
                Some(alternative) => write!(f, "{{{}:{}}}", self.text, alternative)?,
                None => write!(f, "{{{}}}", self.text)?,
            },
        }
        if let Some(problem) = &self.problem {
            write!(f, " [{}]", problem)?;
        }
        Ok(())
    }
}
