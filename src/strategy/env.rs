//! `{prefix$NAME:default}` placeholders resolved from environment variables.

use std::fmt;

/// Which environment variable names a lookup matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvPattern {
    /// `NAME`
    Exact(String),
    /// `*SUFFIX`
    EndsWith(String),
    /// `PREFIX*`
    StartsWith(String),
    /// `*PART*`
    Contains(String),
}

impl EnvPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern.starts_with('*') && pattern.ends_with('*') {
            let inner = pattern.get(1..pattern.len().saturating_sub(1)).unwrap_or("");
            EnvPattern::Contains(inner.to_string())
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            EnvPattern::EndsWith(suffix.to_string())
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            EnvPattern::StartsWith(prefix.to_string())
        } else {
            EnvPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            EnvPattern::Exact(exact) => name == exact,
            EnvPattern::EndsWith(suffix) => name.ends_with(suffix.as_str()),
            EnvPattern::StartsWith(prefix) => name.starts_with(prefix.as_str()),
            EnvPattern::Contains(part) => name.contains(part.as_str()),
        }
    }
}

impl fmt::Display for EnvPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvPattern::Exact(name) => f.write_str(name),
            EnvPattern::EndsWith(suffix) => write!(f, "*{}", suffix),
            EnvPattern::StartsWith(prefix) => write!(f, "{}*", prefix),
            EnvPattern::Contains(part) => write!(f, "*{}*", part),
        }
    }
}

/// Placeholder text before the `$`, the variable pattern after it,
/// and the fallback given after `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLookup {
    pub prefix: String,
    pub pattern: EnvPattern,
    pub alternative: Option<String>,
}

impl EnvLookup {
    /// Split `text` on its first `$`; `None` if there is no `$`.
    pub fn parse(text: &str, alternative: Option<String>) -> Option<Self> {
        let (prefix, pattern) = text.split_once('$')?;
        Some(EnvLookup {
            prefix: prefix.to_string(),
            pattern: EnvPattern::parse(pattern),
            alternative,
        })
    }

    /// Resolve against the current process environment
    pub fn resolve(&self) -> Option<String> {
        self.resolve_from(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Resolve against an explicit set of variables.
    ///
    /// The smallest matching name wins. With no match the alternative is used;
    /// with no alternative either, a lookup carrying a prefix renders empty and
    /// a bare lookup renders nothing at all.
    pub fn resolve_from<I>(&self, vars: I) -> Option<String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let value = vars
            .into_iter()
            .filter(|(name, _)| self.pattern.matches(name))
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, value)| value)
            .or_else(|| self.alternative.clone());

        match value {
            Some(value) => Some(format!("{}{}", self.prefix, value)),
            None if !self.prefix.is_empty() => Some(String::new()),
            None => None,
        }
    }
}

impl fmt::Display for EnvLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", self.prefix, self.pattern)
    }
}
