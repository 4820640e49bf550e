use std::fmt;

/// Advisory messages produced while auto-filling or bumping a version.
/// None of these stop the operation; warnings point at something the user
/// should fix, notices only describe what happened (or would have).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Versioning is configured but cannot be used
    Problem(String),
    /// Keys in the versioning table that are not understood
    IgnoredFields(Vec<String>),
    /// Declared version does not agree with the one derived from git
    VersionMismatch {
        source: String,
        expected: String,
        current: String,
    },
    /// Bump runs as a dry run
    NotCommitting,
    /// Source line already carries the bumped version
    AlreadyCorrect { source: String },
    /// Source line that would be rewritten if committing
    WouldUpdate { source: String, line: String },
    /// Bump hook exists but is not executable
    HookSkipped { path: String },
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Diagnostic::Problem(_)
                | Diagnostic::IgnoredFields(_)
                | Diagnostic::VersionMismatch { .. }
                | Diagnostic::HookSkipped { .. }
        )
    }

    /// Send this diagnostic through the `log` facade and hand it back.
    pub(crate) fn emit(self) -> Self {
        if self.is_warning() {
            log::warn!("{}", self);
        } else {
            log::info!("{}", self);
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Problem(problem) => f.write_str(problem),
            Diagnostic::IgnoredFields(keys) => {
                write!(f, "Ignored fields for 'versioning': {}", keys.join(", "))
            }
            Diagnostic::VersionMismatch {
                source,
                expected,
                current,
            } => write!(
                f,
                "In {} version should be {}, not {}",
                source, expected, current
            ),
            Diagnostic::NotCommitting => {
                f.write_str("Not committing bump, nothing will be persisted")
            }
            Diagnostic::AlreadyCorrect { source } => {
                write!(f, "{} already has the right version", source)
            }
            Diagnostic::WouldUpdate { source, line } => {
                write!(f, "Would update {} with '{}'", source, line)
            }
            Diagnostic::HookSkipped { path } => {
                write!(f, "Bump hook {} is not executable, skipping it", path)
            }
        }
    }
}
