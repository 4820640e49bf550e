use thiserror::Error;

/// Unified error type for versioning operations
#[derive(Error, Debug)]
pub enum VersioningError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Disabled(String),

    #[error("Can't bump branch '{branch}', need one of {allowed:?}")]
    BranchNotAllowed { branch: String, allowed: Vec<String> },

    #[error("You have pending git changes, can't bump")]
    PendingChanges,

    #[error("Main format is not a template: {0}")]
    CustomMainFormat(String),

    #[error("Can't bump '{component}', it's out of scope of main format '{format}'")]
    OutOfScope { component: String, format: String },

    #[error("Can't bump '{component}' of {version}, it would overflow")]
    VersionOverflow { component: String, version: String },

    #[error("Invalid bump component '{0}', expected one of major, minor, patch")]
    InvalidComponent(String),

    #[error("Hook failed: {0}")]
    Hook(String),

    #[error("Version source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, VersioningError>;

impl VersioningError {
    /// Create a hook error with context
    pub fn hook(msg: impl Into<String>) -> Self {
        VersioningError::Hook(msg.into())
    }

    /// Create a version source error with context
    pub fn source_file(msg: impl Into<String>) -> Self {
        VersioningError::Source(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VersioningError::Config(msg.into())
    }
}

impl From<toml::de::Error> for VersioningError {
    fn from(err: toml::de::Error) -> Self {
        VersioningError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VersioningError::config("bad table");
        assert_eq!(err.to_string(), "Configuration error: bad table");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VersioningError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_disabled_is_bare_problem() {
        let err = VersioningError::Disabled("project not under a supported SCM".to_string());
        assert_eq!(err.to_string(), "project not under a supported SCM");
    }

    #[test]
    fn test_branch_not_allowed_lists_branches() {
        let err = VersioningError::BranchNotAllowed {
            branch: "feature".to_string(),
            allowed: vec!["master".to_string(), "release".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Can't bump branch 'feature', need one of [\"master\", \"release\"]"
        );
    }

    #[test]
    fn test_out_of_scope_message() {
        let err = VersioningError::OutOfScope {
            component: "patch".to_string(),
            format: "{major}.{minor}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'patch'"));
        assert!(msg.contains("out of scope"));
        assert!(msg.contains("{major}.{minor}"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (VersioningError::config("x"), "Configuration error"),
            (VersioningError::hook("x"), "Hook failed"),
            (VersioningError::source_file("x"), "Version source error"),
            (VersioningError::PendingChanges, "You have pending git changes"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let err: VersioningError = toml::from_str::<toml::Value>("= nope")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
