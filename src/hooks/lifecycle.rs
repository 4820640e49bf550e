use std::collections::HashMap;

use crate::domain::VersionBump;

/// Context information passed to the bump hook
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Version the project was bumped to
    pub version: String,
    /// Component that was bumped
    pub component: VersionBump,
    /// Branch the bump ran on
    pub branch: String,
    /// Whether the bump was only simulated
    pub dryrun: bool,
}

impl HookContext {
    /// Convert context to environment variables for the hook script
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("BUMP_VERSION".to_string(), self.version.clone());
        env.insert("BUMP_COMPONENT".to_string(), self.component.to_string());
        env.insert("BUMP_BRANCH".to_string(), self.branch.clone());
        env.insert(
            "BUMP_DRYRUN".to_string(),
            if self.dryrun { "1" } else { "0" }.to_string(),
        );

        env
    }
}
