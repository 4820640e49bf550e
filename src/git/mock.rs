use std::cell::RefCell;

use crate::domain::RepositoryVersion;
use crate::error::Result;
use crate::git::Scm;

/// Tag request seen by [MockScm]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCall {
    pub commit: bool,
    pub version: String,
}

/// Commit request seen by [MockScm]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCall {
    pub commit: bool,
    pub paths: Vec<String>,
    pub version: String,
}

/// Mock source control for testing without actual git operations
pub struct MockScm {
    version: RepositoryVersion,
    branch: String,
    tags: RefCell<Vec<TagCall>>,
    commits: RefCell<Vec<CommitCall>>,
}

impl MockScm {
    /// Create a mock on `branch` reporting `version`
    pub fn new(version: RepositoryVersion, branch: impl Into<String>) -> Self {
        MockScm {
            version,
            branch: branch.into(),
            tags: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
        }
    }

    pub fn tags(&self) -> Vec<TagCall> {
        self.tags.borrow().clone()
    }

    pub fn commits(&self) -> Vec<CommitCall> {
        self.commits.borrow().clone()
    }
}

impl Scm for MockScm {
    fn get_version(&self) -> Result<RepositoryVersion> {
        Ok(self.version.clone())
    }

    fn get_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn apply_tag(&self, commit: bool, version: &str) -> Result<()> {
        self.tags.borrow_mut().push(TagCall {
            commit,
            version: version.to_string(),
        });
        Ok(())
    }

    fn commit_files(&self, commit: bool, paths: &[String], version: &str) -> Result<()> {
        self.commits.borrow_mut().push(CommitCall {
            commit,
            paths: paths.to_vec(),
            version: version.to_string(),
        });
        Ok(())
    }
}
