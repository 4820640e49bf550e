//! Source control abstraction layer
//!
//! Versioning only needs four things from source control: the current
//! version facts, the current branch, and the ability to tag and commit.
//! The [Scm] trait captures exactly that, so the strategy and bump logic
//! can run against a real repository or a mock.
//!
//! - [repository::Git2Scm]: A real implementation using the `git2` crate
//! - [mock::MockScm]: A recording implementation for testing

pub mod mock;
pub mod repository;

pub use mock::MockScm;
pub use repository::Git2Scm;

use std::path::Path;

use crate::domain::RepositoryVersion;
use crate::error::Result;

/// Path list meaning "stage everything in the working tree"
pub const STAGE_ALL: &str = ".";

/// Source control operations needed by versioning
///
/// With `commit` set to false, [Scm::apply_tag] and [Scm::commit_files]
/// must only report what they would do.
pub trait Scm {
    /// Version facts for the current checkout
    fn get_version(&self) -> Result<RepositoryVersion>;

    /// Name of the checked out branch
    fn get_branch(&self) -> Result<String>;

    /// Tag the current commit as `version` and publish the tag
    fn apply_tag(&self, commit: bool, version: &str) -> Result<()>;

    /// Commit `paths` (relative to the project root) as the release of `version`
    fn commit_files(&self, commit: bool, paths: &[String], version: &str) -> Result<()>;
}

/// Source control backend for the project at `root`, if any
pub fn project_scm(root: &Path) -> Option<Git2Scm> {
    if !root.join(".git").is_dir() {
        log::trace!("could not determine SCM for '{}'", root.display());
        return None;
    }
    match Git2Scm::open(root) {
        Ok(scm) => Some(scm),
        Err(e) => {
            log::debug!("cannot open git repository at '{}': {}", root.display(), e);
            None
        }
    }
}
