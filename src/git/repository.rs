use std::path::{Path, PathBuf};

use git2::{
    Cred, CredentialType, DescribeFormatOptions, DescribeOptions, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, StatusOptions,
};

use crate::domain::RepositoryVersion;
use crate::error::{Result, VersioningError};
use crate::git::{Scm, STAGE_ALL};

/// Remote that tags and release commits are pushed to
pub const DEFAULT_REMOTE: &str = "origin";

/// Wrapper around git2::Repository implementing [Scm]
pub struct Git2Scm {
    repo: Git2Repo,
    remote: String,
}

impl Git2Scm {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Scm {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Scm {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Push to `remote` instead of `origin`
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Working directory of the repository
    pub fn root(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.status() != git2::Status::CURRENT))
    }

    /// Version of a repository that has no version tag yet: 0.0.0 with
    /// every commit counted as a change.
    fn untagged_version(&self) -> Result<RepositoryVersion> {
        let head = self.repo.head()?.peel_to_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head.id())?;
        let distance = revwalk.count() as u64;

        let short = head.as_object().short_id()?;
        let commitid = short.as_str().map(|sha| format!("g{}", sha));

        Ok(RepositoryVersion::new(
            "0.0.0",
            distance,
            commitid,
            self.is_dirty()?,
        ))
    }

    fn push(&self, refspecs: &[String]) -> Result<()> {
        let mut remote = match self.repo.find_remote(&self.remote) {
            Ok(remote) => remote,
            Err(_) => {
                log::info!("No remote named '{}', not pushing", self.remote);
                return Ok(());
            }
        };

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(CredentialType::SSH_KEY) {
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = Path::new(&home).join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
            Cred::default()
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Push failed for {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();
        remote.push(&refspec_strs, Some(&mut push_options))?;
        Ok(())
    }
}

impl Scm for Git2Scm {
    fn get_version(&self) -> Result<RepositoryVersion> {
        let mut options = DescribeOptions::new();
        options.describe_tags().pattern("*.*");

        let describe = match self.repo.describe(&options) {
            Ok(describe) => describe,
            Err(e) => {
                log::debug!("git describe found no version tag: {}", e);
                return self.untagged_version();
            }
        };

        let mut format = DescribeFormatOptions::new();
        format.always_use_long_format(true).dirty_suffix("-dirty");
        let text = describe.format(Some(&format))?;

        RepositoryVersion::from_describe(&text).ok_or_else(|| {
            VersioningError::Git(git2::Error::from_str(&format!(
                "cannot parse git describe output '{}'",
                text
            )))
        })
    }

    fn get_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn apply_tag(&self, commit: bool, version: &str) -> Result<()> {
        let tag = format!("v{}", version);
        let message = format!("Version {}", version);

        if !commit {
            log::info!("Would run: git tag -a {} -m \"{}\"", tag, message);
            log::info!("Would run: git push {} {}", self.remote, tag);
            return Ok(());
        }

        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        self.repo
            .tag(&tag, head.as_object(), &signature, &message, false)?;
        log::info!("Created tag {}", tag);

        self.push(&[format!("refs/tags/{}", tag)])
    }

    fn commit_files(&self, commit: bool, paths: &[String], version: &str) -> Result<()> {
        let message = format!("Version {}", version);

        if !commit {
            log::info!("Would run: git add {}", paths.join(" "));
            log::info!("Would run: git commit -m \"{}\"", message);
            log::info!("Would run: git push {}", self.remote);
            return Ok(());
        }

        let mut index = self.repo.index()?;
        if paths.iter().any(|p| p == STAGE_ALL) {
            index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
            index.update_all(["*"].iter(), None)?;
        } else {
            for path in paths {
                index.add_path(Path::new(path))?;
            }
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &[&parent],
        )?;
        log::info!("Committed {}", message);

        let branch = self.get_branch()?;
        self.push(&[format!("refs/heads/{}", branch)])
    }
}
