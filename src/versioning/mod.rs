//! Versioning workflow: fill in the package version from git, and bump it.

pub mod sources;

pub use sources::{update_sources, updated_line, SourceUpdate};

use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostic;
use crate::domain::VersionBump;
use crate::error::{Result, VersioningError};
use crate::git::Scm;
use crate::hooks::{is_executable, HookContext, HookExecutor, BUMP_HOOK};
use crate::meta::{Definition, ProjectMeta, ALTERNATE_BUILD_SOURCE};
use crate::strategy::Strategy;

pub const PROBLEM_NOT_ENABLED: &str = "versioning not enabled";
pub const PROBLEM_NO_SCM: &str = "project not under a supported SCM";

/// Parameters of a bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpRequest {
    pub component: VersionBump,
    /// Persist the bump; otherwise everything is a dry run
    pub commit: bool,
    /// Commit the whole working tree, pending changes included
    pub commit_all: bool,
    /// Act as if this branch was checked out
    pub simulate_branch: Option<String>,
}

impl BumpRequest {
    pub fn new(component: VersionBump) -> Self {
        BumpRequest {
            component,
            commit: false,
            commit_all: false,
            simulate_branch: None,
        }
    }

    pub fn commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn commit_all(mut self, commit_all: bool) -> Self {
        self.commit_all = commit_all;
        self
    }

    pub fn simulate_branch(mut self, branch: impl Into<String>) -> Self {
        self.simulate_branch = Some(branch.into());
        self
    }
}

/// Result of a successful bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpReport {
    pub version: String,
    pub branch: String,
    /// Project-relative files that were (or would be) rewritten
    pub modified: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A strategy bound to a project's source control and metadata.
pub struct Versioning<'a> {
    strategy: Option<Strategy>,
    scm: Option<&'a dyn Scm>,
    root: PathBuf,
    enabled: bool,
    problem: Option<String>,
}

impl<'a> Versioning<'a> {
    /// Read the versioning declaration of `meta` for the project at `root`.
    pub fn new(meta: &dyn ProjectMeta, scm: Option<&'a dyn Scm>, root: impl Into<PathBuf>) -> Self {
        let given = meta.versioning();
        let strategy = given.and_then(Strategy::from_meta);
        let enabled = matches!(
            (given, &strategy),
            (Some(spec), Some(s)) if spec.is_truthy() && s.problem().is_none()
        );

        let problem = match (&strategy, scm) {
            (None, _) => Some(PROBLEM_NOT_ENABLED.to_string()),
            (Some(_), None) => Some(PROBLEM_NO_SCM.to_string()),
            (Some(s), Some(_)) => s.problem().map(str::to_string),
        };

        log::trace!(
            "versioning given: '{}', strategy: [{}], problem: [{}]",
            given.map(ToString::to_string).unwrap_or_default(),
            strategy.as_ref().map(ToString::to_string).unwrap_or_default(),
            problem.as_deref().unwrap_or_default(),
        );

        Versioning {
            strategy,
            scm,
            root: root.into(),
            enabled,
            problem,
        }
    }

    /// Textual form of a strategy declaration
    pub fn formatted(main: &str, extra: &str, separator: &str, branches: &[String]) -> String {
        Strategy::formatted(branches, main, separator, extra)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        self.strategy.as_ref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn strategy_warnings(&self) -> Vec<Diagnostic> {
        match &self.strategy {
            Some(strategy) if !strategy.ignored_fields().is_empty() => {
                vec![Diagnostic::IgnoredFields(strategy.ignored_fields().to_vec()).emit()]
            }
            _ => Vec::new(),
        }
    }

    /// Declare the `version` field of `meta` from the current git state.
    ///
    /// When versioning is configured but broken, a missing version is
    /// seeded with `0.0.0` and the problem is reported as a warning.
    pub fn auto_fill_version(&self, meta: &mut dyn ProjectMeta) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = self.strategy_warnings();
        if !self.enabled {
            log::trace!("not auto-filling version, versioning is disabled");
            return Ok(diagnostics);
        }

        let definition = meta.definition("version");
        if definition.is_some_and(|d| {
            d.source == ALTERNATE_BUILD_SOURCE && d.declared_value().is_some_and(|v| !v.is_empty())
        }) {
            log::trace!("not auto-filling version for {}", ALTERNATE_BUILD_SOURCE);
            return Ok(diagnostics);
        }
        let declared = definition.and_then(|d| {
            let value = d.declared_value().filter(|v| !v.is_empty())?;
            let source = d.sources.first()?.source.clone();
            Some((value.to_string(), source))
        });

        let (Some(strategy), Some(scm), None) = (&self.strategy, self.scm, &self.problem) else {
            if declared.is_none() {
                meta.auto_fill("version", "0.0.0", "missing", false);
            }
            if let Some(problem) = &self.problem {
                if self.strategy.is_some() {
                    diagnostics.push(Diagnostic::Problem(problem.clone()).emit());
                }
                log::trace!("not auto-filling version due to problem: [{}]", problem);
            }
            return Ok(diagnostics);
        };

        let current = scm.get_version()?;
        let rendered = strategy.rendered(&current, true);
        if let Some((value, source)) = &declared {
            if !rendered.is_empty() && !rendered.starts_with(value.as_str()) {
                let expected: String = rendered.chars().take(value.chars().count()).collect();
                diagnostics.push(
                    Diagnostic::VersionMismatch {
                        source: source.clone(),
                        expected,
                        current: value.clone(),
                    }
                    .emit(),
                );
            }
        }

        meta.auto_fill("version", &rendered, "git", true);
        Ok(diagnostics)
    }

    /// Bump `request.component`, rewrite the declared version sources, tag
    /// the release and run the project's bump hook.
    ///
    /// Every precondition (versioning usable, allowed branch, clean tree when
    /// committing) is checked before anything is modified.
    pub fn bump(&self, meta: &dyn ProjectMeta, request: &BumpRequest) -> Result<BumpReport> {
        let mut diagnostics = self.strategy_warnings();
        if let Some(problem) = &self.problem {
            return Err(VersioningError::Disabled(problem.clone()));
        }
        let (Some(strategy), Some(scm)) = (&self.strategy, self.scm) else {
            return Err(VersioningError::Disabled(PROBLEM_NOT_ENABLED.to_string()));
        };

        let branch = match &request.simulate_branch {
            Some(branch) => branch.clone(),
            None => scm.get_branch()?,
        };
        if !strategy.branches().contains(&branch) {
            return Err(VersioningError::BranchNotAllowed {
                branch,
                allowed: strategy.branches().to_vec(),
            });
        }

        let current = scm.get_version()?;
        if request.commit && current.dirty && !request.commit_all {
            return Err(VersioningError::PendingChanges);
        }

        let next_version = strategy.bumped(request.component, &current)?;

        if !request.commit {
            diagnostics.push(Diagnostic::NotCommitting.emit());
        }

        let mut modified = Vec::new();
        if let Some(definition) = meta.definition("version") {
            let update = self.update_sources(
                &next_version,
                request.commit,
                request.commit_all,
                definition,
            )?;
            modified = update.modified;
            diagnostics.extend(update.diagnostics);
        }

        scm.apply_tag(request.commit, &next_version)?;

        let hook = self.root.join(BUMP_HOOK);
        if is_executable(&hook) {
            let context = HookContext {
                version: next_version.clone(),
                component: request.component,
                branch: branch.clone(),
                dryrun: !request.commit,
            };
            HookExecutor::execute(&hook, &self.root, &context)?;
        } else if hook.exists() {
            diagnostics.push(
                Diagnostic::HookSkipped {
                    path: hook.display().to_string(),
                }
                .emit(),
            );
        }

        Ok(BumpReport {
            version: next_version,
            branch,
            modified,
            diagnostics,
        })
    }

    /// Rewrite the `path:line` sources of `definition` to `next_version`
    pub fn update_sources(
        &self,
        next_version: &str,
        commit: bool,
        commit_all: bool,
        definition: &Definition,
    ) -> Result<SourceUpdate> {
        let scm = self
            .scm
            .ok_or_else(|| VersioningError::Disabled(PROBLEM_NO_SCM.to_string()))?;
        update_sources(
            &self.root,
            scm,
            next_version,
            commit,
            commit_all,
            definition,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VersioningSpec;
    use crate::domain::RepositoryVersion;
    use crate::git::MockScm;
    use crate::meta::Metadata;

    fn meta(spec: &str) -> Metadata {
        Metadata::new(Some(VersioningSpec::Compact(spec.to_string())))
    }

    fn scm(dirty: bool) -> MockScm {
        MockScm::new(
            RepositoryVersion::new("1.2.3", 0, Some("gabc123".to_string()), dirty),
            "master",
        )
    }

    #[test]
    fn test_not_enabled_without_declaration() {
        let scm = scm(false);
        let versioning = Versioning::new(&Metadata::default(), Some(&scm), ".");
        assert!(!versioning.enabled());
        assert_eq!(versioning.problem(), Some(PROBLEM_NOT_ENABLED));
    }

    #[test]
    fn test_enabled_but_no_scm() {
        let versioning = Versioning::new(&meta("tag"), None, ".");
        assert!(versioning.enabled());
        assert_eq!(versioning.problem(), Some(PROBLEM_NO_SCM));
    }

    #[test]
    fn test_strategy_problem_disables() {
        let scm = scm(false);
        let versioning = Versioning::new(&meta("{major}.{nope}"), Some(&scm), ".");
        assert!(!versioning.enabled());
        assert_eq!(versioning.problem(), Some("invalid versioning part 'nope'"));
    }

    #[test]
    fn test_auto_fill_renders_from_git() {
        let scm = scm(true);
        let mut meta = meta("tag");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let diagnostics = versioning.auto_fill_version(&mut meta).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(meta.value("version"), Some("1.2.3+gabc123"));
        assert_eq!(meta.definition("version").unwrap().source, "git");
    }

    #[test]
    fn test_auto_fill_warns_on_mismatch() {
        let scm = scm(false);
        let mut meta = meta("tag");
        meta.declare("version", "setup.py:3", "1.1");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let diagnostics = versioning.auto_fill_version(&mut meta).unwrap();
        assert_eq!(
            diagnostics,
            vec![Diagnostic::VersionMismatch {
                source: "setup.py:3".to_string(),
                expected: "1.2".to_string(),
                current: "1.1".to_string(),
            }]
        );
        assert_eq!(meta.value("version"), Some("1.2.3"));
    }

    #[test]
    fn test_auto_fill_seeds_fallback_when_no_scm() {
        let mut meta = meta("tag");
        let versioning = Versioning::new(&meta, None, ".");
        let diagnostics = versioning.auto_fill_version(&mut meta).unwrap();
        assert_eq!(diagnostics, vec![Diagnostic::Problem(PROBLEM_NO_SCM.to_string())]);
        assert_eq!(meta.value("version"), Some("0.0.0"));
        assert_eq!(meta.definition("version").unwrap().source, "missing");
    }

    #[test]
    fn test_auto_fill_keeps_declared_value_when_no_scm() {
        let mut meta = meta("tag");
        meta.declare("version", "setup.py:1", "4.5.6");
        let versioning = Versioning::new(&meta, None, ".");
        versioning.auto_fill_version(&mut meta).unwrap();
        assert_eq!(meta.value("version"), Some("4.5.6"));
    }

    #[test]
    fn test_auto_fill_skips_alternate_build_system() {
        let scm = scm(false);
        let mut meta = meta("tag");
        meta.declare("version", ALTERNATE_BUILD_SOURCE, "7.0.0");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        versioning.auto_fill_version(&mut meta).unwrap();
        assert_eq!(meta.value("version"), Some("7.0.0"));
    }

    #[test]
    fn test_auto_fill_alternate_build_system_without_value() {
        let scm = scm(false);
        let mut meta = meta("tag");
        meta.declare("version", ALTERNATE_BUILD_SOURCE, "");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        versioning.auto_fill_version(&mut meta).unwrap();
        assert_eq!(meta.value("version"), Some("1.2.3"));
        assert_eq!(meta.definition("version").unwrap().source, "git");
    }

    #[test]
    fn test_bump_overflow_is_an_error() {
        let scm = MockScm::new(
            RepositoryVersion::new(&format!("{}.0.0", u64::MAX), 0, None, false),
            "master",
        );
        let meta = meta("tag");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let err = versioning
            .bump(&meta, &BumpRequest::new(VersionBump::Major).commit(true))
            .unwrap_err();
        assert!(matches!(err, VersioningError::VersionOverflow { ref component, .. } if component == "major"));
        assert!(scm.tags().is_empty());
        assert!(scm.commits().is_empty());
    }

    #[test]
    fn test_auto_fill_noop_when_disabled() {
        let scm = scm(false);
        let mut meta = Metadata::new(Some(VersioningSpec::Enabled(false)));
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        versioning.auto_fill_version(&mut meta).unwrap();
        assert!(meta.definition("version").is_none());
    }

    #[test]
    fn test_bump_requires_usable_versioning() {
        let versioning = Versioning::new(&meta("tag"), None, ".");
        let err = versioning
            .bump(&meta("tag"), &BumpRequest::new(VersionBump::Patch))
            .unwrap_err();
        assert!(matches!(err, VersioningError::Disabled(ref p) if p == PROBLEM_NO_SCM));
    }

    #[test]
    fn test_bump_rejects_branch() {
        let scm = scm(false);
        let meta = meta("tag(release):{major}.{minor}.{patch}");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let err = versioning
            .bump(&meta, &BumpRequest::new(VersionBump::Patch))
            .unwrap_err();
        assert!(matches!(err, VersioningError::BranchNotAllowed { ref branch, .. } if branch == "master"));
        assert!(scm.tags().is_empty());
    }

    #[test]
    fn test_bump_simulated_branch() {
        let scm = scm(false);
        let meta = meta("tag(release):{major}.{minor}.{patch}");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let report = versioning
            .bump(
                &meta,
                &BumpRequest::new(VersionBump::Minor).simulate_branch("release"),
            )
            .unwrap();
        assert_eq!(report.version, "1.3.0");
        assert_eq!(report.branch, "release");
        assert_eq!(report.diagnostics, vec![Diagnostic::NotCommitting]);
        assert_eq!(scm.tags().len(), 1);
        assert!(!scm.tags()[0].commit);
    }

    #[test]
    fn test_bump_dirty_tree_refuses_commit() {
        let scm = scm(true);
        let meta = meta("tag");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let err = versioning
            .bump(&meta, &BumpRequest::new(VersionBump::Patch).commit(true))
            .unwrap_err();
        assert!(matches!(err, VersioningError::PendingChanges));
        assert!(scm.tags().is_empty());
        assert!(scm.commits().is_empty());
    }

    #[test]
    fn test_bump_dirty_tree_with_commit_all() {
        let dir = tempfile::tempdir().unwrap();
        let scm = scm(true);
        let meta = meta("tag");
        let versioning = Versioning::new(&meta, Some(&scm), dir.path());
        let report = versioning
            .bump(
                &meta,
                &BumpRequest::new(VersionBump::Major)
                    .commit(true)
                    .commit_all(true),
            )
            .unwrap();
        assert_eq!(report.version, "2.0.0");
        assert!(report.diagnostics.is_empty());
        assert_eq!(scm.tags()[0].version, "2.0.0");
        assert!(scm.tags()[0].commit);
    }

    #[test]
    fn test_bump_out_of_scope() {
        let scm = scm(false);
        let meta = meta("{major}.{minor}");
        let versioning = Versioning::new(&meta, Some(&scm), ".");
        let err = versioning
            .bump(&meta, &BumpRequest::new(VersionBump::Patch))
            .unwrap_err();
        assert!(matches!(err, VersioningError::OutOfScope { .. }));
    }

    #[test]
    fn test_formatted_defaults() {
        assert_eq!(
            Versioning::formatted(
                crate::strategy::DEFAULT_MAIN,
                crate::strategy::DEFAULT_EXTRA,
                crate::strategy::DEFAULT_SEPARATOR,
                &["master".to_string()],
            ),
            "tag(master):{major}.{minor}.{patch}{post}+{commitid}"
        );
    }
}
