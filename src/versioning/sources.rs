use std::fs;
use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::error::{Result, VersioningError};
use crate::git::{Scm, STAGE_ALL};
use crate::meta::Definition;

/// Outcome of rewriting the declared version sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUpdate {
    /// Project-relative paths whose content changed (or would have)
    pub modified: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrite every `path:line` source of `definition` to carry `next_version`,
/// then hand the modified files to `scm` for committing.
///
/// Files are only written when `commit` is set. With `commit_all`, the
/// whole working tree is committed instead of just the modified files.
pub fn update_sources(
    root: &Path,
    scm: &dyn Scm,
    next_version: &str,
    commit: bool,
    commit_all: bool,
    definition: &Definition,
) -> Result<SourceUpdate> {
    let mut update = SourceUpdate::default();

    for entry in &definition.sources {
        let Some((relative_path, target_line)) = entry.file_pointer() else {
            continue;
        };

        let full_path = root.join(relative_path);
        let content = fs::read_to_string(&full_path).map_err(|e| {
            VersioningError::source_file(format!("cannot read {}: {}", full_path.display(), e))
        })?;

        let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
        let mut revised = None;
        if let Some(line) = lines.get_mut(target_line - 1) {
            let candidate = updated_line(line, next_version);
            if candidate != *line {
                *line = candidate.clone();
                revised = Some(candidate);
            }
        }

        let Some(revised) = revised else {
            update.diagnostics.push(
                Diagnostic::AlreadyCorrect {
                    source: entry.source.clone(),
                }
                .emit(),
            );
            continue;
        };

        if !update.modified.iter().any(|p| p == relative_path) {
            update.modified.push(relative_path.to_string());
        }

        if commit {
            fs::write(&full_path, lines.concat()).map_err(|e| {
                VersioningError::source_file(format!(
                    "cannot write {}: {}",
                    full_path.display(),
                    e
                ))
            })?;
            log::info!("Updated {} with '{}'", entry.source, revised.trim());
        } else {
            update.diagnostics.push(
                Diagnostic::WouldUpdate {
                    source: entry.source.clone(),
                    line: revised.trim().to_string(),
                }
                .emit(),
            );
        }
    }

    if update.modified.is_empty() {
        return Ok(update);
    }

    let paths = if commit_all {
        vec![STAGE_ALL.to_string()]
    } else {
        update.modified.clone()
    };
    scm.commit_files(commit, &paths, next_version)?;

    Ok(update)
}

/// Replace the value of an assignment line with `next_version`.
///
/// A line containing `=` is treated as an assignment and gets a quoted
/// value; otherwise it is a `key: value` line and the value stays bare.
/// Everything before the separator is kept as is.
///
/// # Example
/// ```
/// # use git_versioning::versioning::updated_line;
/// assert_eq!(updated_line("version = '1.2.3'\n", "2.0.0"), "version = '2.0.0'\n");
/// assert_eq!(updated_line("version: 1.2.3\n", "2.0.0"), "version: 2.0.0\n");
/// ```
pub fn updated_line(line: &str, next_version: &str) -> String {
    let (separator, value) = if line.contains('=') {
        ('=', format!("'{}'", next_version))
    } else {
        (':', next_version.to_string())
    };

    let (key, rest) = line.split_once(separator).unwrap_or((line, ""));
    let space = if rest.starts_with(' ') { " " } else { "" };
    format!("{}{}{}{}\n", key, separator, space, value)
}
