use std::path::Path;
use std::process::Command;

use crate::error::{Result, VersioningError};
use crate::hooks::HookContext;

/// Whether `path` is a file the current user may execute
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `path` is a file the current user may execute
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Executes the bump hook script
pub struct HookExecutor;

impl HookExecutor {
    /// Execute a hook script with the given context
    ///
    /// The script runs in `cwd` with environment variables set from the
    /// context. In dry-run mode the script is not started; only the command
    /// that would run is logged.
    ///
    /// # Returns
    /// * `Ok(())` if hook succeeds (exit code 0) or the run was simulated
    /// * `Err` if script not found, cannot be started, or returns non-zero exit code
    pub fn execute(script_path: &Path, cwd: &Path, context: &HookContext) -> Result<()> {
        if !script_path.is_file() {
            return Err(VersioningError::hook(format!(
                "Hook script not found: {}",
                script_path.display()
            )));
        }

        if context.dryrun {
            log::info!("Would run: {}", script_path.display());
            return Ok(());
        }

        // A relative program path would be resolved against `cwd` once it is applied
        let program = script_path.canonicalize().map_err(|e| {
            VersioningError::hook(format!(
                "Cannot resolve hook {}: {}",
                script_path.display(),
                e
            ))
        })?;

        log::info!("Running: {}", program.display());
        let output = Command::new(&program)
            .current_dir(cwd)
            .envs(context.to_env_vars())
            .output()
            .map_err(|e| {
                VersioningError::hook(format!(
                    "Failed to execute hook {}: {}",
                    script_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(VersioningError::hook(format!(
                "Hook {} failed with exit code {}\nStdout: {}\nStderr: {}",
                script_path.display(),
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        Ok(())
    }
}
