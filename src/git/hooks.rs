//! Pre-push hook installation
//!
//! Writes the bundled hook script into the repository's hooks directory and
//! removes it again. Hooks not written by no-push-oops are backed up before
//! being replaced and are never deleted.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::GitRepo;

/// Name of the hook file git runs before pushing
pub const HOOK_NAME: &str = "pre-push";

/// Marker identifying hooks written by this tool
pub const HOOK_MARKER: &str = "no-push-oops";

/// Hook script written into `.git/hooks/pre-push`
pub const PRE_PUSH_HOOK: &str = include_str!("../../templates/pre-push.sh");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed {
        path: PathBuf,
        backup: Option<PathBuf>,
    },
    AlreadyInstalled(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed(PathBuf),
    NotFound,
    /// A pre-push hook exists but was not written by this tool
    Foreign(PathBuf),
}

/// State of the pre-push hook, as shown by `status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Installed,
    Foreign,
    Missing,
}

impl GitRepo {
    /// Path of the pre-push hook file
    pub fn pre_push_hook_path(&self) -> PathBuf {
        self.hooks_dir().join(HOOK_NAME)
    }

    /// Install the pre-push hook
    pub fn install_hook(&self) -> Result<InstallOutcome> {
        let hooks_dir = self.hooks_dir();
        let hook_path = self.pre_push_hook_path();

        fs::create_dir_all(&hooks_dir).context("Failed to create hooks directory")?;

        let mut backup = None;
        if hook_path.exists() {
            if is_ours(&hook_path)? {
                return Ok(InstallOutcome::AlreadyInstalled(hook_path));
            }

            let backup_path = backup_path_for(&hook_path);
            fs::copy(&hook_path, &backup_path).with_context(|| {
                format!("Failed to back up existing hook to {}", backup_path.display())
            })?;
            tracing::info!("backed up existing hook to {}", backup_path.display());
            backup = Some(backup_path);
        }

        fs::write(&hook_path, PRE_PUSH_HOOK).context("Failed to write hook file")?;
        make_executable(&hook_path)?;

        Ok(InstallOutcome::Installed {
            path: hook_path,
            backup,
        })
    }

    /// Remove the pre-push hook if this tool wrote it
    pub fn uninstall_hook(&self) -> Result<UninstallOutcome> {
        let hook_path = self.pre_push_hook_path();

        if !hook_path.exists() {
            return Ok(UninstallOutcome::NotFound);
        }

        if !is_ours(&hook_path)? {
            return Ok(UninstallOutcome::Foreign(hook_path));
        }

        fs::remove_file(&hook_path).context("Failed to remove hook file")?;
        Ok(UninstallOutcome::Removed(hook_path))
    }

    pub fn hook_status(&self) -> Result<HookStatus> {
        let hook_path = self.pre_push_hook_path();
        if !hook_path.exists() {
            return Ok(HookStatus::Missing);
        }
        if is_ours(&hook_path)? {
            Ok(HookStatus::Installed)
        } else {
            Ok(HookStatus::Foreign)
        }
    }
}

fn is_ours(hook_path: &Path) -> Result<bool> {
    let content = fs::read_to_string(hook_path)
        .with_context(|| format!("Failed to read {}", hook_path.display()))?;
    Ok(content.contains(HOOK_MARKER))
}

fn backup_path_for(hook_path: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    hook_path.with_file_name(format!("{HOOK_NAME}.backup-{stamp}"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .context("Failed to get hook file metadata")?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).context("Failed to set hook file permissions")?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
