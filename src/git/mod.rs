//! Git integration layer for no-push-oops
//!
//! Repository discovery, current branch lookup and pre-push hook management,
//! built on git2.

pub mod hooks;

use anyhow::{Context, Result};
use git2::Repository;
use std::path::{Path, PathBuf};

pub use hooks::{HookStatus, InstallOutcome, UninstallOutcome};

/// Handle on the repository containing the project
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Discover the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .with_context(|| format!("Not a Git repository: {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Current branch name; `None` when HEAD is detached, unborn or unreadable
    pub fn current_branch(&self) -> Option<String> {
        match self.repo.head_detached() {
            Ok(false) => {}
            Ok(true) => return None,
            Err(err) => {
                tracing::debug!("unable to inspect HEAD: {err}");
                return None;
            }
        }

        let head = match self.repo.head() {
            Ok(head) => head,
            Err(err) => {
                tracing::debug!("unable to resolve HEAD: {err}");
                return None;
            }
        };

        head.shorthand().map(str::to_string)
    }

    /// The `.git` directory
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Working directory, `None` for bare repositories
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Directory git reads hooks from
    pub fn hooks_dir(&self) -> PathBuf {
        self.repo.path().join("hooks")
    }
}

/// Branch of the repository around `path`, swallowing every failure
pub fn current_branch_at<P: AsRef<Path>>(path: P) -> Option<String> {
    GitRepo::discover(path).ok()?.current_branch()
}
