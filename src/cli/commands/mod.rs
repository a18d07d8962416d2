//! Command implementations for the no-push-oops CLI
//!
//! Each command lives in its own module and returns the process exit code.

pub mod config;
pub mod install;
pub mod run;
pub mod status;
pub mod uninstall;

use std::path::Path;

/// Show `path` relative to `root` when it lives inside it
pub(crate) fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
