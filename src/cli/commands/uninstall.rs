use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::Output;
use crate::git::{GitRepo, UninstallOutcome};

/// Remove the pre-push hook, leaving hooks written by other tools alone
pub fn execute(root: &Path, output: &Output) -> Result<ExitCode> {
    let repo = match GitRepo::discover(root) {
        Ok(repo) => repo,
        Err(_) => {
            output.error("Error: Not a Git repository");
            return Ok(ExitCode::FAILURE);
        }
    };

    match repo.uninstall_hook()? {
        UninstallOutcome::Removed(_) => {
            output.success("Pre-push hook uninstalled successfully");
            Ok(ExitCode::SUCCESS)
        }
        UninstallOutcome::NotFound => {
            output.warning("Pre-push hook not found");
            Ok(ExitCode::SUCCESS)
        }
        UninstallOutcome::Foreign(_) => {
            output.error("Pre-push hook is not from no-push-oops");
            Ok(ExitCode::FAILURE)
        }
    }
}
