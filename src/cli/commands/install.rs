use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;

use super::display_relative;
use crate::cli::Output;
use crate::git::{GitRepo, InstallOutcome};

/// Install the pre-push hook into the repository around `root`
pub fn execute(root: &Path, output: &Output) -> Result<ExitCode> {
    let repo = match GitRepo::discover(root) {
        Ok(repo) => repo,
        Err(_) => {
            output.error("Error: Not a Git repository");
            return Ok(ExitCode::FAILURE);
        }
    };

    match repo.install_hook()? {
        InstallOutcome::AlreadyInstalled(_) => {
            output.warning("Pre-push hook already installed");
        }
        InstallOutcome::Installed { path, backup } => {
            if let Some(backup) = backup {
                output.warning(&format!(
                    "Existing hook backed up to: {}",
                    display_relative(root, &backup)
                ));
            }
            output.success("Pre-push hook installed successfully!");
            output.info(&format!("Location: {}", display_relative(root, &path)));
        }
    }

    Ok(ExitCode::SUCCESS)
}
