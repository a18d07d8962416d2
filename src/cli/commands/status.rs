//! Show hook, configuration and environment status

use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::Output;
use crate::config::ConfigLoader;
use crate::git::{GitRepo, HookStatus};
use crate::policy::EnvSnapshot;
use crate::utils::{format_duration, get_default_shell, truncate_string};

const COMMAND_WIDTH: usize = 60;

/// Execute the status command
pub fn execute(root: &Path, config_path: Option<&Path>, output: &Output) -> Result<ExitCode> {
    output.header("no-push-oops status");

    match GitRepo::discover(root) {
        Ok(repo) => {
            let branch = repo.current_branch();
            output.key_value("Repository", &repo.git_dir().display().to_string(), false);
            output.key_value("Branch", branch.as_deref().unwrap_or("(detached or unborn)"), false);

            let hook = match repo.hook_status()? {
                HookStatus::Installed => ("installed", true),
                HookStatus::Foreign => ("present, not managed by no-push-oops", false),
                HookStatus::Missing => ("not installed", false),
            };
            output.key_value("Pre-push hook", hook.0, hook.1);
        }
        Err(_) => output.key_value("Repository", "not a Git repository", false),
    }

    let env = EnvSnapshot::from_process();
    let ci = env
        .ci_marker()
        .map(|marker| format!("yes ({marker})"))
        .unwrap_or_else(|| "no".to_string());
    output.key_value("CI detected", &ci, false);

    let shell = get_default_shell();
    let shell_location = which::which(shell)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| format!("{shell} not found in PATH"));
    output.key_value("Shell", &shell_location, false);

    let loader = ConfigLoader::new(root).with_custom_config(config_path);
    let source = loader.discover_source();
    match loader.load(None) {
        Ok(config) => {
            if let Ok(source) = source {
                output.key_value("Config source", &source.to_string(), false);
            }
            output.key_value("Skip in CI", &config.skip_ci.to_string(), false);
            if !config.skip_on_branches.is_empty() {
                output.key_value("Skip on branches", &config.skip_on_branches.join(", "), false);
            }
            let timeout = config
                .timeout
                .map(format_duration)
                .unwrap_or_else(|| "none".to_string());
            output.key_value("Timeout", &timeout, false);
            output.key_value("Commands", &config.commands.len().to_string(), true);
            for command in &config.commands {
                output.list_item(&truncate_string(command, COMMAND_WIDTH));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output.error(&format!("Configuration error: {err:#}"));
            Ok(ExitCode::FAILURE)
        }
    }
}
