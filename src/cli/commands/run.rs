use anyhow::Result;
use clap::Args;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::Output;
use crate::config::{ConfigLoader, SettingsOverrides};
use crate::git::current_branch_at;
use crate::policy::EnvSnapshot;
use crate::runner;

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Per-command timeout in milliseconds (0 disables it)
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Stream command output live instead of capturing it
    #[arg(long)]
    pub stream: bool,

    /// Run the checks even in CI or on a skipped branch
    #[arg(long)]
    pub no_skip: bool,
}

impl RunArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            timeout: self.timeout,
            verbose: self.stream.then_some(true),
        }
    }
}

/// Load the configuration, apply the skip policy and run the checks
pub async fn execute(
    args: RunArgs,
    root: &Path,
    config_path: Option<&Path>,
    output: Output,
) -> Result<ExitCode> {
    let config = match ConfigLoader::new(root)
        .with_custom_config(config_path)
        .load(Some(&args.overrides()))
    {
        Ok(config) => config,
        Err(err) => {
            output.error(&format!("Configuration error: {err:#}"));
            return Ok(ExitCode::FAILURE);
        }
    };

    let verdict = if args.no_skip {
        runner::run(&config, output).await
    } else {
        let env = EnvSnapshot::from_process();
        runner::check(&config, &env, || current_branch_at(root), output).await
    };

    Ok(verdict.exit_code())
}
