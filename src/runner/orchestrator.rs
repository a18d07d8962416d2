//! Sequential check runner
//!
//! Runs the configured commands strictly one after another and stops at the
//! first failure.

use crate::cli::Output;
use crate::config::PreflightConfig;

use super::executor::{CommandExecutor, CommandOutcome};

/// Outcomes of one check run, in execution order
#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl PreflightReport {
    /// True when every command that ran succeeded
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.success)
    }

    /// The command that stopped the run, if any
    pub fn failure(&self) -> Option<&CommandOutcome> {
        self.outcomes.iter().find(|outcome| !outcome.success)
    }
}

/// Runs a [`PreflightConfig`] through a [`CommandExecutor`]
pub struct Preflight<'a> {
    config: &'a PreflightConfig,
    executor: CommandExecutor,
    output: Output,
}

impl<'a> Preflight<'a> {
    pub fn new(config: &'a PreflightConfig, output: Output) -> Self {
        Self {
            config,
            executor: CommandExecutor::new(output),
            output,
        }
    }

    pub fn with_executor(mut self, executor: CommandExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Run every command in order, stopping at the first failure or Ctrl-C
    pub async fn run(&self) -> PreflightReport {
        let executor = self.executor.clone().listening_for_ctrl_c();
        self.output.banner(&self.config.message);

        let total = self.config.commands.len();
        let mut report = PreflightReport::default();

        for (index, command) in self.config.commands.iter().enumerate() {
            tracing::debug!("running check {}/{}: {}", index + 1, total, command);

            let outcome = executor
                .run(command, self.config.timeout, self.config.verbose)
                .await;
            let failed = !outcome.success;
            report.outcomes.push(outcome);

            if failed {
                tracing::info!("check {} failed, skipping {} remaining", index + 1, total - index - 1);
                break;
            }
        }

        if report.passed() {
            self.output
                .verdict_banner("Preflight checks passed. Proceeding with push", true);
        } else {
            self.output
                .verdict_banner("Preflight checks failed. Push aborted", false);
            self.output.warning("Please fix the issues above and try again.");
        }

        report
    }

    /// Run the checks and collapse them to a single verdict
    pub async fn run_all(&self) -> bool {
        self.run().await.passed()
    }
}
