//! Pre-push check runner
//!
//! The skip policy is consulted first; when nothing says to skip, the
//! configured commands run in order through the [`Preflight`] orchestrator,
//! each one executed by a [`CommandExecutor`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use no_push_oops::cli::Output;
//! use no_push_oops::config::PreflightConfig;
//! use no_push_oops::policy::EnvSnapshot;
//! use no_push_oops::runner;
//!
//! # async fn demo() {
//! let config = PreflightConfig::from_commands(vec!["cargo fmt --check".into(), "cargo test".into()]);
//! let verdict = runner::check(&config, &EnvSnapshot::from_process(), || None, Output::default()).await;
//! assert!(verdict.is_success());
//! # }
//! ```

pub mod executor;
pub mod orchestrator;

use std::process::ExitCode;

use crate::cli::Output;
use crate::config::PreflightConfig;
use crate::policy::{self, EnvSnapshot, SkipReason};

pub use executor::{ABNORMAL_EXIT_CODE, CommandExecutor, CommandOutcome, Shell, Termination};
pub use orchestrator::{Preflight, PreflightReport};

/// Overall result of one invocation
#[derive(Debug, Clone)]
pub enum Verdict {
    Skipped(SkipReason),
    Passed(PreflightReport),
    Failed(PreflightReport),
}

impl Verdict {
    /// Skipped and passed runs both let the push proceed
    pub fn is_success(&self) -> bool {
        !matches!(self, Verdict::Failed(_))
    }

    pub fn report(&self) -> Option<&PreflightReport> {
        match self {
            Verdict::Skipped(_) => None,
            Verdict::Passed(report) | Verdict::Failed(report) => Some(report),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Apply the skip policy, then run the checks
pub async fn check<F>(
    config: &PreflightConfig,
    env: &EnvSnapshot,
    branch_lookup: F,
    output: Output,
) -> Verdict
where
    F: FnOnce() -> Option<String>,
{
    if let Some(reason) = policy::evaluate(config, env, branch_lookup) {
        output.warning(&reason.to_string());
        return Verdict::Skipped(reason);
    }

    run(config, output).await
}

/// Run the checks without consulting the skip policy
pub async fn run(config: &PreflightConfig, output: Output) -> Verdict {
    let report = Preflight::new(config, output).run().await;
    if report.passed() {
        Verdict::Passed(report)
    } else {
        Verdict::Failed(report)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker_config(dir: &TempDir) -> (PreflightConfig, std::path::PathBuf) {
        let marker = dir.path().join("executed");
        let config = PreflightConfig::from_command(format!("touch '{}'", marker.display()));
        (config, marker)
    }

    #[tokio::test]
    async fn test_ci_skips_without_running() {
        let dir = TempDir::new().unwrap();
        let (config, marker) = marker_config(&dir);
        let env: EnvSnapshot = [("CI", "true")].into_iter().collect();

        let verdict = check(&config, &env, || None, Output::quiet()).await;

        assert!(matches!(verdict, Verdict::Skipped(SkipReason::Ci)));
        assert!(verdict.is_success());
        assert!(verdict.report().is_none());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_ci_runs_when_skip_disabled() {
        let dir = TempDir::new().unwrap();
        let (config, marker) = marker_config(&dir);
        let config = config.with_skip_ci(false);
        let env: EnvSnapshot = [("CI", "true")].into_iter().collect();

        let verdict = check(&config, &env, || None, Output::quiet()).await;

        assert!(matches!(verdict, Verdict::Passed(_)));
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_branch_skips_without_running() {
        let dir = TempDir::new().unwrap();
        let (config, marker) = marker_config(&dir);
        let config = config.with_skip_on_branches(vec!["main".to_string()]);

        let verdict = check(&config, &EnvSnapshot::default(), || Some("main".into()), Output::quiet()).await;

        assert!(matches!(verdict, Verdict::Skipped(SkipReason::Branch(ref b)) if b == "main"));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_other_branch_runs() {
        let dir = TempDir::new().unwrap();
        let (config, marker) = marker_config(&dir);
        let config = config.with_skip_on_branches(vec!["main".to_string()]);

        let verdict = check(&config, &EnvSnapshot::default(), || Some("feature".into()), Output::quiet()).await;

        assert!(matches!(verdict, Verdict::Passed(_)));
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_failed_run_maps_to_failure() {
        let config = PreflightConfig::from_command("exit 1");
        let verdict = check(&config, &EnvSnapshot::default(), || None, Output::quiet()).await;

        assert!(!verdict.is_success());
        assert_eq!(verdict.report().unwrap().outcomes.len(), 1);
    }
}
