//! Skip policy for the pre-push checks
//!
//! Decides, before any command runs, whether the whole check sequence should
//! be bypassed: inside a CI environment, or on a configured branch. These are
//! pure decisions over the configuration and an injected environment snapshot
//! and branch lookup, so nothing here touches the process or the repository.

use std::collections::HashMap;
use std::fmt;

use crate::config::PreflightConfig;

/// Environment variables whose presence marks a CI run
pub const CI_MARKERS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
];

/// Read-only snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment, skipping non-UTF-8 entries
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// A variable counts when it is set to any non-empty value, including "false"
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_empty())
    }

    /// Whether any CI marker is set
    pub fn is_ci(&self) -> bool {
        self.ci_marker().is_some()
    }

    /// The first CI marker that is set, if any
    pub fn ci_marker(&self) -> Option<&'static str> {
        CI_MARKERS.iter().copied().find(|name| self.is_set(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Why the checks were bypassed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Ci,
    Branch(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Ci => write!(f, "Skipping pre-push checks in CI environment"),
            SkipReason::Branch(branch) => {
                write!(f, "Skipping pre-push checks on branch: {branch}")
            }
        }
    }
}

/// True iff `skip_ci` is enabled and the snapshot looks like a CI run
pub fn should_skip_for_ci(config: &PreflightConfig, env: &EnvSnapshot) -> bool {
    config.skip_ci && env.is_ci()
}

/// True iff `branch` is known and listed in `skip_on_branches`.
/// An unknown branch (detached HEAD, lookup failure) never skips.
pub fn should_skip_for_branch(config: &PreflightConfig, branch: Option<&str>) -> bool {
    match branch {
        Some(branch) if !branch.is_empty() => {
            config.skip_on_branches.iter().any(|b| b == branch)
        }
        _ => false,
    }
}

/// Combined skip decision. The branch is only looked up when a skip list
/// is configured.
pub fn evaluate<F>(config: &PreflightConfig, env: &EnvSnapshot, branch_lookup: F) -> Option<SkipReason>
where
    F: FnOnce() -> Option<String>,
{
    if should_skip_for_ci(config, env) {
        tracing::debug!("CI marker {:?} detected", env.ci_marker());
        return Some(SkipReason::Ci);
    }

    if config.skip_on_branches.is_empty() {
        return None;
    }

    let branch = branch_lookup();
    tracing::debug!("current branch: {:?}", branch);

    if should_skip_for_branch(config, branch.as_deref()) {
        return branch.map(SkipReason::Branch);
    }

    None
}
