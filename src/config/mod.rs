//! Configuration management for no-push-oops
//!
//! Raw settings are layered by [`ConfigLoader`] from `package.json`, the
//! `.nopushoopsrc` files, the environment and CLI overrides. They are then
//! validated once into an immutable [`PreflightConfig`] that the runner reads.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod core;
mod providers;

pub use self::core::{ConfigLoader, ConfigSource, SettingsOverrides};

/// Command used when the project configures neither `command` nor `commands`
pub const DEFAULT_COMMAND: &str = "npm run pr-preflight";

/// Banner message used when none is configured
pub const DEFAULT_MESSAGE: &str = "Running pr-preflight checks before push";

/// Per-command timeout used when none is configured (5 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Raw, layered settings as they appear in the JSON sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreflightSettings {
    /// Single command to run before push
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Commands to run in sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,

    /// Banner message shown before the checks start
    #[serde(default = "default_message")]
    pub message: String,

    /// Skip the checks in CI environments
    #[serde(rename = "skipCI", default = "default_skip_ci")]
    pub skip_ci: bool,

    /// Skip the checks on these branches
    #[serde(rename = "skipOnBranches", default)]
    pub skip_on_branches: Vec<String>,

    /// Stream command output live instead of capturing it
    #[serde(default)]
    pub verbose: bool,

    /// Per-command timeout in milliseconds, 0 disables it
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

fn default_skip_ci() -> bool {
    true
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for PreflightSettings {
    fn default() -> Self {
        Self {
            command: None,
            commands: None,
            message: default_message(),
            skip_ci: default_skip_ci(),
            skip_on_branches: Vec::new(),
            verbose: false,
            timeout: default_timeout(),
        }
    }
}

/// Invalid command configuration, detected before anything runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Cannot specify both \"command\" and \"commands\"")]
    Conflicting,

    #[error("Either \"command\" or \"commands\" must be specified")]
    MissingCommand,

    #[error("Command #{} is empty", .index + 1)]
    BlankCommand { index: usize },
}

/// Validated execution policy for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PreflightConfig {
    /// Commands to run, in order; never empty
    pub commands: Vec<String>,

    /// Banner message
    pub message: String,

    /// Skip when a CI environment is detected
    pub skip_ci: bool,

    /// Branches on which the checks are skipped
    pub skip_on_branches: Vec<String>,

    /// Pass command output straight through to the terminal
    pub verbose: bool,

    /// Per-command timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

impl PreflightConfig {
    /// Build a config running a single command with default policy
    pub fn from_command(command: impl Into<String>) -> Self {
        Self::from_commands(vec![command.into()])
    }

    /// Build a config running `commands` in order with default policy
    pub fn from_commands(commands: Vec<String>) -> Self {
        Self {
            commands,
            message: DEFAULT_MESSAGE.to_string(),
            skip_ci: true,
            skip_on_branches: Vec::new(),
            verbose: false,
            timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_skip_ci(mut self, skip_ci: bool) -> Self {
        self.skip_ci = skip_ci;
        self
    }

    pub fn with_skip_on_branches(mut self, branches: Vec<String>) -> Self {
        self.skip_on_branches = branches;
        self
    }
}

impl TryFrom<PreflightSettings> for PreflightConfig {
    type Error = ConfigError;

    fn try_from(settings: PreflightSettings) -> Result<Self, Self::Error> {
        let commands = match (settings.command, settings.commands) {
            (Some(_), Some(_)) => return Err(ConfigError::Conflicting),
            (None, None) => return Err(ConfigError::MissingCommand),
            (None, Some(commands)) if commands.is_empty() => {
                return Err(ConfigError::MissingCommand);
            }
            (None, Some(commands)) => commands,
            (Some(command), None) => vec![command],
        };

        if let Some(index) = commands.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankCommand { index });
        }

        let timeout = match settings.timeout {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Ok(Self {
            commands,
            message: settings.message,
            skip_ci: settings.skip_ci,
            skip_on_branches: settings.skip_on_branches,
            verbose: settings.verbose,
            timeout,
        })
    }
}
