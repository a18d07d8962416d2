//! # no-push-oops - Prevent oops moments with Git pre-push checks
//!
//! Installs a Git pre-push hook that runs your configured checks (tests,
//! lint, type-check) before a push goes out, and aborts the push when any of
//! them fails.
//!
//! ## Features
//!
//! - **Sequential checks**: commands run one after another, stopping at the first failure
//! - **Timeouts**: each command is killed, with its whole process group, when it overruns
//! - **Skip policy**: checks are bypassed in CI and on configured branches
//! - **Zero-config**: falls back to `npm run pr-preflight` when nothing is configured
//!
//! ## Quick Start
//!
//! ```bash
//! # Install the hook in the current repository
//! no-push-oops install
//!
//! # Run the checks manually
//! no-push-oops run
//! ```
//!
//! ## Configuration
//!
//! Add a `"no-push-oops"` key to `package.json`, or create `.nopushoopsrc.json`:
//!
//! ```json
//! {
//!   "commands": ["cargo fmt --check", "cargo clippy", "cargo test"],
//!   "message": "Running quality checks...",
//!   "skipCI": true,
//!   "skipOnBranches": ["main", "develop"],
//!   "verbose": false,
//!   "timeout": 300000
//! }
//! ```

pub mod cli;
pub mod config;
pub mod git;
pub mod policy;
pub mod runner;
pub mod utils;

pub use cli::{Cli, Output};
pub use config::{ConfigLoader, PreflightConfig};
pub use runner::Verdict;

/// Result type alias for no-push-oops operations
pub type Result<T> = anyhow::Result<T>;
