//! Command-line interface for no-push-oops
//!
//! This module provides the main CLI structure and command dispatch. Every
//! command returns the process exit code; only configuration problems and
//! I/O failures surface as errors.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

pub mod commands;
mod output;

pub use output::Output;

/// no-push-oops - Prevent oops moments with Git pre-push checks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this JSON configuration file instead of the project settings
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install the pre-push hook
    Install,
    /// Uninstall the pre-push hook
    Uninstall,
    /// Run the preflight checks manually
    Run(commands::run::RunArgs),
    /// Show hook, configuration and environment status
    Status,
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration as JSON
    Show,
    /// Validate the configuration
    Validate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<ExitCode> {
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.quiet);
        let root = std::env::current_dir()?;
        let config = self.config.as_deref();

        match self.command {
            Some(Commands::Install) => commands::install::execute(&root, &output),
            Some(Commands::Uninstall) => commands::uninstall::execute(&root, &output),
            Some(Commands::Run(args)) => commands::run::execute(args, &root, config, output).await,
            Some(Commands::Status) => commands::status::execute(&root, config, &output),
            Some(Commands::Config(cmd)) => commands::config::execute(cmd, &root, config, &output),
            None if invoked_as_runner() => {
                commands::run::execute(Default::default(), &root, config, output).await
            }
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// True when the binary was started through a `*-run` alias
fn invoked_as_runner() -> bool {
    std::env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().ends_with("-run")))
        .unwrap_or(false)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
