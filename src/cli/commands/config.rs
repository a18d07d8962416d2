//! Configuration management commands

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::{ConfigCommands, Output};
use crate::config::{ConfigLoader, PreflightConfig};

/// Execute config commands
pub fn execute(
    cmd: ConfigCommands,
    root: &Path,
    config_path: Option<&Path>,
    output: &Output,
) -> Result<ExitCode> {
    let loader = ConfigLoader::new(root).with_custom_config(config_path);
    match cmd {
        ConfigCommands::Show => show(&loader, output),
        ConfigCommands::Validate => validate(&loader, output),
    }
}

fn show(loader: &ConfigLoader, output: &Output) -> Result<ExitCode> {
    let (settings, source) = loader.load_settings(None)?;
    let json = serde_json::to_string_pretty(&settings).context("Failed to serialize configuration")?;

    output.info(&format!("Source: {source}"));
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn validate(loader: &ConfigLoader, output: &Output) -> Result<ExitCode> {
    let (settings, source) = match loader.load_settings(None) {
        Ok(loaded) => loaded,
        Err(err) => {
            output.error(&format!("Configuration error: {err:#}"));
            return Ok(ExitCode::FAILURE);
        }
    };

    match PreflightConfig::try_from(settings) {
        Ok(config) => {
            output.success(&format!("Configuration is valid ({source})"));
            for command in &config.commands {
                output.list_item(command);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output.error(&format!("Configuration error in {source}: {err}"));
            Ok(ExitCode::FAILURE)
        }
    }
}
