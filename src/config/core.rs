use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::providers::CanonicalKeys;
use super::{DEFAULT_COMMAND, PreflightConfig, PreflightSettings};

/// Key holding the settings inside `package.json`
pub const PACKAGE_JSON_KEY: &str = "no-push-oops";

/// Prefix for environment variable overrides, e.g. `NO_PUSH_OOPS_TIMEOUT`
pub const ENV_PREFIX: &str = "NO_PUSH_OOPS_";

const RC_JSON_FILE: &str = ".nopushoopsrc.json";
const RC_FILE: &str = ".nopushoopsrc";

/// Where the project settings were read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    PackageJson(PathBuf),
    RcFile(PathBuf),
    Custom(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::PackageJson(path) => {
                write!(f, "{} (\"{}\" key)", path.display(), PACKAGE_JSON_KEY)
            }
            ConfigSource::RcFile(path) | ConfigSource::Custom(path) => {
                write!(f, "{}", path.display())
            }
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Overrides supplied on the command line; unset fields leave the layered value alone
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Layers the settings sources for one project root
pub struct ConfigLoader {
    root: PathBuf,
    custom_config: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            custom_config: None,
        }
    }

    /// Use an explicit JSON file instead of the project sources
    pub fn with_custom_config(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.custom_config = path.map(Into::into);
        self
    }

    /// Find the settings source, first match wins:
    /// `package.json` key, `.nopushoopsrc.json`, then `.nopushoopsrc`.
    pub fn discover_source(&self) -> Result<ConfigSource> {
        if let Some(custom) = &self.custom_config {
            let path = if custom.is_absolute() {
                custom.clone()
            } else {
                self.root.join(custom)
            };
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(ConfigSource::Custom(path));
        }

        let package_json = self.root.join("package.json");
        if package_json.is_file() && has_package_json_key(&package_json)? {
            return Ok(ConfigSource::PackageJson(package_json));
        }

        for name in [RC_JSON_FILE, RC_FILE] {
            let path = self.root.join(name);
            if path.is_file() {
                return Ok(ConfigSource::RcFile(path));
            }
        }

        Ok(ConfigSource::Defaults)
    }

    /// Build the layered figment: defaults, project source, environment, CLI
    pub fn figment(&self, overrides: Option<&SettingsOverrides>) -> Result<(Figment, ConfigSource)> {
        let source = self.discover_source()?;
        tracing::debug!("CONFIG LOAD: using {}", source);

        let mut figment = Figment::from(Serialized::defaults(PreflightSettings::default()));

        figment = match &source {
            ConfigSource::PackageJson(path) => figment.merge(CanonicalKeys::new(
                Figment::from(Json::file(path)).focus(PACKAGE_JSON_KEY),
            )),
            ConfigSource::RcFile(path) | ConfigSource::Custom(path) => {
                figment.merge(CanonicalKeys::new(Json::file(path)))
            }
            ConfigSource::Defaults => figment,
        };

        figment = figment.merge(CanonicalKeys::new(Env::prefixed(ENV_PREFIX)));

        if let Some(overrides) = overrides {
            tracing::trace!("CONFIG LOAD: applying CLI overrides {:?}", overrides);
            figment = figment.merge(Serialized::defaults(overrides));
        }

        Ok((figment, source))
    }

    /// Extract the merged settings, filling in the default command when
    /// the project names none.
    pub fn load_settings(
        &self,
        overrides: Option<&SettingsOverrides>,
    ) -> Result<(PreflightSettings, ConfigSource)> {
        let (figment, source) = self.figment(overrides)?;

        let mut settings: PreflightSettings = figment
            .extract()
            .with_context(|| format!("Failed to parse configuration from {source}"))?;

        if settings.command.is_none() && settings.commands.is_none() {
            settings.command = Some(DEFAULT_COMMAND.to_string());
        }

        Ok((settings, source))
    }

    /// Load and validate the configuration for this project
    pub fn load(&self, overrides: Option<&SettingsOverrides>) -> Result<PreflightConfig> {
        let (settings, source) = self.load_settings(overrides)?;
        let config = PreflightConfig::try_from(settings)
            .with_context(|| format!("Invalid configuration in {source}"))?;
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn has_package_json_key(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value.get(PACKAGE_JSON_KEY).is_some_and(|v| !v.is_null()))
}
