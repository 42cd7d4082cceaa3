//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Base file: `<base_dir>/appsettings.toml`
//! 3. Environment file: `<base_dir>/appsettings.<Environment>.toml`
//! 4. User secrets (Development only): `secrets_file` or `$XDG_CONFIG_HOME/clihost/secrets.toml`
//! 5. Environment variables: `CLIHOST_*` prefix, `__` between nested keys

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{AppInfo, ApplicationError};
use crate::domain::EnvironmentName;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "CLIHOST";

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Debugger-wait configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Poll cadence in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 400,
        }
    }
}

/// Unified configuration for the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Application name shown in help, logs and the console title
    pub app_name: String,
    /// Application version shown in help, logs and the console title
    pub app_version: String,
    pub logging: LoggingConfig,
    pub debugger: DebuggerConfig,
    /// User secrets file, overrides the XDG default location
    pub secrets_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let app = AppInfo::current();
        Self {
            app_name: app.name,
            app_version: app.version,
            logging: LoggingConfig::default(),
            debugger: DebuggerConfig::default(),
            secrets_file: None,
        }
    }
}

/// Get the XDG config directory for clihost.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clihost").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default path of the user secrets file.
pub fn default_secrets_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("secrets.toml"))
}

/// Path of the base settings file in `base_dir`.
pub fn base_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("appsettings.toml")
}

/// Path of the environment specific settings file in `base_dir`.
pub fn environment_config_path(base_dir: &Path, environment: &EnvironmentName) -> PathBuf {
    base_dir.join(format!("appsettings.{}.toml", environment))
}

impl Settings {
    /// Load settings from `base_dir` for `environment`, with `CLIHOST_*` overrides
    /// taken from the process environment.
    pub fn load(base_dir: &Path, environment: &EnvironmentName) -> Result<Self, ApplicationError> {
        Self::load_with(base_dir, environment, None)
    }

    /// Like [`load`](Self::load); `env_overrides` replaces the process environment
    /// as the source of `CLIHOST_*` variables.
    pub fn load_with(
        base_dir: &Path,
        environment: &EnvironmentName,
        env_overrides: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("app_name", defaults.app_name)
            .map_err(config_err)?
            .set_default("app_version", defaults.app_version)
            .map_err(config_err)?
            .set_default("logging.level", defaults.logging.level)
            .map_err(config_err)?
            .set_default(
                "debugger.poll_interval_ms",
                defaults.debugger.poll_interval_ms as i64,
            )
            .map_err(config_err)?;

        let base = base_config_path(base_dir);
        let env_file = environment_config_path(base_dir, environment);
        debug!("config files: {} {}", base.display(), env_file.display());
        builder = builder
            .add_source(File::from(base).format(FileFormat::Toml).required(false))
            .add_source(File::from(env_file).format(FileFormat::Toml).required(false));

        if environment.is_development() {
            // secrets_file may itself come from the files above or the environment
            let partial: Settings = builder
                .clone()
                .add_source(env_source(env_overrides.clone()))
                .build()
                .map_err(config_err)?
                .try_deserialize()
                .map_err(config_err)?;
            if let Some(secrets) = partial.secrets_path() {
                debug!("user secrets: {}", secrets.display());
                builder = builder
                    .add_source(File::from(secrets).format(FileFormat::Toml).required(false));
            }
        }

        let config = builder
            .add_source(env_source(env_overrides))
            .build()
            .map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Resolved secrets path: `secrets_file` with `~` and `$VAR` expanded, else the XDG default.
    pub fn secrets_path(&self) -> Option<PathBuf> {
        match &self.secrets_file {
            Some(path) => {
                let raw = path.to_string_lossy();
                let expanded = shellexpand::full(raw.as_ref())
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| raw.into_owned());
                Some(PathBuf::from(expanded))
            }
            None => default_secrets_path(),
        }
    }

    pub fn app_info(&self) -> AppInfo {
        AppInfo::new(self.app_name.clone(), self.app_version.clone())
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}

fn env_source(overrides: Option<HashMap<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .source(overrides)
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, env!("CARGO_PKG_NAME"));
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.debugger.poll_interval_ms, 400);
        assert!(settings.secrets_file.is_none());
    }

    #[test]
    fn given_secrets_file_with_variable_when_resolving_then_expands() {
        std::env::set_var("CLIHOST_TEST_SECRETS_DIR", "/tmp/clihost-secrets");
        let settings = Settings {
            secrets_file: Some(PathBuf::from("$CLIHOST_TEST_SECRETS_DIR/s.toml")),
            ..Settings::default()
        };
        assert_eq!(
            settings.secrets_path(),
            Some(PathBuf::from("/tmp/clihost-secrets/s.toml"))
        );
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
