//! Environment resolver
//!
//! Read-only queries for process identity and the active deployment environment.

use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::EnvironmentName;
use crate::infrastructure::traits::EnvSource;

/// Primary variable naming the active environment.
pub const DOTNET_ENVIRONMENT: &str = "DOTNET_ENVIRONMENT";

/// Fallback variable, consulted when the primary is unset or blank.
pub const ASPNETCORE_ENVIRONMENT: &str = "ASPNETCORE_ENVIRONMENT";

/// Application identity passed through to commands and help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity of this build, from the package metadata.
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Resolves the active environment from process environment variables.
pub struct EnvironmentResolver {
    env: Arc<dyn EnvSource>,
}

impl EnvironmentResolver {
    pub fn new(env: Arc<dyn EnvSource>) -> Self {
        Self { env }
    }

    /// First non-blank of `DOTNET_ENVIRONMENT`, `ASPNETCORE_ENVIRONMENT`.
    pub fn environment(&self) -> ApplicationResult<EnvironmentName> {
        let name = [DOTNET_ENVIRONMENT, ASPNETCORE_ENVIRONMENT]
            .into_iter()
            .filter_map(|key| self.env.var(key))
            .find(|value| !value.trim().is_empty())
            .ok_or(ApplicationError::MissingEnvironment {
                primary: DOTNET_ENVIRONMENT,
                fallback: ASPNETCORE_ENVIRONMENT,
            })?;
        debug!("environment: {}", name);
        Ok(EnvironmentName::new(name)?)
    }

    /// Case-insensitive comparison with the active environment.
    pub fn is_environment(&self, name: &str) -> ApplicationResult<bool> {
        Ok(self.environment()?.is(name)?)
    }

    pub fn is_development(&self) -> ApplicationResult<bool> {
        Ok(self.environment()?.is_development())
    }

    pub fn is_production(&self) -> ApplicationResult<bool> {
        Ok(self.environment()?.is_production())
    }

    pub fn is_staging(&self) -> ApplicationResult<bool> {
        Ok(self.environment()?.is_staging())
    }

    pub fn is_qa(&self) -> ApplicationResult<bool> {
        Ok(self.environment()?.is_qa())
    }

    pub fn application_name(&self) -> String {
        AppInfo::current().name
    }

    pub fn application_version(&self) -> String {
        AppInfo::current().version
    }

    /// Process arguments without the program name.
    pub fn command_line_arguments(&self) -> Vec<String> {
        self.env.args()
    }
}
