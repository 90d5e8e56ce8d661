//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::cloud::MonitoredResource;
use crate::config::schema::LoggerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Presence of this variable selects the hosted backend; its value is the
/// project id.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LoggerConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with variables from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env(lookup);
        config
    }

    /// Overlay environment variables on an existing config.
    ///
    /// A non-empty `GOOGLE_CLOUD_PROJECT` overrides `project_id`. The
    /// monitored resource is detected only when the config names none.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project) = lookup(PROJECT_ENV).filter(|p| !p.is_empty()) {
            self.project_id = Some(project);
        }
        if self.cloud.resource.is_none() {
            self.cloud.resource = self
                .hosted_project()
                .map(|project| MonitoredResource::detect(&lookup, project));
        }
    }
}

/// Load a TOML file, overlay the environment, and validate.
pub fn load_config(path: &Path) -> Result<LoggerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: LoggerConfig = toml::from_str(&content)?;
    config.apply_env(|name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = ?path, hosted = config.hosted_project().is_some(), "Logger configuration loaded");
    Ok(config)
}
