//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::cloud::MonitoredResource;

/// Root configuration for request loggers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Hosted project id. Present and non-empty selects the hosted backend.
    pub project_id: Option<String>,

    /// Name of the log stream entries are written to.
    pub log_id: String,

    /// Hosted backend settings.
    pub cloud: CloudConfig,

    /// Local fallback settings.
    pub local: LocalConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            log_id: "request".to_string(),
            cloud: CloudConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Project id if the hosted backend should be used.
    pub fn hosted_project(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// Hosted backend (Cloud Logging) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudConfig {
    /// API base URL.
    pub endpoint: String,

    /// Metadata server base URL, used for access tokens.
    pub metadata_url: String,

    /// Fixed bearer token; skips the metadata server when set.
    pub access_token: Option<String>,

    /// Timeout for each API call in seconds.
    pub request_timeout_secs: u64,

    /// Maximum entries per write call.
    pub batch_size: usize,

    /// Monitored resource; detected from the environment when absent.
    pub resource: Option<MonitoredResource>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://logging.googleapis.com".to_string(),
            metadata_url: "http://metadata.google.internal/computeMetadata/v1".to_string(),
            access_token: None,
            request_timeout_secs: 10,
            batch_size: 100,
            resource: None,
        }
    }
}

/// Local stderr output configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Prefix lines with date and time.
    pub timestamps: bool,

    /// Use UTC instead of local time.
    pub utc: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            timestamps: true,
            utc: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.log_id, "request");
        assert!(config.hosted_project().is_none());
        assert_eq!(config.cloud.batch_size, 100);
        assert!(config.local.timestamps);
    }

    #[test]
    fn test_empty_project_is_not_hosted() {
        let config = LoggerConfig {
            project_id: Some(String::new()),
            ..LoggerConfig::default()
        };
        assert!(config.hosted_project().is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: LoggerConfig = toml::from_str(
            r#"
            project_id = "my-proj"

            [cloud]
            batch_size = 20

            [cloud.resource]
            type = "gce_instance"
            labels = { instance_id = "42" }
            "#,
        )
        .unwrap();
        assert_eq!(config.hosted_project(), Some("my-proj"));
        assert_eq!(config.log_id, "request");
        assert_eq!(config.cloud.batch_size, 20);
        assert_eq!(config.cloud.request_timeout_secs, 10);
        assert_eq!(config.cloud.resource.unwrap().labels["instance_id"], "42");
    }
}
