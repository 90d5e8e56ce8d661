//! Monitored resource detection.
//!
//! Cloud Logging files every entry under a monitored resource. The managed
//! runtimes announce themselves through environment variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The `resource` object of a write request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl MonitoredResource {
    pub fn global(project_id: &str) -> Self {
        Self::with_labels("global", [("project_id", project_id)])
    }

    fn with_labels<'a>(kind: &str, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            kind: kind.to_string(),
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Pick the resource for the runtime described by `lookup`.
    ///
    /// App Engine sets `GAE_SERVICE`, Cloud Run sets `K_SERVICE`; anything
    /// else is filed as `global`.
    pub fn detect<F>(lookup: F, project_id: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty()).unwrap_or_default();

        if let Some(service) = lookup("GAE_SERVICE").filter(|v| !v.is_empty()) {
            let version = var("GAE_VERSION");
            return Self::with_labels(
                "gae_app",
                [
                    ("project_id", project_id),
                    ("module_id", service.as_str()),
                    ("version_id", version.as_str()),
                ],
            );
        }

        if let Some(service) = lookup("K_SERVICE").filter(|v| !v.is_empty()) {
            let revision = var("K_REVISION");
            let configuration = var("K_CONFIGURATION");
            return Self::with_labels(
                "cloud_run_revision",
                [
                    ("project_id", project_id),
                    ("service_name", service.as_str()),
                    ("revision_name", revision.as_str()),
                    ("configuration_name", configuration.as_str()),
                ],
            );
        }

        Self::global(project_id)
    }
}
