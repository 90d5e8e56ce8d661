//! Access tokens for the logging API.
//!
//! # Responsibilities
//! - Use a configured static token when one is given
//! - Otherwise fetch the default service account token from the metadata
//!   server and cache it until shortly before expiry

use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::cloud::types::{CloudError, CloudResult};

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// A fetched token and when to refresh it.
#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Where bearer tokens come from.
#[derive(Debug)]
pub enum TokenSource {
    Static(String),
    Metadata {
        token_url: String,
        cached: Option<CachedToken>,
    },
}

impl TokenSource {
    pub fn new(access_token: Option<String>, metadata_url: &str) -> Self {
        match access_token.filter(|t| !t.is_empty()) {
            Some(token) => TokenSource::Static(token),
            None => TokenSource::Metadata {
                token_url: format!(
                    "{}/instance/service-accounts/default/token",
                    metadata_url.trim_end_matches('/')
                ),
                cached: None,
            },
        }
    }

    /// Current bearer token, fetching a new one when needed.
    pub async fn token(&mut self, http: &reqwest::Client) -> CloudResult<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata { token_url, cached } => {
                if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
                    return Ok(token.value.clone());
                }

                let response = http
                    .get(token_url.as_str())
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CloudError::Auth(format!(
                        "metadata server returned {}: {}",
                        status, body
                    )));
                }
                let fetched: MetadataToken = response.json().await?;
                if fetched.access_token.is_empty() {
                    return Err(CloudError::Auth("metadata server returned an empty token".to_string()));
                }

                let lifetime = Duration::from_secs(fetched.expires_in).saturating_sub(EXPIRY_MARGIN);
                tracing::debug!(expires_in = fetched.expires_in, "Fetched logging access token");
                *cached = Some(CachedToken {
                    value: fetched.access_token.clone(),
                    refresh_at: Instant::now() + lifetime,
                });
                Ok(fetched.access_token)
            }
        }
    }

    /// Forget a cached token, e.g. after the API rejected it.
    pub fn invalidate(&mut self) {
        if let TokenSource::Metadata { cached, .. } = self {
            *cached = None;
        }
    }
}
