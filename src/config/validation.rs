//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, batch size > 0)
//! - Check log ids and URLs the hosted API would reject
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggerConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use url::Url;

use crate::config::schema::LoggerConfig;

/// Longest log id the hosted API accepts.
const MAX_LOG_ID_LEN: usize = 512;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.log_id.is_empty() {
        errors.push(ValidationError::new("log_id", "must not be empty"));
    } else if config.log_id.len() > MAX_LOG_ID_LEN {
        errors.push(ValidationError::new("log_id", format!("longer than {} characters", MAX_LOG_ID_LEN)));
    } else if !config
        .log_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'))
    {
        errors.push(ValidationError::new(
            "log_id",
            format!("'{}' may only contain letters, digits, '/', '_', '-' and '.'", config.log_id),
        ));
    }

    if config.cloud.batch_size == 0 {
        errors.push(ValidationError::new("cloud.batch_size", "must be greater than 0"));
    }
    if config.cloud.request_timeout_secs == 0 {
        errors.push(ValidationError::new("cloud.request_timeout_secs", "must be greater than 0"));
    }
    for (field, value) in [
        ("cloud.endpoint", &config.cloud.endpoint),
        ("cloud.metadata_url", &config.cloud.metadata_url),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError::new(field, format!("'{}' is not a valid URL: {}", value, e)));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
