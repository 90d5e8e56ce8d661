//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overlay: GOOGLE_CLOUD_PROJECT, runtime vars)
//!     → validation.rs (semantic checks)
//!     → LoggerConfig (validated, immutable)
//!     → shared via Arc with the request middleware
//! ```
//!
//! # Design Decisions
//! - Backend selection is fixed when a logger is built; config is never reloaded
//! - All fields have defaults so an empty file (or no file) is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, PROJECT_ENV};
pub use schema::{CloudConfig, LocalConfig, LoggerConfig};
pub use validation::{validate_config, ValidationError};
