//! Typed configuration for Praetor.
//!
//! Supports:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use praetor_config::ConfigLoader;
//!
//! # fn main() -> Result<(), praetor_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("praetor.toml")?
//!     .with_env_prefix("PRAETOR")
//!     .load()?;
//!
//! println!("log level: {}", config.logging.level);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "praetor_rbac=debug,info"
//! format = "json"
//! ansi_enabled = false
//! include_location = false
//!
//! [authorizer]
//! log_denials = true
//! include_resolution_errors = false
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `PRAETOR__LOGGING__LEVEL=debug`
//! - `PRAETOR__LOGGING__FORMAT=pretty`
//! - `PRAETOR__AUTHORIZER__LOG_DENIALS=false`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{PraetorConfig, PraetorConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig};
