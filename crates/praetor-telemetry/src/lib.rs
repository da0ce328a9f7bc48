//! Structured logging for Praetor.
//!
//! Authorization decisions are reported through `tracing` events and spans.
//! This crate installs the subscriber that turns them into log lines:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  praetor-rbac                │
//! │  (rbac.authorize span,       │
//! │   debug!/trace! events)      │
//! └──────────────┬───────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐      ┌──────────┐
//! │  EnvFilter ─► fmt layer      │ ───► │ stdout   │
//! │  (JSON or pretty)            │      └──────────┘
//! └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use praetor_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development().with_level("praetor_rbac=debug,info"))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
