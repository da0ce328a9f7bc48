//! Configuration for the RBAC authorizer.

use serde::{Deserialize, Serialize};

/// Configuration for [`RbacAuthorizer`](crate::RbacAuthorizer).
///
/// Neither option changes the decision; they only control what is reported
/// when a request is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizerConfig {
    /// Log a description of every request that was not allowed.
    pub log_denials: bool,
    /// Put resolution errors into the reason of a `NoOpinion` decision.
    ///
    /// When disabled the reason is always empty and errors are only logged.
    pub include_resolution_errors: bool,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            log_denials: true,
            include_resolution_errors: true,
        }
    }
}

impl AuthorizerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable denial logging.
    pub fn with_log_denials(mut self, enabled: bool) -> Self {
        self.log_denials = enabled;
        self
    }

    /// Enable or disable resolution errors in denial reasons.
    pub fn with_include_resolution_errors(mut self, enabled: bool) -> Self {
        self.include_resolution_errors = enabled;
        self
    }

    /// Create a production configuration.
    ///
    /// Denials are logged, but resolution errors stay out of the reason
    /// returned to callers.
    pub fn production() -> Self {
        Self {
            log_denials: true,
            include_resolution_errors: false,
        }
    }

    /// Create a development configuration.
    pub fn development() -> Self {
        Self {
            log_denials: true,
            include_resolution_errors: true,
        }
    }
}
