//! Top-level configuration.

use praetor_rbac::AuthorizerConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig};

/// Complete Praetor configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use praetor_config::PraetorConfig;
///
/// let config = PraetorConfig::default();
/// assert!(config.authorizer.log_denials);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PraetorConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Authorizer configuration.
    #[serde(default)]
    pub authorizer: AuthorizerConfig,
}

impl PraetorConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PraetorConfigBuilder {
        PraetorConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the log level is not a valid
    /// filter directive string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled {
            praetor_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }
        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging with resolution errors in denial reasons.
    ///
    /// ```
    /// use praetor_config::PraetorConfig;
    ///
    /// let config = PraetorConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
            },
            authorizer: AuthorizerConfig::development(),
        }
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logging; resolution errors are logged but not returned.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig::default(),
            authorizer: AuthorizerConfig::production(),
        }
    }
}

/// Builder for [`PraetorConfig`].
#[derive(Debug, Default)]
pub struct PraetorConfigBuilder {
    logging: Option<LoggingConfig>,
    authorizer: Option<AuthorizerConfig>,
}

impl PraetorConfigBuilder {
    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Set the authorizer configuration.
    #[must_use]
    pub fn authorizer(mut self, config: AuthorizerConfig) -> Self {
        self.authorizer = Some(config);
        self
    }

    /// Build the configuration, using defaults for unset sections.
    #[must_use]
    pub fn build(self) -> PraetorConfig {
        PraetorConfig {
            logging: self.logging.unwrap_or_default(),
            authorizer: self.authorizer.unwrap_or_default(),
        }
    }
}
