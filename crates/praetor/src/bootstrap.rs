//! Wiring configuration, logging and the authorizer together.

use std::sync::Arc;

use praetor_config::{ConfigError, ConfigLoader, PraetorConfig};
use praetor_rbac::{DefaultRuleResolver, RbacAuthorizer, RbacStore};
use praetor_telemetry::TelemetryError;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while starting Praetor.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Build an authorizer over `store` as described by `config`.
///
/// Does not touch global logging state.
pub fn authorizer<S>(config: &PraetorConfig, store: Arc<S>) -> RbacAuthorizer
where
    S: RbacStore + 'static,
{
    let resolver = DefaultRuleResolver::from_store(store);
    RbacAuthorizer::with_config(Arc::new(resolver), config.authorizer.clone())
}

/// Initialize logging from `config`, then build an authorizer over `store`.
///
/// # Errors
///
/// Returns `BootstrapError::Telemetry` if logging cannot be initialized,
/// for instance because a global subscriber is already installed.
pub fn bootstrap<S>(config: &PraetorConfig, store: Arc<S>) -> Result<RbacAuthorizer, BootstrapError>
where
    S: RbacStore + 'static,
{
    praetor_telemetry::init_logging(&config.logging.to_log_config())?;

    let authorizer = authorizer(config, store);
    info!(
        log_denials = config.authorizer.log_denials,
        include_resolution_errors = config.authorizer.include_resolution_errors,
        "RBAC authorizer ready"
    );
    Ok(authorizer)
}

/// Load configuration with the standard layering, then [`bootstrap`].
///
/// Layers: defaults, then `path` if it exists, then `PRAETOR__*`
/// environment variables.
///
/// # Errors
///
/// Returns `BootstrapError` if configuration or logging fails.
pub fn load_and_bootstrap<S>(
    path: impl AsRef<std::path::Path>,
    store: Arc<S>,
) -> Result<(PraetorConfig, RbacAuthorizer), BootstrapError>
where
    S: RbacStore + 'static,
{
    let config = ConfigLoader::new()
        .with_defaults()
        .with_dotenv()?
        .with_optional_file(path)?
        .with_env_prefix(ENV_PREFIX)
        .load()?;
    let authorizer = bootstrap(&config, store)?;
    Ok((config, authorizer))
}

/// Prefix of the environment variables read by [`load_and_bootstrap`].
pub const ENV_PREFIX: &str = "PRAETOR";
