//! # Praetor
//!
//! **RBAC rule resolution and authorization engine**
//!
//! Praetor answers one question: may this caller perform this action? It
//! follows the Kubernetes RBAC model of roles, cluster roles and their
//! bindings, and reads them through four small storage traits so any
//! backend can supply them.
//!
//! - [`rbac`] holds the data model, resolver, authorizer and escalation check
//! - [`config`] loads layered TOML/JSON/environment configuration
//! - [`telemetry`] sets up structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use praetor::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(StaticRoles::new());
//! let (_config, authorizer) = praetor::load_and_bootstrap("praetor.toml", store)?;
//!
//! let attrs =
//!     Attributes::resource(UserInfo::new("jane"), "get", "pods").with_namespace("default");
//! let (decision, reason) = authorizer.authorize(&RequestContext::new(), &attrs)?;
//! println!("{decision}: {reason}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! PraetorConfig ──► init_logging
//!       │
//!       └──► RbacAuthorizer ──► DefaultRuleResolver ──► RbacStore
//!                  │
//! Attributes ──────┴──► (Decision, reason)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bootstrap;

// Re-export RBAC types
pub use praetor_rbac as rbac;

// Re-export configuration types
pub use praetor_config as config;

// Re-export telemetry types
pub use praetor_telemetry as telemetry;

pub use bootstrap::{authorizer, bootstrap, load_and_bootstrap, BootstrapError, ENV_PREFIX};

/// Prelude module for convenient imports.
///
/// ```rust
/// use praetor::prelude::*;
/// ```
pub mod prelude {
    pub use praetor_rbac::{
        Attributes, AuthorizationRuleResolver, Authorizer, AuthorizerConfig, ClusterRole,
        ClusterRoleBinding, Decision, DefaultRuleResolver, PolicyRule, RbacAuthorizer, RbacError,
        RbacResult, RbacStore, RequestContext, Role, RoleBinding, RoleRef, RuleResolver,
        StaticRoles, Subject, UserInfo,
    };

    pub use praetor_config::{ConfigLoader, PraetorConfig};

    pub use crate::BootstrapError;
}
