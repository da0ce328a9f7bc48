//! Storage capabilities consumed by the rule resolver.
//!
//! Backends (file, database, in-memory) implement these four traits
//! directly. Implementations must be safe for concurrent reads and should
//! report missing objects with [`RbacError::NotFound`](crate::RbacError::NotFound).

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::RbacResult;
use crate::types::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

/// Looks up namespaced roles.
pub trait RoleGetter: Send + Sync {
    /// Fetch the role `name` in `namespace`.
    fn get_role(&self, ctx: &RequestContext, namespace: &str, name: &str) -> RbacResult<Arc<Role>>;
}

/// Lists role bindings of one namespace.
pub trait RoleBindingLister: Send + Sync {
    /// List every role binding in `namespace`.
    fn list_role_bindings(
        &self,
        ctx: &RequestContext,
        namespace: &str,
    ) -> RbacResult<Vec<Arc<RoleBinding>>>;
}

/// Looks up cluster roles.
pub trait ClusterRoleGetter: Send + Sync {
    /// Fetch the cluster role `name`.
    fn get_cluster_role(&self, ctx: &RequestContext, name: &str) -> RbacResult<Arc<ClusterRole>>;
}

/// Lists cluster role bindings.
pub trait ClusterRoleBindingLister: Send + Sync {
    /// List every cluster role binding.
    fn list_cluster_role_bindings(
        &self,
        ctx: &RequestContext,
    ) -> RbacResult<Vec<Arc<ClusterRoleBinding>>>;
}

/// A backend providing all four capabilities.
///
/// Implemented automatically for any type implementing the four traits.
pub trait RbacStore:
    RoleGetter + RoleBindingLister + ClusterRoleGetter + ClusterRoleBindingLister
{
}

impl<T> RbacStore for T where
    T: RoleGetter + RoleBindingLister + ClusterRoleGetter + ClusterRoleBindingLister
{
}
