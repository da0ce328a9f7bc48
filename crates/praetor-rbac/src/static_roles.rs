//! In-memory storage backend.
//!
//! [`StaticRoles`] keeps roles and bindings in plain vectors and implements
//! all four storage capabilities with linear scans. It backs the resolver
//! and authorizer tests and is enough for small deployments whose policy is
//! fixed at startup.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{ObjectKind, RbacError, RbacResult};
use crate::resolver::DefaultRuleResolver;
use crate::storage::{ClusterRoleBindingLister, ClusterRoleGetter, RoleBindingLister, RoleGetter};
use crate::types::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};

/// Fixed set of roles and bindings.
///
/// # Example
///
/// ```
/// use praetor_rbac::{PolicyRule, RequestContext, Role, RoleGetter, StaticRoles};
///
/// let store = StaticRoles::new().with_role(Role::new(
///     "default",
///     "reader",
///     vec![PolicyRule::new(["get"]).with_resources(["pods"])],
/// ));
///
/// let role = store.get_role(&RequestContext::new(), "default", "reader").unwrap();
/// assert_eq!(role.rules.len(), 1);
/// assert!(store.get_role(&RequestContext::new(), "other", "reader").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRoles {
    roles: Vec<Arc<Role>>,
    role_bindings: Vec<Arc<RoleBinding>>,
    cluster_roles: Vec<Arc<ClusterRole>>,
    cluster_role_bindings: Vec<Arc<ClusterRoleBinding>>,
}

impl StaticRoles {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given objects.
    pub fn from_parts(
        roles: Vec<Role>,
        role_bindings: Vec<RoleBinding>,
        cluster_roles: Vec<ClusterRole>,
        cluster_role_bindings: Vec<ClusterRoleBinding>,
    ) -> Self {
        Self {
            roles: roles.into_iter().map(Arc::new).collect(),
            role_bindings: role_bindings.into_iter().map(Arc::new).collect(),
            cluster_roles: cluster_roles.into_iter().map(Arc::new).collect(),
            cluster_role_bindings: cluster_role_bindings.into_iter().map(Arc::new).collect(),
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(Arc::new(role));
        self
    }

    /// Add a role binding.
    pub fn with_role_binding(mut self, binding: RoleBinding) -> Self {
        self.role_bindings.push(Arc::new(binding));
        self
    }

    /// Add a cluster role.
    pub fn with_cluster_role(mut self, role: ClusterRole) -> Self {
        self.cluster_roles.push(Arc::new(role));
        self
    }

    /// Add a cluster role binding.
    pub fn with_cluster_role_binding(mut self, binding: ClusterRoleBinding) -> Self {
        self.cluster_role_bindings.push(Arc::new(binding));
        self
    }
}

impl RoleGetter for StaticRoles {
    fn get_role(
        &self,
        _ctx: &RequestContext,
        namespace: &str,
        name: &str,
    ) -> RbacResult<Arc<Role>> {
        if namespace.is_empty() {
            return Err(RbacError::MissingNamespace {
                operation: "getting role",
            });
        }
        self.roles
            .iter()
            .find(|role| role.namespace == namespace && role.name == name)
            .cloned()
            .ok_or_else(|| RbacError::not_found(ObjectKind::Role, namespace, name))
    }
}

impl RoleBindingLister for StaticRoles {
    fn list_role_bindings(
        &self,
        _ctx: &RequestContext,
        namespace: &str,
    ) -> RbacResult<Vec<Arc<RoleBinding>>> {
        if namespace.is_empty() {
            return Err(RbacError::MissingNamespace {
                operation: "listing role bindings",
            });
        }
        Ok(self
            .role_bindings
            .iter()
            .filter(|binding| binding.namespace == namespace)
            .cloned()
            .collect())
    }
}

impl ClusterRoleGetter for StaticRoles {
    fn get_cluster_role(&self, _ctx: &RequestContext, name: &str) -> RbacResult<Arc<ClusterRole>> {
        self.cluster_roles
            .iter()
            .find(|role| role.name == name)
            .cloned()
            .ok_or_else(|| RbacError::cluster_not_found(ObjectKind::ClusterRole, name))
    }
}

impl ClusterRoleBindingLister for StaticRoles {
    fn list_cluster_role_bindings(
        &self,
        _ctx: &RequestContext,
    ) -> RbacResult<Vec<Arc<ClusterRoleBinding>>> {
        Ok(self.cluster_role_bindings.clone())
    }
}

/// Build a resolver over a fixed set of objects, returning the store too so
/// tests can inspect it.
pub fn new_test_rule_resolver(
    roles: Vec<Role>,
    role_bindings: Vec<RoleBinding>,
    cluster_roles: Vec<ClusterRole>,
    cluster_role_bindings: Vec<ClusterRoleBinding>,
) -> (DefaultRuleResolver, Arc<StaticRoles>) {
    let store = Arc::new(StaticRoles::from_parts(
        roles,
        role_bindings,
        cluster_roles,
        cluster_role_bindings,
    ));
    (DefaultRuleResolver::from_store(store.clone()), store)
}
