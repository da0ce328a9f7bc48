//! Resolution of bindings into policy rules.
//!
//! The resolver walks every cluster role binding, then, when a namespace
//! is given, every role binding of that namespace. For each binding whose
//! subjects include the caller it loads the referenced role and hands each
//! rule to a visitor. The visitor decides whether to keep going.
//!
//! ```text
//!   list ClusterRoleBindings ──► applies? ──► get role ──► visit rules
//!                                                           │
//!   list RoleBindings(ns)   ──► applies? ──► get role ──► visit rules
//! ```
//!
//! Failures never abort resolution. A failed role lookup is delivered to
//! the visitor and the next binding is tried. A failed listing is delivered
//! to the visitor and ends only that listing phase.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::RequestContext;
use crate::error::{AggregateError, RbacError, RbacResult};
use crate::source::RuleSource;
use crate::storage::{
    ClusterRoleBindingLister, ClusterRoleGetter, RbacStore, RoleBindingLister, RoleGetter,
};
use crate::subject::applies_to;
use crate::types::{ClusterRole, PolicyRule, Role, RoleRef, CLUSTER_ROLE_KIND, ROLE_KIND};
use crate::user::UserInfo;

/// One item delivered to a rule visitor.
#[derive(Debug)]
pub enum Visit<'a> {
    /// A rule granted to the caller.
    Rule {
        /// The binding that granted it.
        source: &'a RuleSource<'a>,
        /// The rule itself.
        rule: &'a PolicyRule,
    },
    /// A non-fatal resolution failure.
    Error(RbacError),
}

/// Callback receiving each [`Visit`]. Returning `Break` stops resolution.
pub type RuleVisitor<'v> = dyn for<'a> FnMut(Visit<'a>) -> ControlFlow<()> + 'v;

/// The role a [`RoleRef`] resolved to.
#[derive(Debug, Clone)]
pub enum ReferencedRole {
    /// A namespaced role.
    Role(Arc<Role>),
    /// A cluster role.
    ClusterRole(Arc<ClusterRole>),
}

impl ReferencedRole {
    /// The rules the role grants.
    pub fn rules(&self) -> &[PolicyRule] {
        match self {
            Self::Role(role) => &role.rules,
            Self::ClusterRole(role) => &role.rules,
        }
    }
}

/// Every rule resolved for a caller, with any errors hit on the way.
///
/// A non-`None` `error` means `rules` may be incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRules {
    /// Rules in visitation order.
    pub rules: Vec<PolicyRule>,
    /// Errors collected while resolving.
    pub error: Option<AggregateError>,
}

impl ResolvedRules {
    /// Whether resolution finished without errors.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The rules, or the collected errors if there were any.
    pub fn into_result(self) -> Result<Vec<PolicyRule>, AggregateError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.rules),
        }
    }
}

/// Resolves the rules that apply to a caller.
pub trait AuthorizationRuleResolver: Send + Sync {
    /// Load the rules of the role `role_ref` names.
    ///
    /// `binding_namespace` is used to find namespaced roles and is `""` for
    /// cluster role bindings.
    fn get_role_reference_rules(
        &self,
        ctx: &RequestContext,
        role_ref: &RoleRef,
        binding_namespace: &str,
    ) -> RbacResult<ReferencedRole>;

    /// Visit every rule that applies to `user` in `namespace`.
    ///
    /// Cluster-wide grants are always visited first. Namespaced grants are
    /// only visited when `namespace` is non-empty. Stops as soon as the
    /// visitor breaks.
    fn visit_rules_for(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        namespace: &str,
        visitor: &mut RuleVisitor<'_>,
    );

    /// Collect every rule that applies to `user` in `namespace`.
    ///
    /// Resolution errors are returned alongside the rules that could be
    /// resolved. Callers that only need to know whether something is
    /// allowed should use [`visit_rules_for`](Self::visit_rules_for) and
    /// stop early.
    fn rules_for(&self, ctx: &RequestContext, user: &UserInfo, namespace: &str) -> ResolvedRules {
        let mut rules = Vec::new();
        let mut errors = Vec::new();
        self.visit_rules_for(ctx, user, namespace, &mut |visit| {
            match visit {
                Visit::Rule { rule, .. } => rules.push(rule.clone()),
                Visit::Error(err) => errors.push(err),
            }
            ControlFlow::Continue(())
        });
        ResolvedRules {
            rules,
            error: AggregateError::new(errors),
        }
    }
}

/// Rule resolver over the four storage capabilities.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use praetor_rbac::{
///     AuthorizationRuleResolver, ClusterRole, ClusterRoleBinding, DefaultRuleResolver,
///     PolicyRule, RequestContext, RoleRef, StaticRoles, Subject, UserInfo,
/// };
///
/// let store = StaticRoles::new()
///     .with_cluster_role(ClusterRole::new("viewer", vec![
///         PolicyRule::new(["get"]).with_resources(["pods"]),
///     ]))
///     .with_cluster_role_binding(ClusterRoleBinding::new(
///         "viewers",
///         RoleRef::cluster_role("viewer"),
///         vec![Subject::user("alice")],
///     ));
/// let resolver = DefaultRuleResolver::from_store(Arc::new(store));
///
/// let resolved = resolver.rules_for(&RequestContext::new(), &UserInfo::new("alice"), "");
/// assert_eq!(resolved.rules.len(), 1);
/// assert!(resolved.is_complete());
/// ```
#[derive(Clone)]
pub struct DefaultRuleResolver {
    role_getter: Arc<dyn RoleGetter>,
    role_binding_lister: Arc<dyn RoleBindingLister>,
    cluster_role_getter: Arc<dyn ClusterRoleGetter>,
    cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
}

impl DefaultRuleResolver {
    /// Create a resolver from the four capabilities.
    pub fn new(
        role_getter: Arc<dyn RoleGetter>,
        role_binding_lister: Arc<dyn RoleBindingLister>,
        cluster_role_getter: Arc<dyn ClusterRoleGetter>,
        cluster_role_binding_lister: Arc<dyn ClusterRoleBindingLister>,
    ) -> Self {
        Self {
            role_getter,
            role_binding_lister,
            cluster_role_getter,
            cluster_role_binding_lister,
        }
    }

    /// Create a resolver backed by a single store.
    pub fn from_store<S: RbacStore + 'static>(store: Arc<S>) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    /// Cluster role bindings first, then role bindings of `namespace`.
    fn visit_bindings(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        namespace: &str,
        visitor: &mut RuleVisitor<'_>,
    ) -> ControlFlow<()> {
        self.visit_cluster_role_bindings(ctx, user, visitor)?;
        if namespace.is_empty() {
            return ControlFlow::Continue(());
        }
        self.visit_role_bindings(ctx, user, namespace, visitor)
    }

    fn visit_cluster_role_bindings(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        visitor: &mut RuleVisitor<'_>,
    ) -> ControlFlow<()> {
        let bindings = match self.cluster_role_binding_lister.list_cluster_role_bindings(ctx) {
            Ok(bindings) => bindings,
            Err(err) => {
                debug!(error = %err, "failed to list cluster role bindings");
                return visitor(Visit::Error(err));
            }
        };

        for binding in &bindings {
            let Some(index) = applies_to(user, &binding.subjects, "") else {
                continue;
            };
            trace!(binding = %binding.name, user = %user.name, "cluster role binding applies");

            let role = match self.get_role_reference_rules(ctx, &binding.role_ref, "") {
                Ok(role) => role,
                Err(err) => {
                    visitor(Visit::Error(err))?;
                    continue;
                }
            };

            let source = RuleSource::ClusterRoleBinding {
                binding,
                subject: &binding.subjects[index],
            };
            for rule in role.rules() {
                visitor(Visit::Rule {
                    source: &source,
                    rule,
                })?;
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_role_bindings(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        namespace: &str,
        visitor: &mut RuleVisitor<'_>,
    ) -> ControlFlow<()> {
        let bindings = match self.role_binding_lister.list_role_bindings(ctx, namespace) {
            Ok(bindings) => bindings,
            Err(err) => {
                debug!(error = %err, namespace, "failed to list role bindings");
                return visitor(Visit::Error(err));
            }
        };

        for binding in &bindings {
            let Some(index) = applies_to(user, &binding.subjects, &binding.namespace) else {
                continue;
            };
            trace!(
                binding = %binding.name,
                namespace = %binding.namespace,
                user = %user.name,
                "role binding applies"
            );

            let role = match self.get_role_reference_rules(
                ctx,
                &binding.role_ref,
                &binding.namespace,
            ) {
                Ok(role) => role,
                Err(err) => {
                    visitor(Visit::Error(err))?;
                    continue;
                }
            };

            let source = RuleSource::RoleBinding {
                binding,
                subject: &binding.subjects[index],
            };
            for rule in role.rules() {
                visitor(Visit::Rule {
                    source: &source,
                    rule,
                })?;
            }
        }
        ControlFlow::Continue(())
    }
}

impl AuthorizationRuleResolver for DefaultRuleResolver {
    fn get_role_reference_rules(
        &self,
        ctx: &RequestContext,
        role_ref: &RoleRef,
        binding_namespace: &str,
    ) -> RbacResult<ReferencedRole> {
        match role_ref.kind.as_str() {
            ROLE_KIND => self
                .role_getter
                .get_role(ctx, binding_namespace, &role_ref.name)
                .map(ReferencedRole::Role),
            CLUSTER_ROLE_KIND => self
                .cluster_role_getter
                .get_cluster_role(ctx, &role_ref.name)
                .map(ReferencedRole::ClusterRole),
            other => Err(RbacError::UnsupportedRoleRefKind(other.to_string())),
        }
    }

    fn visit_rules_for(
        &self,
        ctx: &RequestContext,
        user: &UserInfo,
        namespace: &str,
        visitor: &mut RuleVisitor<'_>,
    ) {
        if self.visit_bindings(ctx, user, namespace, visitor).is_break() {
            trace!(user = %user.name, namespace, "rule resolution stopped by visitor");
        }
    }
}

impl fmt::Debug for DefaultRuleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRuleResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_roles::StaticRoles;
    use crate::types::{ClusterRoleBinding, RoleBinding, Subject};

    fn ctx() -> RequestContext {
        RequestContext::new()
    }

    fn fixture() -> DefaultRuleResolver {
        let store = StaticRoles::new()
            .with_cluster_role(ClusterRole::new(
                "viewer",
                vec![
                    PolicyRule::new(["get"]).with_resources(["pods"]),
                    PolicyRule::new(["get"]).with_non_resource_urls(["/healthz"]),
                ],
            ))
            .with_role(Role::new(
                "ns1",
                "editor",
                vec![PolicyRule::new(["update"]).with_resources(["pods"])],
            ))
            .with_cluster_role_binding(ClusterRoleBinding::new(
                "viewers",
                RoleRef::cluster_role("viewer"),
                vec![Subject::group("dev")],
            ))
            .with_role_binding(RoleBinding::new(
                "ns1",
                "editors",
                RoleRef::role("editor"),
                vec![Subject::user("alice")],
            ));
        DefaultRuleResolver::from_store(Arc::new(store))
    }

    fn alice() -> UserInfo {
        UserInfo::new("alice").with_groups(["dev"])
    }

    #[test]
    fn test_get_role_reference_rules_by_kind() {
        let resolver = fixture();
        let role = resolver
            .get_role_reference_rules(&ctx(), &RoleRef::role("editor"), "ns1")
            .unwrap();
        assert!(matches!(role, ReferencedRole::Role(_)));
        assert_eq!(role.rules().len(), 1);

        let cluster = resolver
            .get_role_reference_rules(&ctx(), &RoleRef::cluster_role("viewer"), "ns1")
            .unwrap();
        assert_eq!(cluster.rules().len(), 2);
    }

    #[test]
    fn test_get_role_reference_rules_unsupported_kind() {
        let role_ref = RoleRef {
            kind: "Group".to_string(),
            name: "x".to_string(),
        };
        let err = fixture()
            .get_role_reference_rules(&ctx(), &role_ref, "ns1")
            .unwrap_err();
        assert_eq!(err, RbacError::UnsupportedRoleRefKind("Group".to_string()));
    }

    #[test]
    fn test_get_role_reference_rules_not_found() {
        let err = fixture()
            .get_role_reference_rules(&ctx(), &RoleRef::role("missing"), "ns1")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rules_for_cluster_scope_only() {
        let resolved = fixture().rules_for(&ctx(), &alice(), "");
        assert!(resolved.is_complete());
        assert_eq!(resolved.rules.len(), 2);
    }

    #[test]
    fn test_rules_for_namespace_adds_role_bindings_after_cluster() {
        let resolved = fixture().rules_for(&ctx(), &alice(), "ns1");
        assert_eq!(resolved.rules.len(), 3);
        assert_eq!(resolved.rules[2].verbs, vec!["update"]);
    }

    #[test]
    fn test_rules_for_other_namespace() {
        let resolved = fixture().rules_for(&ctx(), &alice(), "ns2");
        assert_eq!(resolved.rules.len(), 2);
    }

    #[test]
    fn test_visit_reports_sources() {
        let mut sources = Vec::new();
        fixture().visit_rules_for(&ctx(), &alice(), "ns1", &mut |visit| {
            if let Visit::Rule { source, .. } = visit {
                sources.push(source.to_string());
            }
            ControlFlow::Continue(())
        });
        assert_eq!(sources.len(), 3);
        assert!(sources[0].starts_with("ClusterRoleBinding \"viewers\""));
        assert!(sources[2].starts_with("RoleBinding \"ns1/editors\""));
    }

    #[test]
    fn test_visit_stops_on_break() {
        let mut seen = 0;
        fixture().visit_rules_for(&ctx(), &alice(), "ns1", &mut |_| {
            seen += 1;
            ControlFlow::Break(())
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_into_result() {
        let ok = ResolvedRules {
            rules: vec![PolicyRule::new(["get"])],
            error: None,
        };
        assert_eq!(ok.into_result().unwrap().len(), 1);

        let err = ResolvedRules {
            rules: Vec::new(),
            error: AggregateError::new(vec![RbacError::storage("down")]),
        };
        assert!(err.into_result().is_err());
    }
}
