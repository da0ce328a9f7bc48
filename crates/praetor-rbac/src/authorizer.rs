//! Authorization decisions.
//!
//! [`RbacAuthorizer`] answers whether a request is allowed by any rule
//! granted to the caller. It only ever answers [`Decision::Allow`] or
//! [`Decision::NoOpinion`]; denying is left to other authorizers composed
//! alongside it.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::attributes::{Attributes, Decision};
use crate::config::AuthorizerConfig;
use crate::context::RequestContext;
use crate::error::{AggregateError, RbacError, RbacResult};
use crate::resolver::{AuthorizationRuleResolver, DefaultRuleResolver, Visit};
use crate::rule::rule_allows;
use crate::storage::RbacStore;
use crate::user::UserInfo;

/// Decides whether a request is allowed.
pub trait Authorizer: Send + Sync {
    /// Decide on `attrs`, returning the decision and a reason.
    ///
    /// Resolution failures are reported in the reason, never as `Err`.
    fn authorize(&self, ctx: &RequestContext, attrs: &Attributes) -> RbacResult<(Decision, String)>;
}

/// Lists the rules a caller holds, for "can I" style introspection.
pub trait RuleResolver: Send + Sync {
    /// Every rule that applies to `user` in `namespace`, split by shape.
    fn rules_for(&self, ctx: &RequestContext, user: &UserInfo, namespace: &str) -> SubjectRules;
}

/// A resource rule as reported by [`RuleResolver::rules_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRuleInfo {
    /// Allowed verbs.
    pub verbs: Vec<String>,
    /// Api groups.
    pub api_groups: Vec<String>,
    /// Resources.
    pub resources: Vec<String>,
    /// Resource names.
    pub resource_names: Vec<String>,
}

/// A non-resource rule as reported by [`RuleResolver::rules_for`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonResourceRuleInfo {
    /// Allowed verbs.
    pub verbs: Vec<String>,
    /// Non-resource URLs.
    #[serde(rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

/// The rules a caller holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRules {
    /// Rules over resources.
    pub resource_rules: Vec<ResourceRuleInfo>,
    /// Rules over non-resource URLs.
    pub non_resource_rules: Vec<NonResourceRuleInfo>,
    /// True when resolution failed somewhere and the lists may be short.
    pub incomplete: bool,
    /// The failures hit while resolving.
    pub evaluation_error: Option<AggregateError>,
}

/// RBAC authorizer over a rule resolver.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use praetor_rbac::{
///     Attributes, Authorizer, ClusterRole, ClusterRoleBinding, Decision, PolicyRule,
///     RbacAuthorizer, RequestContext, RoleRef, StaticRoles, Subject, UserInfo,
/// };
///
/// let store = StaticRoles::new()
///     .with_cluster_role(ClusterRole::new("health", vec![
///         PolicyRule::new(["get"]).with_non_resource_urls(["/healthz"]),
///     ]))
///     .with_cluster_role_binding(ClusterRoleBinding::new(
///         "health",
///         RoleRef::cluster_role("health"),
///         vec![Subject::group("system:authenticated")],
///     ));
/// let authorizer = RbacAuthorizer::from_store(Arc::new(store));
///
/// let user = UserInfo::new("alice").with_groups(["system:authenticated"]);
/// let attrs = Attributes::non_resource(user, "get", "/healthz");
/// let (decision, reason) = authorizer.authorize(&RequestContext::new(), &attrs).unwrap();
/// assert_eq!(decision, Decision::Allow);
/// assert!(reason.starts_with("RBAC: allowed by ClusterRoleBinding \"health\""));
/// ```
#[derive(Clone)]
pub struct RbacAuthorizer {
    resolver: Arc<dyn AuthorizationRuleResolver>,
    config: AuthorizerConfig,
}

impl RbacAuthorizer {
    /// Create an authorizer with default configuration.
    pub fn new(resolver: Arc<dyn AuthorizationRuleResolver>) -> Self {
        Self::with_config(resolver, AuthorizerConfig::default())
    }

    /// Create an authorizer with the given configuration.
    pub fn with_config(
        resolver: Arc<dyn AuthorizationRuleResolver>,
        config: AuthorizerConfig,
    ) -> Self {
        Self { resolver, config }
    }

    /// Create an authorizer resolving rules from a single store.
    pub fn from_store<S: RbacStore + 'static>(store: Arc<S>) -> Self {
        Self::new(Arc::new(DefaultRuleResolver::from_store(store)))
    }

    /// The active configuration.
    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    /// The underlying rule resolver.
    pub fn resolver(&self) -> &Arc<dyn AuthorizationRuleResolver> {
        &self.resolver
    }
}

impl Authorizer for RbacAuthorizer {
    #[instrument(
        name = "rbac.authorize",
        skip(self, ctx, attrs),
        fields(
            request_id = %ctx.request_id(),
            verb = %attrs.verb,
            namespace = %attrs.namespace,
        )
    )]
    fn authorize(
        &self,
        ctx: &RequestContext,
        attrs: &Attributes,
    ) -> RbacResult<(Decision, String)> {
        let mut visitor = AuthorizingVisitor::new(attrs);
        self.resolver
            .visit_rules_for(ctx, &attrs.user, &attrs.namespace, &mut |visit| visitor.visit(visit));

        if visitor.allowed {
            debug!(user = %attrs.user.name, reason = %visitor.reason, "request allowed");
            return Ok((Decision::Allow, visitor.reason));
        }

        let errors = AggregateError::new(visitor.errors);
        if self.config.log_denials {
            debug!(
                user = %attrs.user.name,
                groups = ?attrs.user.groups,
                operation = %describe_operation(attrs),
                scope = %describe_scope(attrs),
                resolution_errors = errors.as_ref().map_or(0, AggregateError::len),
                "RBAC: no rule allows the request"
            );
        }
        if let Some(errors) = &errors {
            debug!(error = %errors, "rule resolution was incomplete");
        }

        let reason = match errors {
            Some(errors) if self.config.include_resolution_errors => format!("RBAC: {errors}"),
            _ => String::new(),
        };
        Ok((Decision::NoOpinion, reason))
    }
}

impl RuleResolver for RbacAuthorizer {
    fn rules_for(&self, ctx: &RequestContext, user: &UserInfo, namespace: &str) -> SubjectRules {
        let resolved = self.resolver.rules_for(ctx, user, namespace);

        let mut subject_rules = SubjectRules {
            incomplete: resolved.error.is_some(),
            evaluation_error: resolved.error,
            ..SubjectRules::default()
        };
        for rule in resolved.rules {
            if !rule.resources.is_empty() {
                subject_rules.resource_rules.push(ResourceRuleInfo {
                    verbs: rule.verbs.clone(),
                    api_groups: rule.api_groups.clone(),
                    resources: rule.resources.clone(),
                    resource_names: rule.resource_names.clone(),
                });
            }
            if !rule.non_resource_urls.is_empty() {
                subject_rules.non_resource_rules.push(NonResourceRuleInfo {
                    verbs: rule.verbs,
                    non_resource_urls: rule.non_resource_urls,
                });
            }
        }
        subject_rules
    }
}

impl fmt::Debug for RbacAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbacAuthorizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Visitor that stops at the first rule allowing the request.
struct AuthorizingVisitor<'r> {
    attrs: &'r Attributes,
    allowed: bool,
    reason: String,
    errors: Vec<RbacError>,
}

impl<'r> AuthorizingVisitor<'r> {
    fn new(attrs: &'r Attributes) -> Self {
        Self {
            attrs,
            allowed: false,
            reason: String::new(),
            errors: Vec::new(),
        }
    }

    fn visit(&mut self, visit: Visit<'_>) -> ControlFlow<()> {
        match visit {
            Visit::Rule { source, rule } if rule_allows(self.attrs, rule) => {
                self.allowed = true;
                self.reason = format!("RBAC: allowed by {source}");
                ControlFlow::Break(())
            }
            Visit::Rule { .. } => ControlFlow::Continue(()),
            Visit::Error(err) => {
                trace!(error = %err, "rule resolution error");
                self.errors.push(err);
                ControlFlow::Continue(())
            }
        }
    }
}

/// Describe what `attrs` asks to do, e.g. `get resource "pods/log" named "web"`.
pub fn describe_operation(attrs: &Attributes) -> String {
    if !attrs.is_resource_request() {
        return format!("{} nonResourceURL \"{}\"", attrs.verb, attrs.path);
    }

    let mut resource = attrs.resource.clone();
    if !attrs.api_group.is_empty() {
        resource.push('.');
        resource.push_str(&attrs.api_group);
    }
    if !attrs.subresource.is_empty() {
        resource.push('/');
        resource.push_str(&attrs.subresource);
    }

    if attrs.name.is_empty() {
        format!("{} resource \"{resource}\"", attrs.verb)
    } else {
        format!("{} resource \"{resource}\" named \"{}\"", attrs.verb, attrs.name)
    }
}

/// Describe where `attrs` applies: `in namespace "<ns>"` or `cluster-wide`.
pub fn describe_scope(attrs: &Attributes) -> String {
    if attrs.namespace.is_empty() {
        "cluster-wide".to_string()
    } else {
        format!("in namespace \"{}\"", attrs.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_roles::StaticRoles;
    use crate::types::{
        ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject,
    };

    fn ctx() -> RequestContext {
        RequestContext::new()
    }

    fn authorizer(store: StaticRoles) -> RbacAuthorizer {
        RbacAuthorizer::from_store(Arc::new(store))
    }

    fn bob() -> UserInfo {
        UserInfo::new("bob").with_groups(["dev"])
    }

    #[test]
    fn test_allow_reason_names_binding() {
        let store = StaticRoles::new()
            .with_role(Role::new(
                "ns1",
                "pod-reader",
                vec![PolicyRule::new(["get"]).with_resources(["pods"])],
            ))
            .with_role_binding(RoleBinding::new(
                "ns1",
                "read-pods",
                RoleRef::role("pod-reader"),
                vec![Subject::group("dev")],
            ));
        let attrs = Attributes::resource(bob(), "get", "pods").with_namespace("ns1");

        let (decision, reason) = authorizer(store).authorize(&ctx(), &attrs).unwrap();
        assert_eq!(decision, Decision::Allow);
        assert_eq!(
            reason,
            r#"RBAC: allowed by RoleBinding "ns1/read-pods" of Role "pod-reader" to Group "dev""#
        );
    }

    #[test]
    fn test_no_rules_is_no_opinion_with_empty_reason() {
        let attrs = Attributes::resource(bob(), "get", "pods").with_namespace("ns1");
        let (decision, reason) = authorizer(StaticRoles::new()).authorize(&ctx(), &attrs).unwrap();
        assert_eq!(decision, Decision::NoOpinion);
        assert_eq!(reason, "");
    }

    #[test]
    fn test_resolution_error_in_reason() {
        let store = StaticRoles::new().with_cluster_role_binding(ClusterRoleBinding::new(
            "dangling",
            RoleRef::cluster_role("gone"),
            vec![Subject::user("bob")],
        ));
        let attrs = Attributes::resource(bob(), "get", "pods");

        let (decision, reason) = authorizer(store.clone()).authorize(&ctx(), &attrs).unwrap();
        assert_eq!(decision, Decision::NoOpinion);
        assert_eq!(reason, "RBAC: clusterrole \"gone\" not found");

        let quiet = RbacAuthorizer::with_config(
            Arc::new(DefaultRuleResolver::from_store(Arc::new(store))),
            AuthorizerConfig::production(),
        );
        let (decision, reason) = quiet.authorize(&ctx(), &attrs).unwrap();
        assert_eq!(decision, Decision::NoOpinion);
        assert_eq!(reason, "");
    }

    #[test]
    fn test_rules_for_partitions_rules() {
        let store = StaticRoles::new()
            .with_cluster_role(ClusterRole::new(
                "mixed",
                vec![
                    PolicyRule::new(["get"])
                        .with_api_groups(["apps"])
                        .with_resources(["deployments"])
                        .with_resource_names(["web"]),
                    PolicyRule::new(["get"]).with_non_resource_urls(["/metrics"]),
                    PolicyRule::new(["get"]),
                ],
            ))
            .with_cluster_role_binding(ClusterRoleBinding::new(
                "mixed",
                RoleRef::cluster_role("mixed"),
                vec![Subject::user("bob")],
            ));

        let rules = authorizer(store).rules_for(&ctx(), &bob(), "");
        assert!(!rules.incomplete);
        assert!(rules.evaluation_error.is_none());
        assert_eq!(
            rules.resource_rules,
            vec![ResourceRuleInfo {
                verbs: vec!["get".to_string()],
                api_groups: vec!["apps".to_string()],
                resources: vec!["deployments".to_string()],
                resource_names: vec!["web".to_string()],
            }]
        );
        assert_eq!(
            rules.non_resource_rules,
            vec![NonResourceRuleInfo {
                verbs: vec!["get".to_string()],
                non_resource_urls: vec!["/metrics".to_string()],
            }]
        );
    }

    #[test]
    fn test_rules_for_reports_incomplete() {
        let store = StaticRoles::new().with_role_binding(RoleBinding::new(
            "ns1",
            "dangling",
            RoleRef::role("gone"),
            vec![Subject::user("bob")],
        ));
        let rules = authorizer(store).rules_for(&ctx(), &bob(), "ns1");
        assert!(rules.incomplete);
        assert_eq!(rules.evaluation_error.map(|e| e.len()), Some(1));
        assert!(rules.resource_rules.is_empty());
    }

    #[test]
    fn test_describe_operation_resource() {
        let attrs = Attributes::resource(bob(), "get", "deployments")
            .with_api_group("apps")
            .with_subresource("scale")
            .with_name("web");
        assert_eq!(
            describe_operation(&attrs),
            r#"get resource "deployments.apps/scale" named "web""#
        );

        let unnamed = Attributes::resource(bob(), "list", "pods");
        assert_eq!(describe_operation(&unnamed), r#"list resource "pods""#);
    }

    #[test]
    fn test_describe_operation_non_resource() {
        let attrs = Attributes::non_resource(bob(), "get", "/healthz");
        assert_eq!(describe_operation(&attrs), r#"get nonResourceURL "/healthz""#);
    }

    #[test]
    fn test_describe_scope() {
        let attrs = Attributes::resource(bob(), "get", "pods");
        assert_eq!(describe_scope(&attrs), "cluster-wide");
        assert_eq!(
            describe_scope(&attrs.with_namespace("ns1")),
            r#"in namespace "ns1""#
        );
    }
}
