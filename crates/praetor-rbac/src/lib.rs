//! Praetor RBAC - Role-Based Access Control Rule Resolution
//!
//! This crate decides whether a request is allowed by the roles bound to
//! its caller, using the Kubernetes RBAC model: roles hold policy rules,
//! bindings grant a role to users, groups and service accounts, either
//! cluster-wide or within one namespace.
//!
//! # Overview
//!
//! - [`rule`] holds the matching predicates for a single rule
//! - [`subject`] matches binding subjects against a caller
//! - [`DefaultRuleResolver`] walks bindings and visits the granted rules
//! - [`RbacAuthorizer`] turns the visited rules into a [`Decision`]
//! - [`escalation`] stops callers from granting rules they do not hold
//!
//! # Architecture
//!
//! ```text
//!                      ┌────────────────────────────┐
//!                      │   Storage backend          │
//!                      │   (RbacStore)              │
//!                      └──────────┬─────────────────┘
//!                                 │ roles + bindings
//!                      ┌──────────▼─────────────────┐
//!                      │   DefaultRuleResolver      │
//!                      │   (visit rules for user)   │
//!                      └──────────┬─────────────────┘
//!                                 │ (source, rule) | error
//!      Attributes      ┌──────────▼─────────────────┐
//!          │           │   RbacAuthorizer           │
//!          └──────────►│   (first matching rule)    │
//!                      └──────────┬─────────────────┘
//!                                 ▼
//!                      Decision (Allow / NoOpinion) + reason
//! ```
//!
//! Resolution is fail-open: a dangling reference or a storage failure is
//! recorded and resolution carries on with the next binding. The decision
//! is fail-closed: nothing is allowed unless a rule matches.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use praetor_rbac::{
//!     Attributes, Authorizer, Decision, PolicyRule, RbacAuthorizer, RequestContext, Role,
//!     RoleBinding, RoleRef, StaticRoles, Subject, UserInfo,
//! };
//!
//! let store = StaticRoles::new()
//!     .with_role(Role::new("default", "pod-reader", vec![
//!         PolicyRule::new(["get", "list"]).with_resources(["pods"]),
//!     ]))
//!     .with_role_binding(RoleBinding::new(
//!         "default",
//!         "read-pods",
//!         RoleRef::role("pod-reader"),
//!         vec![Subject::user("jane")],
//!     ));
//! let authorizer = RbacAuthorizer::from_store(Arc::new(store));
//!
//! let attrs = Attributes::resource(UserInfo::new("jane"), "list", "pods")
//!     .with_namespace("default");
//! let (decision, _reason) = authorizer.authorize(&RequestContext::new(), &attrs).unwrap();
//! assert_eq!(decision, Decision::Allow);
//!
//! let attrs = Attributes::resource(UserInfo::new("jane"), "delete", "pods")
//!     .with_namespace("default");
//! let (decision, _reason) = authorizer.authorize(&RequestContext::new(), &attrs).unwrap();
//! assert_eq!(decision, Decision::NoOpinion);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
pub mod authorizer;
pub mod config;
pub mod context;
pub mod error;
pub mod escalation;
pub mod resolver;
pub mod rule;
pub mod serviceaccount;
pub mod source;
pub mod static_roles;
pub mod storage;
pub mod subject;
pub mod types;
pub mod user;

// Re-exports for convenience
pub use attributes::{Attributes, Decision};
pub use authorizer::{
    describe_operation, describe_scope, Authorizer, NonResourceRuleInfo, RbacAuthorizer,
    ResourceRuleInfo, RuleResolver, SubjectRules,
};
pub use config::AuthorizerConfig;
pub use context::{RequestContext, RequestId};
pub use error::{AggregateError, ObjectKind, RbacError, RbacResult};
pub use escalation::{breakdown_rule, confirm_no_escalation, covers, rule_covers};
pub use resolver::{
    AuthorizationRuleResolver, DefaultRuleResolver, ReferencedRole, ResolvedRules, RuleVisitor,
    Visit,
};
pub use rule::{rule_allows, rules_allow};
pub use source::RuleSource;
pub use static_roles::{new_test_rule_resolver, StaticRoles};
pub use storage::{
    ClusterRoleBindingLister, ClusterRoleGetter, RbacStore, RoleBindingLister, RoleGetter,
};
pub use subject::{applies_to, applies_to_user};
pub use types::{ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, RoleRef, Subject};
pub use user::UserInfo;
