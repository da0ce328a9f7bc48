//! RBAC object model.
//!
//! These are read-only snapshots handed to the core by storage backends.
//! Field names serialize in the camelCase form used by RBAC manifests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard accepted in verbs, api groups, resources and non-resource URLs.
pub const WILDCARD: &str = "*";

/// `RoleRef` kind for a namespaced role.
pub const ROLE_KIND: &str = "Role";

/// `RoleRef` kind for a cluster role.
pub const CLUSTER_ROLE_KIND: &str = "ClusterRole";

/// Subject kind for a user.
pub const USER_KIND: &str = "User";

/// Subject kind for a group.
pub const GROUP_KIND: &str = "Group";

/// Subject kind for a service account.
pub const SERVICE_ACCOUNT_KIND: &str = "ServiceAccount";

/// An atomic permission grant over verbs and either resources or
/// non-resource URLs.
///
/// A rule with neither `resources` nor `non_resource_urls` grants nothing.
/// An empty `api_groups` list leaves the api group unrestricted.
///
/// # Example
///
/// ```
/// use praetor_rbac::PolicyRule;
///
/// let rule = PolicyRule::new(["get", "list"]).with_resources(["pods"]);
/// assert_eq!(rule.verbs, vec!["get", "list"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// Allowed verbs.
    #[serde(default)]
    pub verbs: Vec<String>,
    /// Api groups the resources belong to.
    #[serde(default)]
    pub api_groups: Vec<String>,
    /// Resources, optionally `resource/subresource` or `*/subresource`.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Names the rule is restricted to; empty means any name.
    #[serde(default)]
    pub resource_names: Vec<String>,
    /// Non-resource paths, optionally ending in `*`.
    #[serde(default, rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

fn strings<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl PolicyRule {
    /// Create a rule granting the given verbs.
    pub fn new<I>(verbs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            verbs: strings(verbs),
            ..Self::default()
        }
    }

    /// Set the api groups.
    pub fn with_api_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.api_groups = strings(groups);
        self
    }

    /// Set the resources.
    pub fn with_resources<I>(mut self, resources: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.resources = strings(resources);
        self
    }

    /// Set the resource names.
    pub fn with_resource_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.resource_names = strings(names);
        self
    }

    /// Set the non-resource URLs.
    pub fn with_non_resource_urls<I>(mut self, urls: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.non_resource_urls = strings(urls);
        self
    }
}

impl fmt::Display for PolicyRule {
    // Compact form used in escalation messages, omitting empty fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("APIGroups", &self.api_groups),
            ("Resources", &self.resources),
            ("ResourceNames", &self.resource_names),
            ("NonResourceURLs", &self.non_resource_urls),
            ("Verbs", &self.verbs),
        ];
        write!(f, "{{")?;
        let mut first = true;
        for (label, values) in fields {
            if values.is_empty() {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{label}:{values:?}")?;
        }
        write!(f, "}}")
    }
}

/// A namespaced set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Namespace the role lives in.
    pub namespace: String,
    /// Role name.
    pub name: String,
    /// Rules granted by the role.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl Role {
    /// Create a role.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        rules: Vec<PolicyRule>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            rules,
        }
    }
}

/// A cluster-scoped set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRole {
    /// Cluster role name.
    pub name: String,
    /// Rules granted by the cluster role.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl ClusterRole {
    /// Create a cluster role.
    pub fn new(name: impl Into<String>, rules: Vec<PolicyRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

/// A principal a binding grants to.
///
/// `kind` is one of [`USER_KIND`], [`GROUP_KIND`] or
/// [`SERVICE_ACCOUNT_KIND`]. Any other kind never matches. `namespace` is
/// only meaningful for service accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Subject kind.
    pub kind: String,
    /// Subject name.
    pub name: String,
    /// Service account namespace.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl Subject {
    /// A user subject.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: USER_KIND.to_string(),
            name: name.into(),
            namespace: String::new(),
        }
    }

    /// A group subject.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: GROUP_KIND.to_string(),
            name: name.into(),
            namespace: String::new(),
        }
    }

    /// A service account subject. Pass an empty namespace to default to
    /// the namespace of the enclosing role binding.
    pub fn service_account(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SERVICE_ACCOUNT_KIND.to_string(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Human-readable description used in allow reasons.
    ///
    /// Service accounts are rendered as `namespace/name`, falling back to
    /// `binding_namespace` when the subject carries no namespace.
    pub fn describe(&self, binding_namespace: &str) -> String {
        if self.kind == SERVICE_ACCOUNT_KIND {
            let ns = if self.namespace.is_empty() {
                binding_namespace
            } else {
                &self.namespace
            };
            format!("{} \"{}/{}\"", self.kind, ns, self.name)
        } else {
            format!("{} \"{}\"", self.kind, self.name)
        }
    }
}

/// Identifies the role a binding grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    /// [`ROLE_KIND`] or [`CLUSTER_ROLE_KIND`].
    pub kind: String,
    /// Name of the referenced role.
    pub name: String,
}

impl RoleRef {
    /// Reference a namespaced role.
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            kind: ROLE_KIND.to_string(),
            name: name.into(),
        }
    }

    /// Reference a cluster role.
    pub fn cluster_role(name: impl Into<String>) -> Self {
        Self {
            kind: CLUSTER_ROLE_KIND.to_string(),
            name: name.into(),
        }
    }
}

/// Grants a role's rules to subjects within one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    /// Namespace the binding lives in.
    pub namespace: String,
    /// Binding name.
    pub name: String,
    /// The granted role.
    pub role_ref: RoleRef,
    /// Subjects receiving the grant.
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl RoleBinding {
    /// Create a role binding.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        role_ref: RoleRef,
        subjects: Vec<Subject>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            role_ref,
            subjects,
        }
    }
}

/// Grants a role's rules to subjects cluster-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBinding {
    /// Binding name.
    pub name: String,
    /// The granted role.
    pub role_ref: RoleRef,
    /// Subjects receiving the grant.
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl ClusterRoleBinding {
    /// Create a cluster role binding.
    pub fn new(name: impl Into<String>, role_ref: RoleRef, subjects: Vec<Subject>) -> Self {
        Self {
            name: name.into(),
            role_ref,
            subjects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder() {
        let rule = PolicyRule::new(["get"])
            .with_api_groups(["apps"])
            .with_resources(["deployments"])
            .with_resource_names(["web"]);
        assert_eq!(rule.verbs, vec!["get"]);
        assert_eq!(rule.api_groups, vec!["apps"]);
        assert_eq!(rule.resources, vec!["deployments"]);
        assert_eq!(rule.resource_names, vec!["web"]);
        assert!(rule.non_resource_urls.is_empty());
    }

    #[test]
    fn test_rule_display_skips_empty_fields() {
        let rule = PolicyRule::new(["get"]).with_non_resource_urls(["/healthz"]);
        assert_eq!(
            rule.to_string(),
            r#"{NonResourceURLs:["/healthz"], Verbs:["get"]}"#
        );
    }

    #[test]
    fn test_subject_describe() {
        assert_eq!(Subject::user("alice").describe(""), r#"User "alice""#);
        assert_eq!(Subject::group("dev").describe("ns"), r#"Group "dev""#);
        assert_eq!(
            Subject::service_account("", "builder").describe("ci"),
            r#"ServiceAccount "ci/builder""#
        );
        assert_eq!(
            Subject::service_account("kube-system", "builder").describe("ci"),
            r#"ServiceAccount "kube-system/builder""#
        );
    }

    #[test]
    fn test_rule_deserializes_manifest_field_names() {
        let json = r#"{
            "verbs": ["get"],
            "apiGroups": [""],
            "resources": ["pods"],
            "resourceNames": ["mypod"]
        }"#;
        let rule: PolicyRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.api_groups, vec![""]);
        assert_eq!(rule.resource_names, vec!["mypod"]);

        let json = r#"{"verbs": ["get"], "nonResourceURLs": ["/api/*"]}"#;
        let rule: PolicyRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.non_resource_urls, vec!["/api/*"]);
    }

    #[test]
    fn test_binding_deserializes() {
        let json = r#"{
            "namespace": "projectX",
            "name": "devs",
            "roleRef": {"kind": "Role", "name": "dev-role"},
            "subjects": [{"kind": "Group", "name": "dev"}]
        }"#;
        let binding: RoleBinding = serde_json::from_str(json).unwrap();
        assert_eq!(binding.role_ref, RoleRef::role("dev-role"));
        assert_eq!(binding.subjects, vec![Subject::group("dev")]);
    }
}
