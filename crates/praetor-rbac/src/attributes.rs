//! The request under evaluation and the decision returned for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::user::UserInfo;

/// Outcome of an authorization check.
///
/// The RBAC authorizer only returns `Allow` or `NoOpinion`. `Deny` exists
/// for other authorizers composed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Explicitly denied.
    Deny,
    /// Allowed by at least one rule.
    Allow,
    /// No rule allows the request.
    NoOpinion,
}

impl Decision {
    /// Whether the request is allowed.
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deny => write!(f, "deny"),
            Self::Allow => write!(f, "allow"),
            Self::NoOpinion => write!(f, "no opinion"),
        }
    }
}

/// A single authorization request.
///
/// Resource requests carry verb, api group, resource, optional subresource,
/// optional name and optional namespace. Non-resource requests carry verb
/// and path.
///
/// # Example
///
/// ```
/// use praetor_rbac::{Attributes, UserInfo};
///
/// let attrs = Attributes::resource(UserInfo::new("alice"), "get", "pods")
///     .with_namespace("default")
///     .with_name("web-0");
/// assert!(attrs.is_resource_request());
/// assert_eq!(attrs.combined_resource(), "pods");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// The requesting identity.
    pub user: UserInfo,
    /// Requested verb.
    pub verb: String,
    /// Target namespace; empty for cluster-scoped requests.
    #[serde(default)]
    pub namespace: String,
    /// Api group of the resource.
    #[serde(default)]
    pub api_group: String,
    /// Resource type.
    #[serde(default)]
    pub resource: String,
    /// Subresource, e.g. `status` or `scale`.
    #[serde(default)]
    pub subresource: String,
    /// Name of the target object.
    #[serde(default)]
    pub name: String,
    /// Whether this is a resource request.
    #[serde(default)]
    pub resource_request: bool,
    /// Request path for non-resource requests.
    #[serde(default)]
    pub path: String,
}

impl Attributes {
    /// A resource request.
    pub fn resource(user: UserInfo, verb: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            user,
            verb: verb.into(),
            resource: resource.into(),
            resource_request: true,
            ..Self::default()
        }
    }

    /// A non-resource request.
    pub fn non_resource(user: UserInfo, verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            user,
            verb: verb.into(),
            path: path.into(),
            resource_request: false,
            ..Self::default()
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the api group.
    pub fn with_api_group(mut self, api_group: impl Into<String>) -> Self {
        self.api_group = api_group.into();
        self
    }

    /// Set the subresource.
    pub fn with_subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = subresource.into();
        self
    }

    /// Set the object name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether rules are matched against resources rather than the path.
    pub fn is_resource_request(&self) -> bool {
        self.resource_request
    }

    /// `resource` or `resource/subresource`.
    pub fn combined_resource(&self) -> String {
        if self.subresource.is_empty() {
            self.resource.clone()
        } else {
            format!("{}/{}", self.resource, self.subresource)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_is_allowed() {
        assert!(Decision::Allow.is_allowed());
        assert!(!Decision::NoOpinion.is_allowed());
        assert!(!Decision::Deny.is_allowed());
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::NoOpinion.to_string(), "no opinion");
    }

    #[test]
    fn test_combined_resource() {
        let attrs = Attributes::resource(UserInfo::new("a"), "update", "deployments")
            .with_subresource("scale");
        assert_eq!(attrs.combined_resource(), "deployments/scale");
    }

    #[test]
    fn test_non_resource_request() {
        let attrs = Attributes::non_resource(UserInfo::new("a"), "get", "/healthz");
        assert!(!attrs.is_resource_request());
        assert_eq!(attrs.path, "/healthz");
        assert!(attrs.resource.is_empty());
    }
}
