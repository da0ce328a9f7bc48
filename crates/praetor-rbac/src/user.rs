//! Authenticated identity as seen by the RBAC core.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Group every authenticated user belongs to.
pub const ALL_AUTHENTICATED: &str = "system:authenticated";

/// Group every unauthenticated request belongs to.
pub const ALL_UNAUTHENTICATED: &str = "system:unauthenticated";

/// Group whose members are cluster administrators.
pub const SYSTEM_PRIVILEGED_GROUP: &str = "system:masters";

/// Identity supplied by the authentication layer.
///
/// Only `name` and `groups` take part in subject matching; `uid` and
/// `extra` are carried for logging and for other authorizers.
///
/// # Example
///
/// ```
/// use praetor_rbac::UserInfo;
///
/// let user = UserInfo::new("alice").with_groups(["dev", "system:authenticated"]);
/// assert!(user.in_group("dev"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User name.
    pub name: String,
    /// Unique identifier, stable across renames.
    #[serde(default)]
    pub uid: String,
    /// Group memberships.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Additional authenticator-provided attributes.
    #[serde(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    /// Create an identity with the given name and no groups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the uid.
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Set the groups.
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Add an extra attribute value.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Whether the user is a member of `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_group() {
        let user = UserInfo::new("bob").with_groups([ALL_AUTHENTICATED, "ops"]);
        assert!(user.in_group("ops"));
        assert!(user.in_group(ALL_AUTHENTICATED));
        assert!(!user.in_group("op"));
    }

    #[test]
    fn test_extra_accumulates() {
        let user = UserInfo::new("bob")
            .with_extra("scopes", "read")
            .with_extra("scopes", "write");
        assert_eq!(user.extra["scopes"], vec!["read", "write"]);
    }

    #[test]
    fn test_display_is_name() {
        assert_eq!(UserInfo::new("carol").with_uid("42").to_string(), "carol");
    }
}
