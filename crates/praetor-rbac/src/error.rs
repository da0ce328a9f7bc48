//! Error types for RBAC resolution and authorization.

use std::fmt;

use thiserror::Error;

use crate::types::PolicyRule;

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

/// The kind of RBAC object a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A namespaced `Role`.
    Role,
    /// A cluster-scoped `ClusterRole`.
    ClusterRole,
    /// A namespaced `RoleBinding`.
    RoleBinding,
    /// A cluster-scoped `ClusterRoleBinding`.
    ClusterRoleBinding,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role => write!(f, "role"),
            Self::ClusterRole => write!(f, "clusterrole"),
            Self::RoleBinding => write!(f, "rolebinding"),
            Self::ClusterRoleBinding => write!(f, "clusterrolebinding"),
        }
    }
}

/// Errors produced while resolving RBAC rules.
///
/// Storage backends report missing objects with [`RbacError::NotFound`] so
/// callers can tell a dangling reference apart from a backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RbacError {
    /// A referenced object does not exist.
    #[error("{kind} \"{}\" not found", qualified_name(.namespace.as_deref(), .name))]
    NotFound {
        /// Kind of object that was looked up.
        kind: ObjectKind,
        /// Namespace of the object, `None` for cluster-scoped kinds.
        namespace: Option<String>,
        /// Name of the object.
        name: String,
    },

    /// A namespaced operation was invoked without a namespace.
    #[error("must provide namespace when {operation}")]
    MissingNamespace {
        /// The operation that required a namespace.
        operation: &'static str,
    },

    /// A binding references something other than a `Role` or `ClusterRole`.
    #[error("unsupported role reference kind: \"{0}\"")]
    UnsupportedRoleRefKind(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A user tried to grant permissions they do not hold.
    #[error("{}", describe_escalation(.user, .groups, .missing, .resolution_errors.as_ref()))]
    Escalation {
        /// Name of the user attempting the grant.
        user: String,
        /// Groups of the user attempting the grant.
        groups: Vec<String>,
        /// Atomic rules the user does not hold.
        missing: Vec<PolicyRule>,
        /// Non-fatal errors hit while resolving the user's own rules.
        resolution_errors: Option<AggregateError>,
    },

    /// Several errors collected during one resolution pass.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl RbacError {
    /// Create a not found error for a namespaced object.
    pub fn not_found(
        kind: ObjectKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            kind,
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Create a not found error for a cluster-scoped object.
    pub fn cluster_not_found(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            namespace: None,
            name: name.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Check if this is a not found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an escalation error.
    pub const fn is_escalation(&self) -> bool {
        matches!(self, Self::Escalation { .. })
    }
}

fn qualified_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}/{name}"),
        _ => name.to_string(),
    }
}

fn describe_escalation(
    user: &str,
    groups: &[String],
    missing: &[PolicyRule],
    resolution_errors: Option<&AggregateError>,
) -> String {
    let mut msg = format!(
        "user \"{user}\" (groups={groups:?}) is attempting to grant RBAC permissions not currently held:"
    );
    for rule in missing {
        msg.push('\n');
        msg.push_str(&rule.to_string());
    }
    if let Some(errs) = resolution_errors {
        msg.push_str(&format!("; resolution errors: {errs}"));
    }
    msg
}

/// An ordered, non-empty collection of errors.
///
/// A single error displays as itself; several display as `[e1, e2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<RbacError>,
}

impl AggregateError {
    /// Wrap the given errors, returning `None` when there are none.
    pub fn new(errors: Vec<RbacError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// The collected errors in the order they occurred.
    pub fn errors(&self) -> &[RbacError] {
        &self.errors
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; an aggregate is never empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the aggregate and return its errors.
    pub fn into_errors(self) -> Vec<RbacError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "{only}");
        }
        write!(f, "[")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{err}")?;
        }
        write!(f, "]")
    }
}

impl std::error::Error for AggregateError {}
