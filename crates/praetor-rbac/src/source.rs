//! Where a resolved rule came from.

use std::fmt;

use crate::types::{ClusterRoleBinding, RoleBinding, RoleRef, Subject};

/// The binding and subject through which a rule reached the caller.
///
/// Its `Display` form is the text used in allow reasons, e.g.
/// `ClusterRoleBinding "ops" of ClusterRole "admin" to Group "ops"`.
#[derive(Debug, Clone, Copy)]
pub enum RuleSource<'a> {
    /// Granted cluster-wide.
    ClusterRoleBinding {
        /// The granting binding.
        binding: &'a ClusterRoleBinding,
        /// The first subject of the binding that matched.
        subject: &'a Subject,
    },
    /// Granted within one namespace.
    RoleBinding {
        /// The granting binding.
        binding: &'a RoleBinding,
        /// The first subject of the binding that matched.
        subject: &'a Subject,
    },
}

impl RuleSource<'_> {
    /// The role reference of the granting binding.
    pub fn role_ref(&self) -> &RoleRef {
        match self {
            Self::ClusterRoleBinding { binding, .. } => &binding.role_ref,
            Self::RoleBinding { binding, .. } => &binding.role_ref,
        }
    }

    /// The matched subject.
    pub fn subject(&self) -> &Subject {
        match self {
            Self::ClusterRoleBinding { subject, .. } | Self::RoleBinding { subject, .. } => subject,
        }
    }

    /// Namespace of the granting binding, `""` when cluster-wide.
    pub fn namespace(&self) -> &str {
        match self {
            Self::ClusterRoleBinding { .. } => "",
            Self::RoleBinding { binding, .. } => &binding.namespace,
        }
    }

    /// Human-readable description of the grant.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RuleSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClusterRoleBinding { binding, subject } => write!(
                f,
                "ClusterRoleBinding \"{}\" of {} \"{}\" to {}",
                binding.name,
                binding.role_ref.kind,
                binding.role_ref.name,
                subject.describe("")
            ),
            Self::RoleBinding { binding, subject } => write!(
                f,
                "RoleBinding \"{}/{}\" of {} \"{}\" to {}",
                binding.namespace,
                binding.name,
                binding.role_ref.kind,
                binding.role_ref.name,
                subject.describe(&binding.namespace)
            ),
        }
    }
}
