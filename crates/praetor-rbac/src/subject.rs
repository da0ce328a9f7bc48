//! Subject matching.

use crate::serviceaccount;
use crate::types::{Subject, GROUP_KIND, SERVICE_ACCOUNT_KIND, USER_KIND};
use crate::user::UserInfo;

/// Whether `subject` names `user`.
///
/// `binding_namespace` is the default namespace for service account
/// subjects that carry none; cluster role bindings pass `""`, so their
/// service account subjects must be fully qualified. Unknown kinds never
/// match.
pub fn applies_to_user(user: &UserInfo, subject: &Subject, binding_namespace: &str) -> bool {
    match subject.kind.as_str() {
        USER_KIND => user.name == subject.name,
        GROUP_KIND => user.in_group(&subject.name),
        SERVICE_ACCOUNT_KIND => {
            let namespace = if subject.namespace.is_empty() {
                binding_namespace
            } else {
                &subject.namespace
            };
            if namespace.is_empty() {
                return false;
            }
            serviceaccount::matches_username(namespace, &subject.name, &user.name)
        }
        _ => false,
    }
}

/// Index of the first subject that names `user`, if any.
pub fn applies_to(user: &UserInfo, subjects: &[Subject], binding_namespace: &str) -> Option<usize> {
    subjects
        .iter()
        .position(|subject| applies_to_user(user, subject, binding_namespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserInfo {
        UserInfo::new("alice").with_groups(["dev", "system:authenticated"])
    }

    #[test]
    fn test_user_kind() {
        assert!(applies_to_user(&alice(), &Subject::user("alice"), ""));
        assert!(!applies_to_user(&alice(), &Subject::user("Alice"), ""));
    }

    #[test]
    fn test_group_kind() {
        assert!(applies_to_user(&alice(), &Subject::group("dev"), ""));
        assert!(!applies_to_user(&alice(), &Subject::group("de*"), ""));
        assert!(!applies_to_user(&alice(), &Subject::group("alice"), ""));
    }

    #[test]
    fn test_service_account_explicit_namespace() {
        let sa = UserInfo::new("system:serviceaccount:ci:builder");
        assert!(applies_to_user(&sa, &Subject::service_account("ci", "builder"), ""));
        assert!(!applies_to_user(&sa, &Subject::service_account("prod", "builder"), "ci"));
    }

    #[test]
    fn test_service_account_defaults_to_binding_namespace() {
        let sa = UserInfo::new("system:serviceaccount:ci:builder");
        let subject = Subject::service_account("", "builder");
        assert!(applies_to_user(&sa, &subject, "ci"));
        assert!(!applies_to_user(&sa, &subject, "prod"));
    }

    #[test]
    fn test_service_account_without_any_namespace() {
        let sa = UserInfo::new("system:serviceaccount::builder");
        assert!(!applies_to_user(&sa, &Subject::service_account("", "builder"), ""));
    }

    #[test]
    fn test_service_account_does_not_match_plain_user() {
        let user = UserInfo::new("builder");
        assert!(!applies_to_user(&user, &Subject::service_account("ci", "builder"), ""));
    }

    #[test]
    fn test_unknown_kind_never_matches() {
        let subject = Subject {
            kind: "Robot".to_string(),
            name: "alice".to_string(),
            namespace: String::new(),
        };
        assert!(!applies_to_user(&alice(), &subject, "ns"));
    }

    #[test]
    fn test_applies_to_returns_first_match() {
        let subjects = vec![
            Subject::user("bob"),
            Subject::group("dev"),
            Subject::user("alice"),
        ];
        assert_eq!(applies_to(&alice(), &subjects, ""), Some(1));
        assert_eq!(applies_to(&UserInfo::new("carol"), &subjects, ""), None);
        assert_eq!(applies_to(&alice(), &[], ""), None);
    }
}
