//! Service account username convention.
//!
//! A service account `name` in namespace `ns` authenticates as
//! `system:serviceaccount:<ns>:<name>`.

/// Prefix of every service account username.
pub const SERVICE_ACCOUNT_USERNAME_PREFIX: &str = "system:serviceaccount:";

/// Build the username a service account authenticates as.
///
/// # Example
///
/// ```
/// use praetor_rbac::serviceaccount::make_username;
///
/// assert_eq!(make_username("ci", "builder"), "system:serviceaccount:ci:builder");
/// ```
pub fn make_username(namespace: &str, name: &str) -> String {
    format!("{SERVICE_ACCOUNT_USERNAME_PREFIX}{namespace}:{name}")
}

/// Split a service account username into `(namespace, name)`.
///
/// Returns `None` when the username does not follow the convention or
/// either part is empty.
pub fn split_username(username: &str) -> Option<(&str, &str)> {
    let rest = username.strip_prefix(SERVICE_ACCOUNT_USERNAME_PREFIX)?;
    let (namespace, name) = rest.split_once(':')?;
    if namespace.is_empty() || name.is_empty() {
        return None;
    }
    Some((namespace, name))
}

/// Whether `username` is the service account `name` in `namespace`.
///
/// Equivalent to `username == make_username(namespace, name)` without
/// allocating.
pub fn matches_username(namespace: &str, name: &str, username: &str) -> bool {
    username
        .strip_prefix(SERVICE_ACCOUNT_USERNAME_PREFIX)
        .and_then(|rest| rest.strip_prefix(namespace))
        .and_then(|rest| rest.strip_prefix(':'))
        .is_some_and(|rest| rest == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_username() {
        assert_eq!(
            split_username("system:serviceaccount:ci:builder"),
            Some(("ci", "builder"))
        );
        assert_eq!(split_username("system:serviceaccount:ci"), None);
        assert_eq!(split_username("system:serviceaccount::builder"), None);
        assert_eq!(split_username("alice"), None);
    }

    #[test]
    fn test_matches_username() {
        assert!(matches_username("ci", "builder", "system:serviceaccount:ci:builder"));
        assert!(!matches_username("ci", "builder", "system:serviceaccount:ci:builder2"));
        assert!(!matches_username("c", "i:builder", "system:serviceaccount:ci:builder"));
        assert!(!matches_username("ci", "builder", "ci:builder"));
    }

    #[test]
    fn test_matches_agrees_with_make() {
        for (ns, name) in [("a", "b"), ("a:b", "c"), ("kube-system", "default")] {
            let username = make_username(ns, name);
            assert!(matches_username(ns, name, &username));
        }
    }
}
