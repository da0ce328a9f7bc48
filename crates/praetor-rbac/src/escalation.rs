//! Privilege escalation check.
//!
//! A caller may only create a role or binding whose rules it already holds.
//! Rules are compared atom by atom: each rule is broken down into one rule
//! per api group, resource, resource name and verb (or per URL and verb), and
//! every atom must be covered by some rule the caller holds.

use tracing::debug;

use crate::context::RequestContext;
use crate::error::{RbacError, RbacResult};
use crate::resolver::AuthorizationRuleResolver;
use crate::types::{PolicyRule, WILDCARD};
use crate::user::UserInfo;

/// Split `rule` into atomic rules.
///
/// A resource atom carries one api group, one resource, one resource name
/// and one verb. Empty api groups or resource names stay empty on the atom,
/// since both mean unrestricted. A URL atom carries one URL and one verb. A
/// rule with neither resources nor URLs yields nothing.
pub fn breakdown_rule(rule: &PolicyRule) -> Vec<PolicyRule> {
    let groups = optional_values(&rule.api_groups);
    let names = optional_values(&rule.resource_names);

    let mut atoms = Vec::new();
    for group in &groups {
        for resource in &rule.resources {
            for name in &names {
                for verb in &rule.verbs {
                    atoms.push(PolicyRule {
                        verbs: vec![verb.clone()],
                        api_groups: group.iter().copied().cloned().collect(),
                        resources: vec![resource.clone()],
                        resource_names: name.iter().copied().cloned().collect(),
                        non_resource_urls: Vec::new(),
                    });
                }
            }
        }
    }
    for url in &rule.non_resource_urls {
        for verb in &rule.verbs {
            atoms.push(PolicyRule::new([verb.as_str()]).with_non_resource_urls([url.as_str()]));
        }
    }
    atoms
}

/// Each value on its own, or a single `None` for an empty list.
fn optional_values(values: &[String]) -> Vec<Option<&String>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.iter().map(Some).collect()
    }
}

fn has(values: &[String], item: &str) -> bool {
    values.iter().any(|v| v == item)
}

fn has_all(values: &[String], items: &[String]) -> bool {
    items.iter().all(|item| has(values, item))
}

fn resource_covered(owner_resources: &[String], resource: &str) -> bool {
    if has(owner_resources, WILDCARD) || has(owner_resources, resource) {
        return true;
    }
    match resource.split_once('/') {
        Some((_, subresource)) => owner_resources
            .iter()
            .any(|r| r.strip_prefix("*/") == Some(subresource)),
        None => false,
    }
}

fn url_covered(owner_urls: &[String], url: &str) -> bool {
    owner_urls.iter().any(|owner| {
        owner == url
            || owner
                .strip_suffix('*')
                .is_some_and(|prefix| url.starts_with(prefix))
    })
}

/// Whether `owner` grants everything `sub` grants.
pub fn rule_covers(owner: &PolicyRule, sub: &PolicyRule) -> bool {
    let verbs = has(&owner.verbs, WILDCARD) || has_all(&owner.verbs, &sub.verbs);

    let api_groups = owner.api_groups.is_empty()
        || has(&owner.api_groups, WILDCARD)
        || (!sub.api_groups.is_empty() && has_all(&owner.api_groups, &sub.api_groups));

    let resources = sub
        .resources
        .iter()
        .all(|r| resource_covered(&owner.resources, r));

    let urls = sub
        .non_resource_urls
        .iter()
        .all(|u| url_covered(&owner.non_resource_urls, u));

    let names = if sub.resource_names.is_empty() {
        owner.resource_names.is_empty()
    } else {
        owner.resource_names.is_empty() || has_all(&owner.resource_names, &sub.resource_names)
    };

    verbs && api_groups && resources && urls && names
}

/// Whether `owner_rules` grant everything `servant_rules` grant.
///
/// Returns the uncovered atomic rules in order when they do not.
pub fn covers(owner_rules: &[PolicyRule], servant_rules: &[PolicyRule]) -> (bool, Vec<PolicyRule>) {
    let missing: Vec<PolicyRule> = servant_rules
        .iter()
        .flat_map(breakdown_rule)
        .filter(|atom| !owner_rules.iter().any(|owner| rule_covers(owner, atom)))
        .collect();
    (missing.is_empty(), missing)
}

/// Fail with [`RbacError::Escalation`] unless `user` already holds every
/// rule in `rules` within `namespace`.
///
/// Errors resolving the user's own rules do not fail the check by
/// themselves; they are attached to the escalation error if one is raised.
pub fn confirm_no_escalation<R>(
    ctx: &RequestContext,
    resolver: &R,
    user: &UserInfo,
    namespace: &str,
    rules: &[PolicyRule],
) -> RbacResult<()>
where
    R: AuthorizationRuleResolver + ?Sized,
{
    let resolved = resolver.rules_for(ctx, user, namespace);
    let (covered, missing) = covers(&resolved.rules, rules);
    if covered {
        return Ok(());
    }

    debug!(
        user = %user.name,
        namespace,
        missing = missing.len(),
        "rejected attempt to grant permissions not held"
    );
    Err(RbacError::Escalation {
        user: user.name.clone(),
        groups: user.groups.clone(),
        missing,
        resolution_errors: resolved.error,
    })
}
