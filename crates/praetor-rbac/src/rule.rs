//! Rule-matching predicates.
//!
//! Each predicate looks at one [`PolicyRule`] and one facet of a request.
//! Matching is exact and case-sensitive. The only wildcard forms are a bare
//! `*`, a `*/<subresource>` resource entry, and a non-resource URL ending in
//! `*`. An empty requested verb, resource or path only ever matches a bare
//! `*`.

use crate::attributes::Attributes;
use crate::types::{PolicyRule, WILDCARD};

fn has_exact(values: &[String], requested: &str) -> bool {
    !requested.is_empty() && values.iter().any(|v| v == requested)
}

fn has_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == WILDCARD)
}

/// Whether the rule grants `verb`.
pub fn verb_matches(rule: &PolicyRule, verb: &str) -> bool {
    has_wildcard(&rule.verbs) || has_exact(&rule.verbs, verb)
}

/// Whether the rule applies to `api_group`.
///
/// A rule that lists no api groups is not restricted by group. The core
/// group is the empty string, so it is compared without the empty-value
/// guard the other predicates use.
pub fn api_group_matches(rule: &PolicyRule, api_group: &str) -> bool {
    rule.api_groups.is_empty()
        || rule
            .api_groups
            .iter()
            .any(|g| g == WILDCARD || g == api_group)
}

/// Whether the rule grants `combined_resource`.
///
/// `combined_resource` is `resource` or `resource/subresource`. A
/// `*/<subresource>` entry matches any resource with that subresource.
pub fn resource_matches(rule: &PolicyRule, combined_resource: &str, subresource: &str) -> bool {
    rule.resources.iter().any(|r| {
        r == WILDCARD
            || (!combined_resource.is_empty() && r == combined_resource)
            || (!subresource.is_empty() && r.strip_prefix("*/") == Some(subresource))
    })
}

/// Whether the rule permits the object named `name`.
///
/// An empty `resource_names` list permits every name. Entries are compared
/// exactly; `*` has no special meaning here.
pub fn resource_name_matches(rule: &PolicyRule, name: &str) -> bool {
    rule.resource_names.is_empty() || rule.resource_names.iter().any(|n| n == name)
}

/// Whether the rule grants the non-resource `path`.
pub fn non_resource_url_matches(rule: &PolicyRule, path: &str) -> bool {
    rule.non_resource_urls.iter().any(|url| {
        if url == WILDCARD {
            return true;
        }
        if path.is_empty() {
            return false;
        }
        match url.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => url == path,
        }
    })
}

/// Whether the rule allows the request.
///
/// Resource requests are checked against verbs, api groups, resources and
/// resource names; non-resource requests against verbs and URLs.
pub fn rule_allows(attrs: &Attributes, rule: &PolicyRule) -> bool {
    if attrs.is_resource_request() {
        verb_matches(rule, &attrs.verb)
            && api_group_matches(rule, &attrs.api_group)
            && resource_matches(rule, &attrs.combined_resource(), &attrs.subresource)
            && resource_name_matches(rule, &attrs.name)
    } else {
        verb_matches(rule, &attrs.verb) && non_resource_url_matches(rule, &attrs.path)
    }
}

/// Whether any of the rules allows the request. Stops at the first match.
pub fn rules_allow<'a, I>(attrs: &Attributes, rules: I) -> bool
where
    I: IntoIterator<Item = &'a PolicyRule>,
{
    rules.into_iter().any(|rule| rule_allows(attrs, rule))
}
