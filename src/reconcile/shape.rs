// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Order-insensitive comparison of the fields the verifiers care about.
//!
//! The API server does not promise stable ordering for lists, and it omits empty optional
//! fields on the way back, so `None` and an empty list compare equal here.

use k8s_openapi::api::rbac::v1 as rbacv1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RuleShape {
    verbs: BTreeSet<String>,
    api_groups: BTreeSet<String>,
    resources: BTreeSet<String>,
    resource_names: BTreeSet<String>,
    non_resource_urls: BTreeSet<String>,
}

impl From<&rbacv1::PolicyRule> for RuleShape {
    fn from(rule: &rbacv1::PolicyRule) -> Self {
        Self {
            verbs: rule.verbs.iter().cloned().collect(),
            api_groups: set(rule.api_groups.as_ref()),
            resources: set(rule.resources.as_ref()),
            resource_names: set(rule.resource_names.as_ref()),
            non_resource_urls: set(rule.non_resource_urls.as_ref()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SelectorShape {
    match_labels: BTreeMap<String, String>,
    match_expressions: Vec<(String, String, BTreeSet<String>)>,
}

impl From<&metav1::LabelSelector> for SelectorShape {
    fn from(selector: &metav1::LabelSelector) -> Self {
        let mut match_expressions: Vec<_> = selector
            .match_expressions
            .iter()
            .flatten()
            .map(|req| {
                (
                    req.key.clone(),
                    req.operator.clone(),
                    set(req.values.as_ref()),
                )
            })
            .collect();
        match_expressions.sort();

        Self {
            match_labels: selector.match_labels.clone().unwrap_or_default(),
            match_expressions,
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SubjectShape {
    kind: String,
    name: String,
    namespace: String,
    api_group: String,
}

impl From<&rbacv1::Subject> for SubjectShape {
    fn from(subject: &rbacv1::Subject) -> Self {
        Self {
            kind: subject.kind.clone(),
            name: subject.name.clone(),
            namespace: subject.namespace.clone().unwrap_or_default(),
            api_group: subject.api_group.clone().unwrap_or_default(),
        }
    }
}

fn set(values: Option<&Vec<String>>) -> BTreeSet<String> {
    values.into_iter().flatten().cloned().collect()
}

/// Normalizes every element and sorts, so the comparison is a multiset comparison.
fn sorted<'a, T, S>(items: impl IntoIterator<Item = &'a T>) -> Vec<S>
where
    T: 'a,
    S: From<&'a T> + Ord,
{
    let mut shapes: Vec<S> = items.into_iter().map(S::from).collect();
    shapes.sort();
    shapes
}

pub fn rules_match(
    actual: Option<&Vec<rbacv1::PolicyRule>>,
    desired: &[rbacv1::PolicyRule],
) -> bool {
    sorted::<_, RuleShape>(actual.into_iter().flatten()) == sorted::<_, RuleShape>(desired)
}

pub fn selectors_match(
    actual: Option<&rbacv1::AggregationRule>,
    desired: &[metav1::LabelSelector],
) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    let actual = actual.cluster_role_selectors.iter().flatten();
    sorted::<_, SelectorShape>(actual) == sorted::<_, SelectorShape>(desired)
}

pub fn role_ref_matches(actual: &rbacv1::RoleRef, desired: &rbacv1::RoleRef) -> bool {
    actual.api_group == desired.api_group
        && actual.kind == desired.kind
        && actual.name == desired.name
}

pub fn subjects_match(actual: Option<&Vec<rbacv1::Subject>>, desired: &[rbacv1::Subject]) -> bool {
    sorted::<_, SubjectShape>(actual.into_iter().flatten()) == sorted::<_, SubjectShape>(desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::privilege::PrivilegeLevel;

    fn rule(verbs: &[&str], resources: &[&str]) -> rbacv1::PolicyRule {
        rbacv1::PolicyRule {
            api_groups: Some(vec!["*".to_string()]),
            resources: Some(resources.iter().map(|s| s.to_string()).collect()),
            verbs: verbs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rules_match_ignores_ordering() {
        let desired = vec![rule(&["get", "list"], &["pods"]), rule(&["watch"], &["nodes"])];
        let actual = vec![rule(&["watch"], &["nodes"]), rule(&["list", "get"], &["pods"])];

        assert!(rules_match(Some(&actual), &desired));
    }

    #[test]
    fn test_rules_match_detects_drift() {
        let desired = PrivilegeLevel::RuntimeOperator.policy_rules();
        let admin = PrivilegeLevel::RuntimeAdmin.policy_rules().to_vec();

        assert!(!rules_match(Some(&admin), desired));
        assert!(!rules_match(None, desired));
        assert!(rules_match(Some(&desired.to_vec()), desired));
    }

    #[test]
    fn test_rules_match_counts_duplicates() {
        let desired = vec![rule(&["get"], &["pods"])];
        let actual = vec![rule(&["get"], &["pods"]), rule(&["get"], &["pods"])];

        assert!(!rules_match(Some(&actual), &desired));
    }

    #[test]
    fn test_selectors_match_ignores_ordering() {
        let identity = crate::tests::create_test_identity("alice");
        let desired = identity.aggregation_selectors(PrivilegeLevel::RuntimeOperator);

        let mut reversed = desired.clone();
        reversed.reverse();
        let actual = rbacv1::AggregationRule {
            cluster_role_selectors: Some(reversed),
        };

        assert!(selectors_match(Some(&actual), &desired));
        assert!(!selectors_match(None, &desired));
    }

    #[test]
    fn test_selectors_match_detects_missing_identity_selector() {
        let identity = crate::tests::create_test_identity("alice");
        let desired = identity.aggregation_selectors(PrivilegeLevel::RuntimeOperator);
        let actual = rbacv1::AggregationRule {
            cluster_role_selectors: Some(
                PrivilegeLevel::RuntimeOperator.aggregation_selectors().to_vec(),
            ),
        };

        assert!(!selectors_match(Some(&actual), &desired));
    }

    #[test]
    fn test_subjects_match_treats_missing_api_group_as_empty() {
        let identity = crate::tests::create_test_identity("alice");
        let desired = identity.subjects();

        let mut actual = desired.clone();
        actual[0].api_group = Some(String::new());

        assert!(subjects_match(Some(&actual), &desired));
    }

    #[test]
    fn test_subjects_match_detects_other_namespace() {
        let identity = crate::tests::create_test_identity("alice");
        let desired = identity.subjects();

        let mut actual = desired.clone();
        actual[0].namespace = Some("default".to_string());

        assert!(!subjects_match(Some(&actual), &desired));
        assert!(!subjects_match(None, &desired));
    }

    #[test]
    fn test_role_ref_matches() {
        let identity = crate::tests::create_test_identity("alice");
        let desired = identity.role_ref();

        assert!(role_ref_matches(&desired.clone(), &desired));

        let mut other = desired.clone();
        other.name = "bob".to_string();
        assert!(!role_ref_matches(&other, &desired));
    }
}
