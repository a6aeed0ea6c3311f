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

//! Fixed privilege levels and the policy tables behind them.

use crate::types::error::Error;
use k8s_openapi::api::rbac::v1 as rbacv1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumString};

pub const AGGREGATE_TO_ADMIN_LABEL: &str = "rbac.authorization.k8s.io/aggregate-to-admin";
pub const AGGREGATE_TO_EDIT_LABEL: &str = "rbac.authorization.k8s.io/aggregate-to-edit";

/// Privilege granted to a provisioned identity.
/// - RuntimeAdmin: every verb on every resource and non-resource URL
/// - RuntimeOperator: read-only (get, list, watch) on the same surface
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash)]
pub enum PrivilegeLevel {
    #[strum(to_string = "runtimeAdmin", serialize = "admin")]
    #[serde(rename = "runtimeAdmin", alias = "admin")]
    RuntimeAdmin,

    #[strum(to_string = "runtimeOperator", serialize = "operator")]
    #[serde(rename = "runtimeOperator", alias = "operator")]
    RuntimeOperator,
}

impl PrivilegeLevel {
    /// Parses a caller-supplied level, rejecting anything outside the enumeration.
    pub fn parse(value: &str) -> Result<Self, Error> {
        PrivilegeLevel::from_str(value).map_err(|_| Error::InvalidPrivilegeLevel {
            value: value.to_owned(),
        })
    }

    /// Rules laid down in the identity's rules-role.
    pub fn policy_rules(&self) -> &'static [rbacv1::PolicyRule] {
        match self {
            PrivilegeLevel::RuntimeAdmin => &ADMIN_RULES,
            PrivilegeLevel::RuntimeOperator => &OPERATOR_RULES,
        }
    }

    /// Cluster-wide selectors folded into the identity's aggregating role.
    pub fn aggregation_selectors(&self) -> &'static [metav1::LabelSelector] {
        match self {
            PrivilegeLevel::RuntimeAdmin => &ADMIN_AGGREGATION,
            PrivilegeLevel::RuntimeOperator => &OPERATOR_AGGREGATION,
        }
    }
}

static ADMIN_RULES: LazyLock<Vec<rbacv1::PolicyRule>> = LazyLock::new(|| {
    vec![
        resource_rule(&["*"], &["*"], &["*"]),
        non_resource_rule(&["*"], &["*"]),
    ]
});

static OPERATOR_RULES: LazyLock<Vec<rbacv1::PolicyRule>> = LazyLock::new(|| {
    vec![
        resource_rule(&["get", "list", "watch"], &["*"], &["*"]),
        non_resource_rule(&["get", "list", "watch"], &["*"]),
    ]
});

static ADMIN_AGGREGATION: LazyLock<Vec<metav1::LabelSelector>> =
    LazyLock::new(|| vec![match_label_selector(AGGREGATE_TO_ADMIN_LABEL)]);

static OPERATOR_AGGREGATION: LazyLock<Vec<metav1::LabelSelector>> =
    LazyLock::new(|| vec![match_label_selector(AGGREGATE_TO_EDIT_LABEL)]);

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

fn resource_rule(verbs: &[&str], groups: &[&str], resources: &[&str]) -> rbacv1::PolicyRule {
    rbacv1::PolicyRule {
        api_groups: Some(owned(groups)),
        resources: Some(owned(resources)),
        verbs: owned(verbs),
        ..Default::default()
    }
}

fn non_resource_rule(verbs: &[&str], urls: &[&str]) -> rbacv1::PolicyRule {
    rbacv1::PolicyRule {
        non_resource_urls: Some(owned(urls)),
        verbs: owned(verbs),
        ..Default::default()
    }
}

/// A selector matching `<label>: "true"`.
pub fn match_label_selector(label: &str) -> metav1::LabelSelector {
    metav1::LabelSelector {
        match_labels: Some([(label.to_owned(), "true".to_owned())].into_iter().collect()),
        ..Default::default()
    }
}
