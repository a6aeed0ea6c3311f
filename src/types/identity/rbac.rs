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

use super::Identity;
use crate::types::privilege::{PrivilegeLevel, match_label_selector};
use k8s_openapi::Resource as _;
use k8s_openapi::api::authentication::v1 as authv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::rbac::v1 as rbacv1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

impl Identity {
    pub fn new_service_account(&self) -> corev1::ServiceAccount {
        corev1::ServiceAccount {
            metadata: metav1::ObjectMeta {
                name: Some(self.service_account_name()),
                namespace: Some(self.namespace().to_owned()),
                labels: Some(self.common_labels()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// The narrow role holding the actual grants; labelled so the aggregating role picks it up.
    pub fn new_rules_role(&self, level: PrivilegeLevel) -> rbacv1::ClusterRole {
        let mut labels = self.common_labels();
        labels.insert(self.aggregation_label(), "true".to_owned());

        rbacv1::ClusterRole {
            metadata: metav1::ObjectMeta {
                name: Some(self.rules_role_name()),
                labels: Some(labels),
                ..Default::default()
            },
            rules: Some(level.policy_rules().to_vec()),
            ..Default::default()
        }
    }

    pub fn new_aggregated_role(&self, level: PrivilegeLevel) -> rbacv1::ClusterRole {
        rbacv1::ClusterRole {
            metadata: metav1::ObjectMeta {
                name: Some(self.cluster_role_name()),
                labels: Some(self.common_labels()),
                ..Default::default()
            },
            aggregation_rule: Some(rbacv1::AggregationRule {
                cluster_role_selectors: Some(self.aggregation_selectors(level)),
            }),
            ..Default::default()
        }
    }

    /// Level-wide selectors followed by the selector for this identity's own rules-role.
    pub fn aggregation_selectors(&self, level: PrivilegeLevel) -> Vec<metav1::LabelSelector> {
        let mut selectors = level.aggregation_selectors().to_vec();
        selectors.push(match_label_selector(&self.aggregation_label()));
        selectors
    }

    pub fn new_role_binding(&self) -> rbacv1::ClusterRoleBinding {
        rbacv1::ClusterRoleBinding {
            metadata: metav1::ObjectMeta {
                name: Some(self.role_binding_name()),
                labels: Some(self.common_labels()),
                ..Default::default()
            },
            role_ref: self.role_ref(),
            subjects: Some(self.subjects()),
        }
    }

    pub fn role_ref(&self) -> rbacv1::RoleRef {
        rbacv1::RoleRef {
            api_group: rbacv1::ClusterRole::GROUP.to_owned(),
            kind: rbacv1::ClusterRole::KIND.to_owned(),
            name: self.cluster_role_name(),
        }
    }

    pub fn subjects(&self) -> Vec<rbacv1::Subject> {
        vec![rbacv1::Subject {
            kind: corev1::ServiceAccount::KIND.to_owned(),
            name: self.service_account_name(),
            namespace: Some(self.namespace().to_owned()),
            ..Default::default()
        }]
    }

    pub fn new_token_request(&self, expiration_seconds: i64) -> authv1::TokenRequest {
        authv1::TokenRequest {
            metadata: metav1::ObjectMeta {
                name: Some(self.service_account_name()),
                namespace: Some(self.namespace().to_owned()),
                ..Default::default()
            },
            spec: authv1::TokenRequestSpec {
                expiration_seconds: Some(expiration_seconds),
                ..Default::default()
            },
            status: None,
        }
    }
}
