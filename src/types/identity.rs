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

use crate::types::error::{EmptyTenantSnafu, Error, InvalidIdentityNameSnafu};
use std::collections::BTreeMap;

mod rbac;

pub const DEFAULT_NAMESPACE: &str = "kube-system";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "rbac-provisioner";
pub const TENANT_LABEL: &str = "rbac-provisioner.rustfs.com/tenant";

const AGGREGATION_LABEL_PREFIX: &str = "rbac.authorization.k8s.io/aggregate-to-";
const RULES_ROLE_SUFFIX: &str = "-rules";

// the aggregation label name part, "aggregate-to-<name>", is capped at 63 characters
const MAX_NAME_LEN: usize = 50;
const MAX_NAMESPACE_LEN: usize = 63;

/// One provisioning request: who gets the credential, where it lives and for which tenant.
///
/// All resource names are derived from the identity name, so a later run (or an explicit
/// teardown) can find every object again without any persisted state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    name: String,
    namespace: String,
    tenant: Option<String>,
}

impl Identity {
    /// An identity without tenant binding, enough to address existing objects.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let namespace = namespace.into();

        validate_name(&name, MAX_NAME_LEN)?;
        validate_name(&namespace, MAX_NAMESPACE_LEN)?;

        Ok(Self {
            name,
            namespace,
            tenant: None,
        })
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Result<Self, Error> {
        let tenant = tenant.into();
        if tenant.trim().is_empty() {
            return EmptyTenantSnafu.fail();
        }
        self.tenant = Some(tenant);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn service_account_name(&self) -> String {
        self.name.clone()
    }

    pub fn cluster_role_name(&self) -> String {
        self.name.clone()
    }

    pub fn rules_role_name(&self) -> String {
        format!("{}{}", self.name, RULES_ROLE_SUFFIX)
    }

    pub fn role_binding_name(&self) -> String {
        self.name.clone()
    }

    /// Label carried by the rules-role and selected by the aggregating role.
    pub fn aggregation_label(&self) -> String {
        format!("{}{}", AGGREGATION_LABEL_PREFIX, self.name)
    }

    /// Labels stamped on every object this identity owns.
    pub fn common_labels(&self) -> BTreeMap<String, String> {
        let mut labels: BTreeMap<String, String> =
            [(MANAGED_BY_LABEL.to_owned(), MANAGED_BY_VALUE.to_owned())]
                .into_iter()
                .collect();
        if let Some(tenant) = &self.tenant {
            labels.insert(TENANT_LABEL.to_owned(), tenant.clone());
        }
        labels
    }
}

fn validate_name(name: &str, max_len: usize) -> Result<(), Error> {
    let fail = |message: &str| {
        InvalidIdentityNameSnafu {
            name: name.to_owned(),
            message: message.to_owned(),
        }
        .fail()
    };

    if name.is_empty() {
        return fail("must not be empty");
    }
    if name.len() > max_len {
        return fail(&format!("must be no more than {} characters", max_len));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return fail("must consist of lower case alphanumeric characters, '-' or '.'");
    }

    let alphanumeric = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !name.starts_with(alphanumeric) || !name.ends_with(alphanumeric) {
        return fail("must start and end with an alphanumeric character");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let identity = crate::tests::create_test_identity("alice");

        assert_eq!(identity.service_account_name(), "alice");
        assert_eq!(identity.cluster_role_name(), "alice");
        assert_eq!(identity.rules_role_name(), "alice-rules");
        assert_eq!(identity.role_binding_name(), "alice");
        assert_eq!(
            identity.aggregation_label(),
            "rbac.authorization.k8s.io/aggregate-to-alice"
        );
        assert_eq!(identity.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(identity.tenant(), Some("tenant-1"));
    }

    #[test]
    fn test_common_labels() {
        let identity = crate::tests::create_test_identity("alice");
        let labels = identity.common_labels();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get(MANAGED_BY_LABEL), Some(&MANAGED_BY_VALUE.to_string()));
        assert_eq!(labels.get(TENANT_LABEL), Some(&"tenant-1".to_string()));
    }

    #[test]
    fn test_rejects_invalid_names() {
        let too_long = "a".repeat(51);
        for name in ["", "Alice", "alice_bob", "-alice", "alice-", too_long.as_str()] {
            let err = Identity::new(name, DEFAULT_NAMESPACE).unwrap_err();
            assert!(
                matches!(err, Error::InvalidIdentityName { .. }),
                "expected invalid name for {name:?}, got {err}"
            );
        }
    }

    #[test]
    fn test_accepts_dotted_and_dashed_names() {
        assert!(Identity::new("alice.ops-1", DEFAULT_NAMESPACE).is_ok());
        assert!(Identity::new("a", DEFAULT_NAMESPACE).is_ok());
        assert!(Identity::new("a".repeat(50), DEFAULT_NAMESPACE).is_ok());
    }

    #[test]
    fn test_rejects_empty_tenant() {
        let err = Identity::new("alice", DEFAULT_NAMESPACE)
            .unwrap()
            .with_tenant("  ")
            .unwrap_err();
        assert!(matches!(err, Error::EmptyTenant));
    }

    #[test]
    fn test_labels_without_tenant() {
        let identity = Identity::new("alice", DEFAULT_NAMESPACE).unwrap();
        let labels = identity.common_labels();

        assert_eq!(labels.len(), 1);
        assert!(!labels.contains_key(TENANT_LABEL));
    }
}
