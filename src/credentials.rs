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

use crate::cleanup::{self, Cleaner};
use crate::config::ProvisionerConfig;
use crate::context::{self, Context, Store};
use crate::provision::{self, Provisioner};
use crate::types;
use crate::types::credential::{ClusterEndpoint, CredentialMaterial};
use crate::types::identity::Identity;
use crate::types::privilege::PrivilegeLevel;
use kube::config::Kubeconfig;
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(display("cannot reach cluster with the supplied kubeconfig: {}", source))]
    Connect { source: context::Error },

    #[snafu(transparent)]
    Provision { source: provision::Error },

    #[snafu(transparent)]
    Cleanup { source: cleanup::Error },
}

impl Error {
    /// Whether the caller sent something unusable, as opposed to the cluster failing us.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Types { .. } | Error::Connect { .. } => true,
            Error::Provision {
                source: provision::Error::Types { .. },
            } => true,
            Error::Provision { .. } | Error::Cleanup { .. } => false,
        }
    }
}

/// Provisions `identity_name` at `level` in the cluster the kubeconfig bundle points at, and
/// returns the material needed to render a credential for it.
pub async fn issue_credentials(
    kubeconfig: &str,
    identity_name: &str,
    level: &str,
    tenant: &str,
    config: &ProvisionerConfig,
) -> Result<CredentialMaterial, Error> {
    let level = PrivilegeLevel::parse(level)?;
    let identity = Identity::new(identity_name, config.namespace.as_str())?.with_tenant(tenant)?;

    let (context, kubeconfig) = Context::from_kubeconfig_yaml(kubeconfig)
        .await
        .context(ConnectSnafu)?;

    issue(Arc::new(context), &kubeconfig, &identity, level, config).await
}

/// Removes everything provisioned for `identity_name` in the bundle's cluster.
pub async fn revoke_credentials(
    kubeconfig: &str,
    identity_name: &str,
    config: &ProvisionerConfig,
) -> Result<(), Error> {
    let identity = Identity::new(identity_name, config.namespace.as_str())?;

    let (context, _) = Context::from_kubeconfig_yaml(kubeconfig)
        .await
        .context(ConnectSnafu)?;

    revoke(Arc::new(context), &identity, config).await
}

pub(crate) async fn issue(
    store: Arc<dyn Store>,
    kubeconfig: &Kubeconfig,
    identity: &Identity,
    level: PrivilegeLevel,
    config: &ProvisionerConfig,
) -> Result<CredentialMaterial, Error> {
    // resolved up front so a bundle without a usable endpoint never reaches the cluster
    let endpoint = ClusterEndpoint::from_kubeconfig(kubeconfig)?;

    let token = Provisioner::new(store, config.clone())
        .provision(identity, level)
        .await?;

    info!(
        "issued {} credentials for {} on {}",
        level,
        identity.name(),
        endpoint.server
    );
    Ok(CredentialMaterial::new(endpoint, token))
}

pub(crate) async fn revoke(
    store: Arc<dyn Store>,
    identity: &Identity,
    config: &ProvisionerConfig,
) -> Result<(), Error> {
    Cleaner::new(store, config.retry).teardown(identity).await?;
    info!("revoked credentials for {}", identity.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeStore, Op, TEST_KUBECONFIG};
    use crate::types::phase::Step;

    fn kubeconfig() -> Kubeconfig {
        Kubeconfig::from_yaml(TEST_KUBECONFIG).unwrap()
    }

    #[tokio::test]
    async fn test_issue_returns_material_for_current_context() {
        let store = Arc::new(FakeStore::default());
        let identity = crate::tests::create_test_identity("alice");

        let material = issue(
            store.clone(),
            &kubeconfig(),
            &identity,
            PrivilegeLevel::RuntimeOperator,
            &crate::tests::fast_config(),
        )
        .await
        .unwrap();

        assert_eq!(material.token, "token-alice");
        assert_eq!(material.server, "https://api.tenant-1.example.com:6443");
        assert_eq!(material.context_name, "tenant-1");
        assert!(store.has_service_account("kube-system", "alice"));
    }

    #[tokio::test]
    async fn test_issue_without_endpoint_touches_nothing() {
        let store = Arc::new(FakeStore::default());
        let identity = crate::tests::create_test_identity("alice");
        let mut kubeconfig = kubeconfig();
        kubeconfig.current_context = None;

        let err = issue(
            store.clone(),
            &kubeconfig,
            &identity,
            PrivilegeLevel::RuntimeAdmin,
            &crate::tests::fast_config(),
        )
        .await
        .unwrap_err();

        assert!(err.is_invalid_input());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_issue_failure_is_not_invalid_input() {
        let store = Arc::new(FakeStore::default());
        let identity = crate::tests::create_test_identity("alice");
        store.fail(Op::CreateClusterRoleBinding, usize::MAX);

        let err = issue(
            store.clone(),
            &kubeconfig(),
            &identity,
            PrivilegeLevel::RuntimeAdmin,
            &crate::tests::fast_config(),
        )
        .await
        .unwrap_err();

        assert!(!err.is_invalid_input());
        let Error::Provision { source } = &err else {
            panic!("expected provisioning error, got {err}");
        };
        assert_eq!(source.step(), Some(Step::RoleBinding));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_revoke_after_issue() {
        let store = Arc::new(FakeStore::default());
        let identity = crate::tests::create_test_identity("alice");
        let config = crate::tests::fast_config();

        issue(
            store.clone(),
            &kubeconfig(),
            &identity,
            PrivilegeLevel::RuntimeAdmin,
            &config,
        )
        .await
        .unwrap();

        // revocation only needs the name
        let bare = Identity::new("alice", "kube-system").unwrap();
        revoke(store.clone(), &bare, &config).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_connecting() {
        let config = ProvisionerConfig::default();

        let err = issue_credentials(TEST_KUBECONFIG, "alice", "superuser", "tenant-1", &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Types {
                source: types::error::Error::InvalidPrivilegeLevel { .. }
            }
        ));

        let err = issue_credentials(TEST_KUBECONFIG, "Alice!", "admin", "tenant-1", &config)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());

        let err = issue_credentials(TEST_KUBECONFIG, "alice", "admin", "", &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Types {
                source: types::error::Error::EmptyTenant
            }
        ));

        let err = revoke_credentials("not: [yaml", "alice", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
        assert!(err.is_invalid_input());
    }
}
