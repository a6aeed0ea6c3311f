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

use crate::context::{self, StillPresentSnafu, Store, ignore_not_found};
use crate::retry::RetryPolicy;
use crate::types::identity::Identity;
use crate::types::ledger::{ResourceKind, RollbackLedger};
use k8s_openapi::Resource as _;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::rbac::v1 as rbacv1;
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cleanup of {} incomplete: {}", kind, source))]
    CleanupIncomplete {
        kind: ResourceKind,
        source: context::Error,
    },

    #[snafu(display("cleanup task aborted: {}", source))]
    TaskAborted { source: tokio::task::JoinError },

    #[snafu(display("{}", join(errors)))]
    Multiple { errors: Vec<Error> },
}

impl Error {
    /// Kinds left behind in the backing store.
    pub fn incomplete_kinds(&self) -> Vec<ResourceKind> {
        match self {
            Error::CleanupIncomplete { kind, .. } => vec![*kind],
            Error::TaskAborted { .. } => Vec::new(),
            Error::Multiple { errors } => errors.iter().flat_map(Error::incomplete_kinds).collect(),
        }
    }
}

fn join(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deletes the resources of an identity, one concurrent task per resource kind.
#[derive(Clone)]
pub struct Cleaner {
    store: Arc<dyn Store>,
    policy: RetryPolicy,
}

impl Cleaner {
    pub fn new(store: Arc<dyn Store>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Deletes every kind recorded in `ledger`, emptying it.
    ///
    /// Returns only after each task has either confirmed its kind absent or run out of
    /// attempts. Failures from separate tasks are combined, never dropped.
    pub async fn cleanup(
        &self,
        identity: &Identity,
        ledger: &mut RollbackLedger,
    ) -> Result<(), Error> {
        let kinds = ledger.take();
        if kinds.is_empty() {
            return Ok(());
        }

        let mut tasks = JoinSet::new();
        for kind in kinds {
            let store = Arc::clone(&self.store);
            let identity = identity.clone();
            let policy = self.policy;
            tasks.spawn(async move { delete_kind(store, identity, kind, policy).await });
        }

        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(kind)) => info!("{} of {} removed", kind, identity.name()),
                Ok(Err(e)) => {
                    warn!("{}", e);
                    errors.push(e);
                }
                Err(source) => errors.push(Error::TaskAborted { source }),
            }
        }

        match errors.len() {
            0 => {
                info!("all resources of {} removed", identity.name());
                Ok(())
            }
            1 => Err(errors.remove(0)),
            _ => {
                errors.sort_by_key(|e| e.incomplete_kinds());
                Err(Error::Multiple { errors })
            }
        }
    }

    /// Removes everything an identity may own, without relying on a ledger from a prior run.
    pub async fn teardown(&self, identity: &Identity) -> Result<(), Error> {
        self.cleanup(identity, &mut RollbackLedger::full()).await
    }
}

async fn delete_kind(
    store: Arc<dyn Store>,
    identity: Identity,
    kind: ResourceKind,
    policy: RetryPolicy,
) -> Result<ResourceKind, Error> {
    let store = store.as_ref();
    let what = format!("delete {} of {}", kind, identity.name());

    let result = match kind {
        ResourceKind::ServiceAccount => {
            policy
                .run(&what, || remove_service_account(store, &identity))
                .await
        }
        ResourceKind::ClusterRole => {
            policy
                .run(&what, || remove_cluster_roles(store, &identity))
                .await
        }
        ResourceKind::ClusterRoleBinding => {
            policy
                .run(&what, || remove_cluster_role_binding(store, &identity))
                .await
        }
    };

    result.map(|_| kind).context(CleanupIncompleteSnafu { kind })
}

async fn remove_service_account(
    store: &dyn Store,
    identity: &Identity,
) -> Result<(), context::Error> {
    let name = identity.service_account_name();
    ignore_not_found(store.delete_service_account(identity.namespace(), &name).await)?;

    if store
        .get_service_account(identity.namespace(), &name)
        .await?
        .is_some()
    {
        return StillPresentSnafu {
            kind: corev1::ServiceAccount::KIND,
            name,
        }
        .fail();
    }
    Ok(())
}

/// The aggregating role and the rules-role go together.
async fn remove_cluster_roles(
    store: &dyn Store,
    identity: &Identity,
) -> Result<(), context::Error> {
    for name in [identity.cluster_role_name(), identity.rules_role_name()] {
        ignore_not_found(store.delete_cluster_role(&name).await)?;

        if store.get_cluster_role(&name).await?.is_some() {
            return StillPresentSnafu {
                kind: rbacv1::ClusterRole::KIND,
                name,
            }
            .fail();
        }
    }
    Ok(())
}

async fn remove_cluster_role_binding(
    store: &dyn Store,
    identity: &Identity,
) -> Result<(), context::Error> {
    let name = identity.role_binding_name();
    ignore_not_found(store.delete_cluster_role_binding(&name).await)?;

    if store.get_cluster_role_binding(&name).await?.is_some() {
        return StillPresentSnafu {
            kind: rbacv1::ClusterRoleBinding::KIND,
            name,
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeStore, Op};
    use crate::types::privilege::PrivilegeLevel;

    fn seeded_store(identity: &Identity) -> Arc<FakeStore> {
        let store = Arc::new(FakeStore::default());
        store.insert_service_account(identity.new_service_account());
        store.insert_cluster_role(identity.new_rules_role(PrivilegeLevel::RuntimeOperator));
        store.insert_cluster_role(identity.new_aggregated_role(PrivilegeLevel::RuntimeOperator));
        store.insert_cluster_role_binding(identity.new_role_binding());
        store
    }

    #[tokio::test]
    async fn test_empty_ledger_is_a_no_op() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        cleaner
            .cleanup(&identity, &mut RollbackLedger::default())
            .await
            .unwrap();

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_removes_everything() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        cleaner.teardown(&identity).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_only_touches_recorded_kinds() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        let mut ledger = RollbackLedger::default();
        ledger.record(ResourceKind::ServiceAccount);
        ledger.record(ResourceKind::ClusterRole);
        cleaner.cleanup(&identity, &mut ledger).await.unwrap();

        assert!(ledger.is_empty());
        assert!(!store.has_service_account("kube-system", "alice"));
        assert!(store.cluster_role("alice").is_none());
        assert!(store.cluster_role("alice-rules").is_none());
        assert!(store.cluster_role_binding("alice").is_some());
        assert_eq!(store.count(Op::DeleteClusterRoleBinding), 0);
    }

    #[tokio::test]
    async fn test_missing_resources_are_benign() {
        let identity = crate::tests::create_test_identity("alice");
        let store = Arc::new(FakeStore::default());
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        cleaner.teardown(&identity).await.unwrap();

        assert_eq!(store.count(Op::DeleteServiceAccount), 1);
        assert_eq!(store.count(Op::DeleteClusterRole), 2);
        assert_eq!(store.count(Op::DeleteClusterRoleBinding), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        store.fail(Op::DeleteClusterRoleBinding, 2);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        cleaner.teardown(&identity).await.unwrap();

        assert!(store.is_empty());
        assert_eq!(store.count(Op::DeleteClusterRoleBinding), 3);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_names_the_kind() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        store.fail(Op::DeleteServiceAccount, usize::MAX);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        let err = cleaner.teardown(&identity).await.unwrap_err();

        assert!(matches!(
            err,
            Error::CleanupIncomplete {
                kind: ResourceKind::ServiceAccount,
                ..
            }
        ));
        assert_eq!(err.incomplete_kinds(), vec![ResourceKind::ServiceAccount]);
        assert_eq!(
            store.count(Op::DeleteServiceAccount),
            crate::tests::fast_retry().attempts as usize
        );

        // the other kinds were still removed
        assert!(store.has_service_account("kube-system", "alice"));
        assert!(store.cluster_role("alice").is_none());
        assert!(store.cluster_role("alice-rules").is_none());
        assert!(store.cluster_role_binding("alice").is_none());
    }

    #[tokio::test]
    async fn test_multiple_failures_are_combined() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        store.fail(Op::DeleteServiceAccount, usize::MAX);
        store.fail(Op::DeleteClusterRoleBinding, usize::MAX);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        let err = cleaner.teardown(&identity).await.unwrap_err();

        assert_eq!(
            err.incomplete_kinds(),
            vec![ResourceKind::ServiceAccount, ResourceKind::ClusterRoleBinding]
        );
        let message = err.to_string();
        assert!(message.contains("cleanup of ServiceAccount incomplete"));
        assert!(message.contains("cleanup of ClusterRoleBinding incomplete"));
        assert!(store.cluster_role("alice").is_none());
    }

    #[tokio::test]
    async fn test_lingering_resource_is_reported() {
        let identity = crate::tests::create_test_identity("alice");
        let store = seeded_store(&identity);
        store.keep_after_delete(Op::DeleteClusterRole);
        let cleaner = Cleaner::new(store.clone(), crate::tests::fast_retry());

        let mut ledger = RollbackLedger::default();
        ledger.record(ResourceKind::ClusterRole);
        let err = cleaner.cleanup(&identity, &mut ledger).await.unwrap_err();

        assert!(matches!(
            err,
            Error::CleanupIncomplete {
                kind: ResourceKind::ClusterRole,
                source: context::Error::StillPresent { .. },
            }
        ));
    }
}
