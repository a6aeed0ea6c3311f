// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{Verification, shape};
use crate::context::{Error, Store, ignore_not_found};
use crate::types::identity::Identity;
use crate::types::privilege::PrivilegeLevel;
use k8s_openapi::api::rbac::v1 as rbacv1;
use tracing::{debug, info, warn};

/// Checks the rules-role grants exactly the level's rules and still carries the label the
/// aggregating role selects on.
pub async fn verify_rules_role(
    store: &dyn Store,
    identity: &Identity,
    level: PrivilegeLevel,
) -> Result<Verification, Error> {
    let name = identity.rules_role_name();
    let Some(role) = store.get_cluster_role(&name).await? else {
        return Ok(Verification::Absent);
    };

    let labelled = role
        .metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(&identity.aggregation_label()))
        .is_some_and(|value| value == "true");

    if labelled && shape::rules_match(role.rules.as_ref(), level.policy_rules()) {
        return Ok(Verification::Satisfied);
    }

    warn!("cluster role {} does not match {} rules, replacing it", name, level);
    delete_stale(store, &name).await
}

/// Checks the aggregating role selects the level-wide labels plus the identity's own label.
pub async fn verify_aggregated_role(
    store: &dyn Store,
    identity: &Identity,
    level: PrivilegeLevel,
) -> Result<Verification, Error> {
    let name = identity.cluster_role_name();
    let Some(role) = store.get_cluster_role(&name).await? else {
        return Ok(Verification::Absent);
    };

    let desired = identity.aggregation_selectors(level);
    if shape::selectors_match(role.aggregation_rule.as_ref(), &desired) {
        return Ok(Verification::Satisfied);
    }

    warn!(
        "cluster role {} does not aggregate {} selectors, replacing it",
        name, level
    );
    delete_stale(store, &name).await
}

pub async fn ensure_rules_role(
    store: &dyn Store,
    identity: &Identity,
    level: PrivilegeLevel,
) -> Result<(), Error> {
    if verify_rules_role(store, identity, level).await? == Verification::Satisfied {
        debug!("cluster role {} already up to date", identity.rules_role_name());
        return Ok(());
    }
    create(store, identity.new_rules_role(level)).await
}

pub async fn ensure_aggregated_role(
    store: &dyn Store,
    identity: &Identity,
    level: PrivilegeLevel,
) -> Result<(), Error> {
    if verify_aggregated_role(store, identity, level).await? == Verification::Satisfied {
        debug!("cluster role {} already up to date", identity.cluster_role_name());
        return Ok(());
    }
    create(store, identity.new_aggregated_role(level)).await
}

async fn create(store: &dyn Store, role: rbacv1::ClusterRole) -> Result<(), Error> {
    store.create_cluster_role(&role).await?;
    info!(
        "cluster role {} created",
        role.metadata.name.unwrap_or_default()
    );
    Ok(())
}

// someone else may have removed it in the meantime, which is just as good
async fn delete_stale(store: &dyn Store, name: &str) -> Result<Verification, Error> {
    ignore_not_found(store.delete_cluster_role(name).await)?;
    Ok(Verification::Absent)
}
