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
use tracing::{debug, info, warn};

pub async fn verify_role_binding(
    store: &dyn Store,
    identity: &Identity,
) -> Result<Verification, Error> {
    let name = identity.role_binding_name();
    let Some(binding) = store.get_cluster_role_binding(&name).await? else {
        return Ok(Verification::Absent);
    };

    if shape::role_ref_matches(&binding.role_ref, &identity.role_ref())
        && shape::subjects_match(binding.subjects.as_ref(), &identity.subjects())
    {
        return Ok(Verification::Satisfied);
    }

    // roleRef is immutable on the server, so a drifted binding can only be replaced
    warn!("cluster role binding {} has drifted, replacing it", name);
    ignore_not_found(store.delete_cluster_role_binding(&name).await)?;
    Ok(Verification::Absent)
}

pub async fn ensure_role_binding(store: &dyn Store, identity: &Identity) -> Result<(), Error> {
    if verify_role_binding(store, identity).await? == Verification::Satisfied {
        debug!(
            "cluster role binding {} already up to date",
            identity.role_binding_name()
        );
        return Ok(());
    }

    store
        .create_cluster_role_binding(&identity.new_role_binding())
        .await?;
    info!("cluster role binding {} created", identity.role_binding_name());
    Ok(())
}
