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

use super::Verification;
use crate::context::{Error, Store};
use crate::types::identity::Identity;
use tracing::{debug, info};

/// Existence only; a service account has no shape worth comparing.
pub async fn verify_service_account(
    store: &dyn Store,
    identity: &Identity,
) -> Result<Verification, Error> {
    let found = store
        .get_service_account(identity.namespace(), &identity.service_account_name())
        .await?;

    Ok(match found {
        Some(_) => Verification::Satisfied,
        None => Verification::Absent,
    })
}

pub async fn ensure_service_account(store: &dyn Store, identity: &Identity) -> Result<(), Error> {
    if verify_service_account(store, identity).await? == Verification::Satisfied {
        debug!(
            "service account {}/{} already exists",
            identity.namespace(),
            identity.service_account_name()
        );
        return Ok(());
    }

    store
        .create_service_account(&identity.new_service_account())
        .await?;
    info!(
        "service account {}/{} created",
        identity.namespace(),
        identity.service_account_name()
    );
    Ok(())
}
