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

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::console::{
    error::Result,
    models::identity::{IssueRequest, RevokeRequest},
    state::AppState,
};
use crate::credentials;
use crate::types::credential::CredentialMaterial;

/// Provision an identity and hand back its credential material
pub async fn issue_identity(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<CredentialMaterial>> {
    let Json(req) = payload?;
    tracing::info!(
        "Issue request for {} ({}) in tenant {}",
        req.identity,
        req.privilege_level,
        req.tenant_id
    );

    let material = credentials::issue_credentials(
        &req.kubeconfig,
        &req.identity,
        &req.privilege_level,
        &req.tenant_id,
        &state.config,
    )
    .await
    .inspect_err(|e| tracing::warn!("Issue for {} failed: {}", req.identity, e))?;

    Ok(Json(material))
}

/// Remove everything provisioned for an identity
pub async fn revoke_identity(
    State(state): State<AppState>,
    Path(name): Path<String>,
    payload: std::result::Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(req) = payload?;
    tracing::info!("Revoke request for {}", name);

    credentials::revoke_credentials(&req.kubeconfig, &name, &state.config)
        .await
        .inspect_err(|e| tracing::warn!("Revoke for {} failed: {}", name, e))?;

    Ok(StatusCode::NO_CONTENT)
}
