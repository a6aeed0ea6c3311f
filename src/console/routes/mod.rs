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
    Router,
    routing::{delete, get, post},
};

use crate::console::{handlers, state::AppState};

/// Health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::ready_check))
}

/// Identity routes
pub fn identity_routes() -> Router<AppState> {
    Router::new()
        .route("/identities", post(handlers::identities::issue_identity))
        .route(
            "/identities/{name}",
            delete(handlers::identities::revoke_identity),
        )
}
