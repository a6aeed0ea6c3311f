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

use crate::credentials;
use crate::provision;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;

/// Console API error type
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Bad request: {}", message))]
    BadRequest { message: String },

    #[snafu(display("Provisioning failed: {}", message))]
    Provisioning {
        step: Option<String>,
        message: String,
    },

    #[snafu(display("Cleanup failed: {}", message))]
    Cleanup {
        incomplete_kinds: Vec<String>,
        message: String,
    },
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<credentials::Error> for Error {
    fn from(e: credentials::Error) -> Self {
        if e.is_invalid_input() {
            return Error::BadRequest {
                message: e.to_string(),
            };
        }
        match e {
            credentials::Error::Provision { source } => Error::Provisioning {
                step: provision::Error::step(&source).map(|step| step.to_string()),
                message: source.to_string(),
            },
            credentials::Error::Cleanup { source } => Error::Cleanup {
                incomplete_kinds: source
                    .incomplete_kinds()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                message: source.to_string(),
            },
            other => Error::Cleanup {
                incomplete_kinds: Vec::new(),
                message: other.to_string(),
            },
        }
    }
}

/// API error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    incomplete_kinds: Vec<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message, step, incomplete_kinds) = match self {
            Error::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                "BadRequest",
                message,
                None,
                Vec::new(),
            ),
            Error::Provisioning { step, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ProvisioningFailed",
                message,
                step,
                Vec::new(),
            ),
            Error::Cleanup {
                incomplete_kinds,
                message,
            } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CleanupFailed",
                message,
                None,
                incomplete_kinds,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            step,
            incomplete_kinds,
        });

        (status, body).into_response()
    }
}

/// Result type for Console API
pub type Result<T> = std::result::Result<T, Error>;
