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

//! Verify-then-create for each resource kind an identity owns.
//!
//! A verifier reads the object by its derived name. Missing objects are reported
//! [`Verification::Absent`]; objects whose shape drifted are deleted and also reported
//! absent, so the matching `ensure_*` lays them down again. Only backing-store failures
//! other than "not found" surface as errors.

pub mod cluster_role;
pub mod role_binding;
pub mod service_account;
mod shape;

pub use cluster_role::{
    ensure_aggregated_role, ensure_rules_role, verify_aggregated_role, verify_rules_role,
};
pub use role_binding::{ensure_role_binding, verify_role_binding};
pub use service_account::{ensure_service_account, verify_service_account};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Nothing usable exists; the caller must create it.
    Absent,
    /// The object exists with the desired shape.
    Satisfied,
}
