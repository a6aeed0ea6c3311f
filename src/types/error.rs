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

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "privilege level '{}' not in [runtimeAdmin, runtimeOperator]",
        value
    ))]
    InvalidPrivilegeLevel { value: String },

    #[snafu(display("invalid identity name '{}': {}", name, message))]
    InvalidIdentityName { name: String, message: String },

    #[snafu(display("tenant identifier must not be empty"))]
    EmptyTenant,

    #[snafu(display("incomplete kubeconfig: {}", message))]
    IncompleteKubeconfig { message: String },
}
