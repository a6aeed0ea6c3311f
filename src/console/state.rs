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

use crate::config::ProvisionerConfig;
use std::sync::Arc;

/// Console application state
///
/// Every request brings its own kubeconfig, so only the provisioning settings are shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProvisionerConfig>,
}

impl AppState {
    pub fn new(config: ProvisionerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
