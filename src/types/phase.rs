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

use serde::{Deserialize, Serialize};
use strum::Display;

/// A step of the provisioning pipeline, named as it appears in errors.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    #[strum(serialize = "service-account")]
    ServiceAccount,

    #[strum(serialize = "rules-role")]
    RulesRole,

    #[strum(serialize = "aggregated-role")]
    AggregatedRole,

    #[strum(serialize = "token")]
    Token,

    #[strum(serialize = "role-binding")]
    RoleBinding,
}

/// States of one provisioning run.
///
/// `Start -> CreatingServiceAccount -> CreatingRules -> CreatingRole -> IssuingToken ->
/// CreatingBinding -> Done`; any running state may move to `RollingBack` and then `Failed`.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Phase {
    #[strum(serialize = "Start")]
    Start,

    #[strum(serialize = "CreatingServiceAccount")]
    CreatingServiceAccount,

    #[strum(serialize = "CreatingRules")]
    CreatingRules,

    #[strum(serialize = "CreatingRole")]
    CreatingRole,

    #[strum(serialize = "IssuingToken")]
    IssuingToken,

    #[strum(serialize = "CreatingBinding")]
    CreatingBinding,

    #[strum(serialize = "Done")]
    Done,

    #[strum(serialize = "RollingBack")]
    RollingBack,

    #[strum(serialize = "Failed")]
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }
}

impl From<Step> for Phase {
    fn from(step: Step) -> Self {
        match step {
            Step::ServiceAccount => Phase::CreatingServiceAccount,
            Step::RulesRole => Phase::CreatingRules,
            Step::AggregatedRole => Phase::CreatingRole,
            Step::Token => Phase::IssuingToken,
            Step::RoleBinding => Phase::CreatingBinding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(Step::ServiceAccount.to_string(), "service-account");
        assert_eq!(Step::RoleBinding.to_string(), "role-binding");
        assert_eq!(serde_json::to_string(&Step::AggregatedRole).unwrap(), "\"aggregated-role\"");
    }

    #[test]
    fn test_steps_map_to_running_phases() {
        for step in [
            Step::ServiceAccount,
            Step::RulesRole,
            Step::AggregatedRole,
            Step::Token,
            Step::RoleBinding,
        ] {
            assert!(!Phase::from(step).is_terminal());
        }
        assert!(Phase::Done.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(!Phase::RollingBack.is_terminal());
    }
}
