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
use strum::{Display, EnumIter, IntoEnumIterator};

/// Resource kinds tracked for rollback.
///
/// `ClusterRole` covers both the rules-role and the aggregating role; they are created
/// and removed as one concern.
#[derive(
    Deserialize,
    Serialize,
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum ResourceKind {
    #[strum(to_string = "ServiceAccount")]
    ServiceAccount,

    #[strum(to_string = "ClusterRole")]
    ClusterRole,

    #[strum(to_string = "ClusterRoleBinding")]
    ClusterRoleBinding,
}

/// Ordered record of the kinds committed during one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RollbackLedger {
    kinds: Vec<ResourceKind>,
}

impl RollbackLedger {
    /// Every kind an identity can own, for an explicit teardown.
    pub fn full() -> Self {
        Self {
            kinds: ResourceKind::iter().collect(),
        }
    }

    /// Records a committed kind. Recording the same kind twice is a no-op.
    pub fn record(&mut self, kind: ResourceKind) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }

    /// Hands the recorded kinds over, leaving the ledger empty.
    pub fn take(&mut self) -> Vec<ResourceKind> {
        std::mem::take(&mut self.kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order_and_dedupes() {
        let mut ledger = RollbackLedger::default();
        ledger.record(ResourceKind::ServiceAccount);
        ledger.record(ResourceKind::ClusterRole);
        ledger.record(ResourceKind::ClusterRole);

        assert_eq!(
            ledger.kinds(),
            &[ResourceKind::ServiceAccount, ResourceKind::ClusterRole]
        );
    }

    #[test]
    fn test_take_clears() {
        let mut ledger = RollbackLedger::full();
        assert_eq!(ledger.kinds().len(), 3);

        let kinds = ledger.take();
        assert_eq!(kinds.len(), 3);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ResourceKind::ServiceAccount.to_string(), "ServiceAccount");
        assert_eq!(ResourceKind::ClusterRole.to_string(), "ClusterRole");
        assert_eq!(
            ResourceKind::ClusterRoleBinding.to_string(),
            "ClusterRoleBinding"
        );
    }
}
