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

use crate::cleanup::{self, Cleaner};
use crate::config::ProvisionerConfig;
use crate::context::{self, Store};
use crate::reconcile;
use crate::types;
use crate::types::credential::ProvisionedToken;
use crate::types::identity::Identity;
use crate::types::ledger::{ResourceKind, RollbackLedger};
use crate::types::phase::{Phase, Step};
use crate::types::privilege::PrivilegeLevel;
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Types { source: types::error::Error },

    #[snafu(display("step '{}' failed: {}", step, source))]
    StepFailed {
        step: Step,
        source: context::Error,
    },

    #[snafu(display("deadline exceeded before step '{}'", step))]
    DeadlineExceeded { step: Step },

    #[snafu(display("{}; rollback incomplete: {}", source, cleanup))]
    RollbackIncomplete {
        source: Box<Error>,
        cleanup: cleanup::Error,
    },
}

impl Error {
    /// The pipeline step that failed, if the run got that far.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Types { .. } => None,
            Error::StepFailed { step, .. } | Error::DeadlineExceeded { step } => Some(*step),
            Error::RollbackIncomplete { source, .. } => source.step(),
        }
    }
}

/// Drives the provisioning pipeline for one identity and rolls back on failure.
pub struct Provisioner {
    store: Arc<dyn Store>,
    cleaner: Cleaner,
    config: ProvisionerConfig,
}

impl Provisioner {
    pub fn new(store: Arc<dyn Store>, config: ProvisionerConfig) -> Self {
        let cleaner = Cleaner::new(Arc::clone(&store), config.retry);
        Self {
            store,
            cleaner,
            config,
        }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    /// Same as [`Provisioner::provision`], for a level that still has to be parsed.
    /// An unknown level fails before anything is read or written.
    pub async fn provision_str(
        &self,
        identity: &Identity,
        level: &str,
    ) -> Result<ProvisionedToken, Error> {
        let level = PrivilegeLevel::parse(level)?;
        self.provision(identity, level).await
    }

    /// Lays down the service account, both cluster roles and the binding, and issues a token.
    ///
    /// Re-running against a partially or fully provisioned identity converges. If a step
    /// fails, every kind committed so far is deleted before the step error is returned; a
    /// rollback that cannot finish is reported alongside it.
    pub async fn provision(
        &self,
        identity: &Identity,
        level: PrivilegeLevel,
    ) -> Result<ProvisionedToken, Error> {
        info!(
            "{}: provisioning {} as {}",
            Phase::Start,
            identity.name(),
            level
        );

        let mut ledger = RollbackLedger::default();
        let result = self.run_steps(identity, level, &mut ledger).await;

        match result {
            Ok(token) => {
                // committed for good; nothing left to undo
                ledger.take();
                info!("{}: {} provisioned", Phase::Done, identity.name());
                Ok(token)
            }
            Err(e) => {
                error!(
                    "{}: {} failed ({}), undoing {:?}",
                    Phase::RollingBack,
                    identity.name(),
                    e,
                    ledger.kinds()
                );
                let rollback = self.cleaner.cleanup(identity, &mut ledger).await;
                error!("{}: {}", Phase::Failed, identity.name());

                match rollback {
                    Ok(()) => Err(e),
                    Err(cleanup) => Err(Error::RollbackIncomplete {
                        source: Box::new(e),
                        cleanup,
                    }),
                }
            }
        }
    }

    /// The pipeline proper. Each kind is recorded in `ledger` as soon as its step commits.
    pub(crate) async fn run_steps(
        &self,
        identity: &Identity,
        level: PrivilegeLevel,
        ledger: &mut RollbackLedger,
    ) -> Result<ProvisionedToken, Error> {
        let store = self.store.as_ref();
        // a deadline too far out to represent is no deadline at all
        let deadline = self
            .config
            .deadline
            .and_then(|d| Instant::now().checked_add(d));

        self.enter(Step::ServiceAccount, identity, deadline)?;
        reconcile::ensure_service_account(store, identity)
            .await
            .context(StepFailedSnafu {
                step: Step::ServiceAccount,
            })?;
        ledger.record(ResourceKind::ServiceAccount);

        self.enter(Step::RulesRole, identity, deadline)?;
        reconcile::ensure_rules_role(store, identity, level)
            .await
            .context(StepFailedSnafu {
                step: Step::RulesRole,
            })?;
        ledger.record(ResourceKind::ClusterRole);

        self.enter(Step::AggregatedRole, identity, deadline)?;
        reconcile::ensure_aggregated_role(store, identity, level)
            .await
            .context(StepFailedSnafu {
                step: Step::AggregatedRole,
            })?;
        ledger.record(ResourceKind::ClusterRole);

        self.enter(Step::Token, identity, deadline)?;
        let request = identity.new_token_request(self.config.token_expiry_seconds());
        let token = store
            .create_token(
                identity.namespace(),
                &identity.service_account_name(),
                &request,
            )
            .await
            .context(StepFailedSnafu { step: Step::Token })?;

        self.enter(Step::RoleBinding, identity, deadline)?;
        reconcile::ensure_role_binding(store, identity)
            .await
            .context(StepFailedSnafu {
                step: Step::RoleBinding,
            })?;
        ledger.record(ResourceKind::ClusterRoleBinding);

        Ok(token)
    }

    fn enter(
        &self,
        step: Step,
        identity: &Identity,
        deadline: Option<Instant>,
    ) -> Result<(), Error> {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return DeadlineExceededSnafu { step }.fail();
        }
        info!("{}: {}", Phase::from(step), identity.name());
        Ok(())
    }
}
