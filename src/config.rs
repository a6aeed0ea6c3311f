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

use crate::retry::RetryPolicy;
use crate::types::identity::DEFAULT_NAMESPACE;
use clap::Args;
use std::time::Duration;

const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(8 * 3600);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionerConfig {
    /// Namespace the service accounts live in.
    pub namespace: String,
    pub token_expiry: Duration,
    /// Deletion retry used when rolling back or tearing down.
    pub retry: RetryPolicy,
    /// Upper bound for one provisioning run, checked between steps.
    pub deadline: Option<Duration>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
            retry: RetryPolicy::default(),
            deadline: None,
        }
    }
}

impl ProvisionerConfig {
    pub fn token_expiry_seconds(&self) -> i64 {
        i64::try_from(self.token_expiry.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Command line flags shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct ProvisionerArgs {
    /// Namespace for provisioned service accounts
    #[arg(long, global = true, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Lifetime of issued tokens, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TOKEN_EXPIRY.as_secs())]
    pub token_expiry_seconds: u64,

    /// Deletion attempts per resource kind during cleanup
    #[arg(long, global = true, default_value_t = 20)]
    pub cleanup_attempts: u32,

    /// Delay between deletion attempts, in seconds
    #[arg(long, global = true, default_value_t = 15)]
    pub cleanup_delay_seconds: u64,

    /// Give up provisioning after this many seconds (checked between steps)
    #[arg(long, global = true)]
    pub deadline_seconds: Option<u64>,
}

impl From<ProvisionerArgs> for ProvisionerConfig {
    fn from(args: ProvisionerArgs) -> Self {
        Self {
            namespace: args.namespace,
            token_expiry: Duration::from_secs(args.token_expiry_seconds),
            retry: RetryPolicy::new(
                args.cleanup_attempts,
                Duration::from_secs(args.cleanup_delay_seconds),
            ),
            deadline: args.deadline_seconds.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ProvisionerArgs,
    }

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = TestCli::parse_from(["test"]);
        let config = ProvisionerConfig::from(cli.args);

        assert_eq!(config, ProvisionerConfig::default());
        assert_eq!(config.token_expiry_seconds(), 28800);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--namespace",
            "tenants",
            "--token-expiry-seconds",
            "600",
            "--cleanup-attempts",
            "3",
            "--cleanup-delay-seconds",
            "1",
            "--deadline-seconds",
            "30",
        ]);
        let config = ProvisionerConfig::from(cli.args);

        assert_eq!(config.namespace, "tenants");
        assert_eq!(config.token_expiry, Duration::from_secs(600));
        assert_eq!(config.retry, RetryPolicy::new(3, Duration::from_secs(1)));
        assert_eq!(config.deadline, Some(Duration::from_secs(30)));
    }
}
