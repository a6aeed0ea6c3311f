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

use crate::types::error::{Error, IncompleteKubeconfigSnafu};
use chrono::{DateTime, Utc};
use kube::config::Kubeconfig;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;

/// Bearer token issued for a provisioned service account.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Everything a downstream renderer needs to assemble a credential document.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMaterial {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    pub context_name: String,
}

/// The cluster a kubeconfig bundle currently points at.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEndpoint {
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    pub context_name: String,
}

impl ClusterEndpoint {
    /// Follows current-context to its cluster entry.
    pub fn from_kubeconfig(kubeconfig: &Kubeconfig) -> Result<Self, Error> {
        let context_name = kubeconfig
            .current_context
            .clone()
            .context(IncompleteKubeconfigSnafu {
                message: "no current-context",
            })?;

        let cluster_name = kubeconfig
            .contexts
            .iter()
            .find(|named| named.name == context_name)
            .and_then(|named| named.context.as_ref())
            .map(|context| context.cluster.clone())
            .context(IncompleteKubeconfigSnafu {
                message: format!("context '{}' not found", context_name),
            })?;

        let cluster = kubeconfig
            .clusters
            .iter()
            .find(|named| named.name == cluster_name)
            .and_then(|named| named.cluster.as_ref())
            .context(IncompleteKubeconfigSnafu {
                message: format!("cluster '{}' not found", cluster_name),
            })?;

        let server = cluster.server.clone().context(IncompleteKubeconfigSnafu {
            message: format!("cluster '{}' has no server", cluster_name),
        })?;

        Ok(Self {
            server,
            certificate_authority_data: cluster.certificate_authority_data.clone(),
            context_name,
        })
    }
}

impl CredentialMaterial {
    pub fn new(endpoint: ClusterEndpoint, token: ProvisionedToken) -> Self {
        Self {
            token: token.token,
            expires_at: token.expires_at,
            server: endpoint.server,
            certificate_authority_data: endpoint.certificate_authority_data,
            context_name: endpoint.context_name,
        }
    }

    /// Pairs a token with the cluster endpoint of the bundle's current context.
    pub fn from_kubeconfig(
        kubeconfig: &Kubeconfig,
        token: ProvisionedToken,
    ) -> Result<Self, Error> {
        Ok(Self::new(ClusterEndpoint::from_kubeconfig(kubeconfig)?, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kubeconfig_uses_current_context() {
        let kubeconfig = Kubeconfig::from_yaml(crate::tests::TEST_KUBECONFIG).unwrap();
        let token = crate::tests::create_test_token();

        let material = CredentialMaterial::from_kubeconfig(&kubeconfig, token.clone()).unwrap();

        assert_eq!(material.token, token.token);
        assert_eq!(material.expires_at, token.expires_at);
        assert_eq!(material.server, "https://api.tenant-1.example.com:6443");
        assert_eq!(material.certificate_authority_data, Some("Q0FEQVRB".to_string()));
        assert_eq!(material.context_name, "tenant-1");
    }

    #[test]
    fn test_from_kubeconfig_without_current_context() {
        let mut kubeconfig = Kubeconfig::from_yaml(crate::tests::TEST_KUBECONFIG).unwrap();
        kubeconfig.current_context = None;

        let token = crate::tests::create_test_token();
        let err = CredentialMaterial::from_kubeconfig(&kubeconfig, token).unwrap_err();

        assert!(matches!(err, Error::IncompleteKubeconfig { .. }));
    }

    #[test]
    fn test_from_kubeconfig_with_dangling_context() {
        let mut kubeconfig = Kubeconfig::from_yaml(crate::tests::TEST_KUBECONFIG).unwrap();
        kubeconfig.current_context = Some("missing".to_string());

        let token = crate::tests::create_test_token();
        let err = CredentialMaterial::from_kubeconfig(&kubeconfig, token).unwrap_err();

        assert!(err.to_string().contains("context 'missing' not found"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let kubeconfig = Kubeconfig::from_yaml(crate::tests::TEST_KUBECONFIG).unwrap();
        let material =
            CredentialMaterial::from_kubeconfig(&kubeconfig, crate::tests::create_test_token())
                .unwrap();

        let value = serde_json::to_value(&material).unwrap();
        assert!(value.get("expiresAt").is_some());
        assert!(value.get("certificateAuthorityData").is_some());
        assert!(value.get("contextName").is_some());
    }
}
