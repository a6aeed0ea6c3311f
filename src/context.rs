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

use crate::types::credential::ProvisionedToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::Resource as _;
use k8s_openapi::api::authentication::v1 as authv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::rbac::v1 as rbacv1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::api::{Api, DeleteParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::futures::TryFutureExt;
use snafu::{OptionExt, ResultExt, Snafu};
use std::fmt::Debug;
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(display("{} '{}' not found", kind, name))]
    NotFound { kind: String, name: String },

    #[snafu(display("{} '{}' still exists after deletion", kind, name))]
    StillPresent { kind: String, name: String },

    #[snafu(display("invalid kubeconfig: {}", source))]
    Kubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("token request for service account '{}' returned no token", name))]
    MissingToken { name: String },

    #[snafu(display(
        "token request for service account '{}' returned unreadable expiry '{}'",
        name,
        value
    ))]
    InvalidTokenExpiry { name: String, value: String },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Treats a deletion that found nothing to delete as done.
pub(crate) fn ignore_not_found(result: Result<(), Error>) -> Result<(), Error> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

/// The backing store: get, create and delete for the three resource kinds an identity owns,
/// plus token issuance.
///
/// Absence is explicit. `get_*` returns `Ok(None)` and `delete_*` returns [`Error::NotFound`],
/// so callers can tell "not there" apart from transport or authorization failures.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<corev1::ServiceAccount>, Error>;

    async fn create_service_account(&self, sa: &corev1::ServiceAccount) -> Result<(), Error>;

    async fn delete_service_account(&self, namespace: &str, name: &str) -> Result<(), Error>;

    async fn get_cluster_role(&self, name: &str) -> Result<Option<rbacv1::ClusterRole>, Error>;

    async fn create_cluster_role(&self, role: &rbacv1::ClusterRole) -> Result<(), Error>;

    async fn delete_cluster_role(&self, name: &str) -> Result<(), Error>;

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<rbacv1::ClusterRoleBinding>, Error>;

    async fn create_cluster_role_binding(
        &self,
        binding: &rbacv1::ClusterRoleBinding,
    ) -> Result<(), Error>;

    async fn delete_cluster_role_binding(&self, name: &str) -> Result<(), Error>;

    /// Issues a bearer token for `namespace/name` through the `token` subresource.
    async fn create_token(
        &self,
        namespace: &str,
        name: &str,
        request: &authv1::TokenRequest,
    ) -> Result<ProvisionedToken, Error>;
}

/// [`Store`] backed by a live Kubernetes API server.
#[derive(Clone)]
pub struct Context {
    pub(crate) client: kube::Client,
}

impl Context {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    /// Builds a client from a raw kubeconfig bundle. The parsed bundle is handed back so the
    /// caller can read its cluster endpoint.
    pub async fn from_kubeconfig_yaml(yaml: &str) -> Result<(Self, Kubeconfig), Error> {
        let kubeconfig = Kubeconfig::from_yaml(yaml).context(KubeconfigSnafu)?;
        let config =
            kube::Config::from_custom_kubeconfig(kubeconfig.clone(), &KubeConfigOptions::default())
                .context(KubeconfigSnafu)
                .await?;
        let client = kube::Client::try_from(config).context(KubeSnafu)?;
        Ok((Self::new(client), kubeconfig))
    }

    fn namespaced<T>(&self, namespace: &str) -> Api<T>
    where
        T: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn cluster<T>(&self) -> Api<T>
    where
        T: kube::Resource<Scope = k8s_openapi::ClusterResourceScope>,
        <T as kube::Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }

    async fn get<T>(api: Api<T>, name: &str) -> Result<Option<T>, Error>
    where
        T: Clone + DeserializeOwned + Debug + kube::Resource,
    {
        api.get_opt(name).context(KubeSnafu).await
    }

    async fn create<T>(api: Api<T>, resource: &T) -> Result<(), Error>
    where
        T: Clone + Serialize + DeserializeOwned + Debug + kube::Resource,
    {
        api.create(&PostParams::default(), resource)
            .context(KubeSnafu)
            .await?;
        Ok(())
    }

    async fn delete<T>(api: Api<T>, kind: &str, name: &str) -> Result<(), Error>
    where
        T: Clone + DeserializeOwned + Debug + kube::Resource,
    {
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|source| classify(source, kind, name))?;
        debug!("{} '{}' deleted", kind, name);
        Ok(())
    }
}

/// Maps a 404 from the API server onto [`Error::NotFound`].
fn classify(source: kube::Error, kind: &str, name: &str) -> Error {
    match source {
        kube::Error::Api(ref response) if response.code == 404 => Error::NotFound {
            kind: kind.to_owned(),
            name: name.to_owned(),
        },
        source => Error::Kube { source },
    }
}

fn expiry(name: &str, time: &metav1::Time) -> Result<DateTime<Utc>, Error> {
    let timestamp = time.0;
    DateTime::from_timestamp(timestamp.as_second(), 0)
        .map(|t| t + chrono::Duration::nanoseconds(i64::from(timestamp.subsec_nanosecond())))
        .context(InvalidTokenExpirySnafu {
            name,
            value: timestamp.to_string(),
        })
}

#[async_trait]
impl Store for Context {
    async fn get_service_account(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<corev1::ServiceAccount>, Error> {
        Self::get(self.namespaced(namespace), name).await
    }

    async fn create_service_account(&self, sa: &corev1::ServiceAccount) -> Result<(), Error> {
        let namespace = sa.metadata.namespace.clone().unwrap_or_default();
        Self::create(self.namespaced(&namespace), sa).await
    }

    async fn delete_service_account(&self, namespace: &str, name: &str) -> Result<(), Error> {
        Self::delete::<corev1::ServiceAccount>(
            self.namespaced(namespace),
            corev1::ServiceAccount::KIND,
            name,
        )
        .await
    }

    async fn get_cluster_role(&self, name: &str) -> Result<Option<rbacv1::ClusterRole>, Error> {
        Self::get(self.cluster(), name).await
    }

    async fn create_cluster_role(&self, role: &rbacv1::ClusterRole) -> Result<(), Error> {
        Self::create(self.cluster(), role).await
    }

    async fn delete_cluster_role(&self, name: &str) -> Result<(), Error> {
        Self::delete::<rbacv1::ClusterRole>(self.cluster(), rbacv1::ClusterRole::KIND, name).await
    }

    async fn get_cluster_role_binding(
        &self,
        name: &str,
    ) -> Result<Option<rbacv1::ClusterRoleBinding>, Error> {
        Self::get(self.cluster(), name).await
    }

    async fn create_cluster_role_binding(
        &self,
        binding: &rbacv1::ClusterRoleBinding,
    ) -> Result<(), Error> {
        Self::create(self.cluster(), binding).await
    }

    async fn delete_cluster_role_binding(&self, name: &str) -> Result<(), Error> {
        Self::delete::<rbacv1::ClusterRoleBinding>(
            self.cluster(),
            rbacv1::ClusterRoleBinding::KIND,
            name,
        )
        .await
    }

    async fn create_token(
        &self,
        namespace: &str,
        name: &str,
        request: &authv1::TokenRequest,
    ) -> Result<ProvisionedToken, Error> {
        let api: Api<corev1::ServiceAccount> = self.namespaced(namespace);

        let response: authv1::TokenRequest = api
            .create_subresource("token", name, &PostParams::default(), request)
            .await
            .map_err(|source| classify(source, corev1::ServiceAccount::KIND, name))?;

        let status = response
            .status
            .filter(|status| !status.token.is_empty())
            .context(MissingTokenSnafu { name })?;

        Ok(ProvisionedToken {
            expires_at: expiry(name, &status.expiration_timestamp)?,
            token: status.token,
        })
    }
}
