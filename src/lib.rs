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
use crate::types::credential::CredentialMaterial;
use clap::ValueEnum;
use std::pin::Pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

pub mod cleanup;
pub mod config;
pub mod console;
pub mod context;
pub mod credentials;
pub mod provision;
pub mod reconcile;
pub mod retry;
pub mod types;


/// Serialization used for credential material on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Provisions one identity and writes its credential material to `output`, or stdout.
pub async fn provision(
    kubeconfig: String,
    identity: String,
    privilege_level: String,
    tenant: String,
    config: ProvisionerConfig,
    output: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = tokio::fs::read_to_string(&kubeconfig).await?;

    let material =
        credentials::issue_credentials(&bundle, &identity, &privilege_level, &tenant, &config)
            .await?;

    write_material(&material, output, format).await
}

/// Removes every resource provisioned for `identity`.
pub async fn cleanup(
    kubeconfig: String,
    identity: String,
    config: ProvisionerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let bundle = tokio::fs::read_to_string(&kubeconfig).await?;
    credentials::revoke_credentials(&bundle, &identity, &config).await?;
    Ok(())
}

pub async fn server(
    port: u16,
    config: ProvisionerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    console::server::run(port, config).await
}

async fn write_material(
    material: &CredentialMaterial,
    file: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(material)?,
        OutputFormat::Json => serde_json::to_string_pretty(material)? + "\n",
    };

    writer.write_all(rendered.as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}
