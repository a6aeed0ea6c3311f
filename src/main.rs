// Copyright 2024 RustFS Team
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

use clap::{Parser, Subcommand};
use provisioner::OutputFormat;
use provisioner::config::{ProvisionerArgs, ProvisionerConfig};

shadow_rs::shadow!(build);

#[derive(Parser)]
#[command(name = "rbac-provisioner")]
#[command(about = "Provisions service accounts with scoped cluster roles", long_about = None)]
#[command(version = build::PKG_VERSION)]
struct Cli {
    #[command(flatten)]
    provisioner: ProvisionerArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the service account, roles and binding for an identity and print its credentials
    Provision {
        /// Kubeconfig of the target cluster
        #[arg(long)]
        kubeconfig: String,

        #[arg(long)]
        identity: String,

        /// runtimeAdmin or runtimeOperator
        #[arg(long)]
        privilege_level: String,

        #[arg(long)]
        tenant: String,

        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Delete everything provisioned for an identity
    Cleanup {
        #[arg(long)]
        kubeconfig: String,

        #[arg(long)]
        identity: String,
    },

    /// Run the HTTP console
    Server {
        #[arg(long, default_value_t = 9090)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // TLS provider for the kube client; a second install attempt is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();
    provisioner::init_tracing();

    tracing::info!(
        "rbac-provisioner {} ({} built {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BUILD_TIME
    );

    let config: ProvisionerConfig = cli.provisioner.into();

    match cli.command {
        Commands::Provision {
            kubeconfig,
            identity,
            privilege_level,
            tenant,
            output,
            format,
        } => {
            provisioner::provision(
                kubeconfig,
                identity,
                privilege_level,
                tenant,
                config,
                output,
                format,
            )
            .await?
        }
        Commands::Cleanup {
            kubeconfig,
            identity,
        } => provisioner::cleanup(kubeconfig, identity, config).await?,
        Commands::Server { port } => provisioner::server(port, config).await?,
    }

    Ok(())
}
