// CLI command definitions

use super::display::{OutputFormat, Printer};
use super::executor::ResourceExecutor;
use super::resource::VerbCommand;
use crate::domain::config::{Settings, SettingsOverrides};
use crate::domain::resource::ResourceKind;
use crate::infrastructure::api::{CloudApiClient, HttpCloudApiClient};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "cloudctl",
    version,
    about = "Command line tool for cloud infrastructure resources",
    long_about = "Manage datacenters, Kubernetes clusters and other cloud resources through the \
                  provider's REST API, optionally waiting for asynchronous requests to finish"
)]
pub struct CliArgs {
    /// Path to the configuration file (default: ~/.cloudctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API base URL (overrides CLOUDCTL_API_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Omit table headers
    #[arg(long, global = true)]
    pub no_headers: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Virtual data centers
    Datacenter {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Physical locations
    Location {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Asynchronous API requests
    Request {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Managed Kubernetes clusters, node pools and nodes
    K8s {
        #[command(subcommand)]
        resource: K8sCommands,
    },

    /// Snapshots
    Snapshot {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Labels
    Label {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Private cross-connects
    Pcc {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Users
    User {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Groups
    Group {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Resources shared with a group
    Share {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Backup units
    Backupunit {
        #[command(subcommand)]
        verb: VerbCommand,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum K8sCommands {
    /// Kubernetes clusters
    Cluster {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Node pools of a cluster
    Nodepool {
        #[command(subcommand)]
        verb: VerbCommand,
    },

    /// Nodes of a node pool
    Node {
        #[command(subcommand)]
        verb: VerbCommand,
    },
}

impl Commands {
    pub fn target(&self) -> (ResourceKind, &VerbCommand) {
        match self {
            Commands::Datacenter { verb } => (ResourceKind::Datacenter, verb),
            Commands::Location { verb } => (ResourceKind::Location, verb),
            Commands::Request { verb } => (ResourceKind::Request, verb),
            Commands::K8s { resource } => match resource {
                K8sCommands::Cluster { verb } => (ResourceKind::K8sCluster, verb),
                K8sCommands::Nodepool { verb } => (ResourceKind::K8sNodePool, verb),
                K8sCommands::Node { verb } => (ResourceKind::K8sNode, verb),
            },
            Commands::Snapshot { verb } => (ResourceKind::Snapshot, verb),
            Commands::Label { verb } => (ResourceKind::Label, verb),
            Commands::Pcc { verb } => (ResourceKind::Pcc, verb),
            Commands::User { verb } => (ResourceKind::User, verb),
            Commands::Group { verb } => (ResourceKind::Group, verb),
            Commands::Share { verb } => (ResourceKind::Share, verb),
            Commands::Backupunit { verb } => (ResourceKind::BackupUnit, verb),
        }
    }
}

impl CliArgs {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_file: self.config.clone(),
            api_url: self.api_url.clone(),
        }
    }

    pub async fn execute(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let settings =
            Settings::resolve(&self.overrides()).context("Failed to load configuration")?;
        debug!(api_url = %settings.api_url, "Resolved settings");

        let client: Arc<dyn CloudApiClient> = Arc::new(
            HttpCloudApiClient::new(&settings).context("Failed to create API client")?,
        );

        let (kind, verb) = self.command.target();
        let executor =
            ResourceExecutor::new(client, kind, verb.parents()).with_cancellation(cancel);
        let printer = Printer::new(self.output, !self.no_headers);

        verb.execute(&executor, &printer).await
    }
}
