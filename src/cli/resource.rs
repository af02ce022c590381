//! Verb subcommands shared by every resource

use super::display::Printer;
use super::executor::{Mutation, ResourceExecutor, WaitMode};
use crate::domain::resource::ParentIds;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};

/// Identifiers of the parent resources of nested collections.
#[derive(Args, Debug, Clone, Default)]
pub struct ParentArgs {
    /// Kubernetes cluster ID (k8s nodepool, k8s node)
    #[arg(long)]
    pub cluster_id: Option<String>,

    /// Node pool ID (k8s node)
    #[arg(long)]
    pub nodepool_id: Option<String>,

    /// Group ID (share)
    #[arg(long)]
    pub group_id: Option<String>,
}

impl From<ParentArgs> for ParentIds {
    fn from(args: ParentArgs) -> Self {
        ParentIds {
            cluster_id: args.cluster_id,
            nodepool_id: args.nodepool_id,
            group_id: args.group_id,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct MutationArgs {
    /// Resource name
    #[arg(long)]
    pub name: Option<String>,

    /// Resource property (-p key=value), dotted keys build nested objects
    ///
    /// Example: -p location=de/fra -p maintenanceWindow.dayOfTheWeek=Monday
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Wait until the request triggered by this call is DONE
    #[arg(long, conflicts_with = "wait_for_state")]
    pub wait_for_request: bool,

    /// Wait until the resource reaches its ready state
    #[arg(long)]
    pub wait_for_state: bool,

    /// Maximum seconds to wait (0 or unset uses the resource default)
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl MutationArgs {
    fn to_mutation(&self) -> Mutation {
        let wait = if self.wait_for_request {
            WaitMode::Request
        } else if self.wait_for_state {
            WaitMode::State
        } else {
            WaitMode::None
        };

        Mutation {
            name: self.name.clone(),
            properties: self.properties.clone(),
            wait,
            timeout: self.timeout,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub parents: ParentArgs,

    /// Maximum number of results to show
    #[arg(long, short = 'M')]
    pub max_results: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    /// Resource ID
    #[arg(long, short = 'i')]
    pub id: String,

    #[command(flatten)]
    pub parents: ParentArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    #[command(flatten)]
    pub parents: ParentArgs,

    /// ID of the resource to share (share only)
    #[arg(long)]
    pub resource_id: Option<String>,

    #[command(flatten)]
    pub mutation: MutationArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Resource ID
    #[arg(long, short = 'i')]
    pub id: String,

    #[command(flatten)]
    pub parents: ParentArgs,

    #[command(flatten)]
    pub mutation: MutationArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Resource ID
    #[arg(long, short = 'i', required_unless_present = "all", conflicts_with = "all")]
    pub id: Option<String>,

    /// Delete every resource in the collection
    #[arg(long, short = 'a')]
    pub all: bool,

    #[command(flatten)]
    pub parents: ParentArgs,

    /// Wait until the request triggered by this call is DONE
    #[arg(long, conflicts_with = "wait_for_deletion")]
    pub wait_for_request: bool,

    /// Wait until the resource no longer exists
    #[arg(long)]
    pub wait_for_deletion: bool,

    /// Maximum seconds to wait (0 or unset uses the resource default)
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl DeleteArgs {
    fn wait_mode(&self) -> WaitMode {
        if self.wait_for_request {
            WaitMode::Request
        } else if self.wait_for_deletion {
            WaitMode::Deletion
        } else {
            WaitMode::None
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct WaitArgs {
    /// Request ID or resource ID to wait on
    #[arg(long, short = 'i')]
    pub id: String,

    #[command(flatten)]
    pub parents: ParentArgs,

    /// Maximum seconds to wait (0 or unset uses the resource default)
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum VerbCommand {
    /// List resources
    List(ListArgs),

    /// Show one resource
    Get(GetArgs),

    /// Create a resource
    Create(CreateArgs),

    /// Update a resource
    Update(UpdateArgs),

    /// Delete a resource, or all of them with --all
    Delete(DeleteArgs),

    /// Wait for a request to finish or a resource to become ready
    Wait(WaitArgs),
}

impl VerbCommand {
    pub fn parents(&self) -> ParentIds {
        let parents = match self {
            VerbCommand::List(args) => &args.parents,
            VerbCommand::Get(args) => &args.parents,
            VerbCommand::Create(args) => &args.parents,
            VerbCommand::Update(args) => &args.parents,
            VerbCommand::Delete(args) => &args.parents,
            VerbCommand::Wait(args) => &args.parents,
        };
        parents.clone().into()
    }

    pub async fn execute(&self, executor: &ResourceExecutor, printer: &Printer) -> anyhow::Result<()> {
        let kind = executor.kind();
        match self {
            VerbCommand::List(args) => {
                let listing = executor
                    .list(args.max_results)
                    .await
                    .with_context(|| format!("Failed to list {} resources", kind))?;
                printer.print_resources(kind, &listing)?;
            }
            VerbCommand::Get(args) => {
                let resource = executor
                    .get(&args.id)
                    .await
                    .with_context(|| format!("Failed to get {} {}", kind, args.id))?;
                printer.print_resources(kind, &resource)?;
            }
            VerbCommand::Create(args) => {
                let created = executor
                    .create(args.resource_id.as_deref(), &args.mutation.to_mutation())
                    .await
                    .with_context(|| format!("Failed to create {}", kind))?;
                printer.print_resources(kind, &created)?;
            }
            VerbCommand::Update(args) => {
                let updated = executor
                    .update(&args.id, &args.mutation.to_mutation())
                    .await
                    .with_context(|| format!("Failed to update {} {}", kind, args.id))?;
                printer.print_resources(kind, &updated)?;
            }
            VerbCommand::Delete(args) => {
                let messages = match (&args.id, args.all) {
                    (_, true) => executor
                        .delete_all(args.wait_mode(), args.timeout)
                        .await
                        .with_context(|| format!("Failed to delete all {} resources", kind))?,
                    (Some(id), false) => vec![executor
                        .delete(id, args.wait_mode(), args.timeout)
                        .await
                        .with_context(|| format!("Failed to delete {} {}", kind, id))?],
                    (None, false) => anyhow::bail!("either --id or --all is required"),
                };
                for message in messages {
                    printer.print_message(&message)?;
                }
            }
            VerbCommand::Wait(args) => {
                let message = executor
                    .wait(&args.id, args.timeout)
                    .await
                    .with_context(|| format!("Failed waiting on {} {}", kind, args.id))?;
                printer.print_message(&message)?;
            }
        }
        Ok(())
    }
}
