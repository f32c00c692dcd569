//! Failover group command handlers.

use admon_core::{AdmonConfig, Node, NodeCollection, NodeRegistry, NodeType};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, NodeRow};

// ── Summary ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GroupSummary {
    name: String,
    metadata: usize,
    storage: usize,
}

impl GroupSummary {
    fn of(registry: &NodeRegistry, name: String) -> Self {
        Self {
            metadata: registry.get_nodes(&name, NodeType::Metadata).len(),
            storage: registry.get_nodes(&name, NodeType::Storage).len(),
            name,
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    name: String,
    #[tabled(rename = "Metadata")]
    metadata: usize,
    #[tabled(rename = "Storage")]
    storage: usize,
}

impl From<&GroupSummary> for GroupRow {
    fn from(g: &GroupSummary) -> Self {
        Self {
            name: g.name.clone(),
            metadata: g.metadata,
            storage: g.storage,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: &AdmonConfig,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let registry = util::load_registry(config).await?;

    match args.command {
        GroupsCommand::List => {
            let summaries: Vec<GroupSummary> = registry
                .group_names()
                .into_iter()
                .map(|name| GroupSummary::of(&registry, name))
                .collect();

            let out = output::render_list(
                &global.output,
                &summaries,
                |g| GroupRow::from(g),
                |g| g.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Show { name } => {
            let nodes = registry.group_members(&name)?.to_vec();
            let out = output::render_list(
                &global.output,
                &nodes,
                |n| NodeRow::from(n),
                Node::typed_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
