//! Node command handlers.

use admon_core::{AdmonConfig, Node, NodeType};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, NodeRow};

fn detail(node: &Node) -> String {
    output::detail_lines(&[
        ("ID", node.id.clone()),
        ("Num ID", node.num_id.to_string()),
        ("Type", node.node_type.to_string()),
        ("Group", node.group.clone()),
        ("Typed ID", node.typed_id()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: &AdmonConfig,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let registry = util::load_registry(config).await?;

    match args.command {
        NodesCommand::List { node_type, group } => {
            let mut nodes = match node_type {
                Some(t) => registry.nodes(NodeType::from(t)).to_vec(),
                None => registry.all_nodes(),
            };
            if let Some(ref group) = group {
                nodes.retain(|n| &n.group == group);
            }

            let out = output::render_list(
                &global.output,
                &nodes,
                |n| NodeRow::from(n),
                Node::typed_id,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NodesCommand::Get { id, node_type } => {
            let node = util::resolve_node(&registry, &id, node_type.into())?.snapshot();
            let out = output::render_single(&global.output, &node, detail, Node::typed_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
