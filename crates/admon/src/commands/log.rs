//! Remote log file handler.

use admon_api::LogService;
use admon_core::{AdmonConfig, TypedNodeId, parse_typed_node_id};
use serde::Serialize;

use crate::cli::{GlobalOpts, LogArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct LogFile {
    service: String,
    node: Option<String>,
    lines: u32,
    log: String,
}

/// Which node's log to request, from the positional argument and
/// `--num-id`.
fn target_node(args: &LogArgs) -> Result<Option<TypedNodeId>, CliError> {
    let Some(ref node) = args.node else {
        return match LogService::from(args.service) {
            LogService::Admon => Ok(None),
            service => Err(CliError::Validation {
                field: "node".into(),
                reason: format!("a node is required for {service} logs"),
            }),
        };
    };

    if let Ok(typed) = parse_typed_node_id(node) {
        return Ok(Some(typed));
    }
    match args.num_id {
        Some(num_id) => Ok(Some(TypedNodeId::new(node.clone(), num_id))),
        None => Err(CliError::Validation {
            field: "node".into(),
            reason: format!(
                "expected \"<id> [ID: <num>]\" or --num-id with a plain ID, got '{node}'"
            ),
        }),
    }
}

pub async fn handle(config: &AdmonConfig, args: LogArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = target_node(&args)?;
    let service = LogService::from(args.service);
    let client = config.client()?;

    let log = match target {
        Some(ref node) => {
            client
                .remote_log_file(service, &node.id, node.num_id, args.lines)
                .await?
        }
        None => client.admon_log_file().await?,
    };

    let file = LogFile {
        service: service.to_string(),
        node: target.as_ref().map(ToString::to_string),
        lines: args.lines,
        log,
    };
    let out = output::render_single(&global.output, &file, |f| f.log.clone(), |f| f.log.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
