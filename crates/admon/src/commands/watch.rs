//! Live node watch: runs the poller and prints what each cycle changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use admon_core::{
    AdmonConfig, Node, NodeKey, NodeRegistry, NodeType, PollState, PollStatus, Poller,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, Marker};

/// What one poll cycle changed.
#[derive(Debug, Default, Serialize)]
struct CycleEvent {
    cycle: u64,
    at: Option<DateTime<Utc>>,
    added: Vec<Node>,
    removed: Vec<Node>,
    changed: Vec<Node>,
    failed: Vec<String>,
}

impl CycleEvent {
    fn is_quiet(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.failed.is_empty()
    }

    fn render_lines(&self, color: bool) -> String {
        let node_line = |marker: Marker, n: &Node| {
            let kind = n.node_type.to_string();
            let text = format!("{kind:<8} {:<24} group={}", n.typed_id(), n.group);
            output::marked_line(marker, &text, color)
        };

        let mut lines = Vec::new();
        lines.extend(self.added.iter().map(|n| node_line(Marker::Added, n)));
        lines.extend(self.removed.iter().map(|n| node_line(Marker::Removed, n)));
        lines.extend(self.changed.iter().map(|n| node_line(Marker::Changed, n)));
        lines.extend(
            self.failed
                .iter()
                .map(|f| output::marked_line(Marker::Failed, f, color)),
        );
        lines.join("\n")
    }
}

fn snapshot(registry: &NodeRegistry) -> BTreeMap<NodeKey, Node> {
    registry.all_nodes().into_iter().map(|n| (n.key(), n)).collect()
}

/// Diff two registry snapshots.
fn diff(
    before: &BTreeMap<NodeKey, Node>,
    after: &BTreeMap<NodeKey, Node>,
    event: &mut CycleEvent,
) {
    for (key, node) in after {
        match before.get(key) {
            None => event.added.push(node.clone()),
            Some(old) if old != node => event.changed.push(node.clone()),
            Some(_) => {}
        }
    }
    event.removed.extend(
        before
            .iter()
            .filter(|(key, _)| !after.contains_key(key))
            .map(|(_, node)| node.clone()),
    );
}

fn failures(status: &PollStatus) -> Vec<String> {
    [NodeType::Metadata, NodeType::Storage]
        .into_iter()
        .filter_map(|t| {
            let category = status.category(t);
            (category.state == PollState::Failed).then(|| {
                format!(
                    "{t}: {}",
                    category.last_error.as_deref().unwrap_or("fetch failed")
                )
            })
        })
        .collect()
}

pub async fn handle(
    config: &AdmonConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut config = config.clone();
    if let Some(interval) = args.interval {
        config.poll_interval = interval;
    }

    let registry = Arc::new(NodeRegistry::new());
    let poller = Poller::from_config(&config, Arc::clone(&registry))?;
    let mut status = poller.subscribe();
    let color = output::should_color(&global.color);

    let mut previous = BTreeMap::new();
    let mut seen = 0;
    poller.start();

    loop {
        let current = tokio::select! {
            changed = status.wait_for(|s| s.cycles > seen) => match changed {
                Ok(s) => s.clone(),
                Err(_) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        };
        seen = current.cycles;

        let after = snapshot(&registry);
        let mut event = CycleEvent {
            cycle: current.cycles,
            at: registry.last_refresh(),
            failed: failures(&current),
            ..CycleEvent::default()
        };
        diff(&previous, &after, &mut event);
        previous = after;

        let out = match global.output {
            OutputFormat::Table | OutputFormat::Plain if event.is_quiet() => String::new(),
            OutputFormat::Table | OutputFormat::Plain => event.render_lines(color),
            _ => output::render_single(
                &global.output,
                &event,
                |_| String::new(),
                |_| String::new(),
            )?,
        };
        output::print_output(&out, global.quiet);

        if args.cycles.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    poller.stop().await;
    Ok(())
}
