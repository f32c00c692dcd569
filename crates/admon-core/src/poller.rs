// ── Background node list poller ──
//
// One task per poller fetches the node list on a fixed interval (or on
// demand), splits it into its metadata and storage sections and merges
// each into the shared registry. One request per cycle, so both roles
// come from the same server snapshot. A failure leaves the registry
// untouched for the affected roles and never stops the task.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use admon_api::{AdmonClient, NodeCategory, NodeListOptions, Row};
use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AdmonConfig;
use crate::convert::groups_from_rows;
use crate::error::CoreError;
use crate::model::NodeType;
use crate::store::{MergeReport, NodeRegistry};

// ── Source ──────────────────────────────────────────────────────────

/// Rows of one node list response, by section. Sections the response
/// did not carry are absent.
pub type NodeListing = BTreeMap<NodeCategory, Vec<Row>>;

/// Where node lists come from.
pub trait NodeSource: Send + Sync + 'static {
    fn fetch_node_list(&self) -> impl Future<Output = Result<NodeListing, admon_api::Error>> + Send;
}

impl NodeSource for AdmonClient {
    fn fetch_node_list(&self) -> impl Future<Output = Result<NodeListing, admon_api::Error>> + Send {
        async move {
            let doc = self.node_list(NodeListOptions::default()).await?;
            let listing: NodeListing = NodeType::iter()
                .map(NodeType::category)
                .filter_map(|c| doc.rows(c.element()).ok().map(|rows| (c, rows.to_vec())))
                .collect();
            debug!(sections = listing.len(), "fetched node list");
            Ok(listing)
        }
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Where a category is in its poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PollState {
    #[default]
    Idle,
    Fetching,
    Merging,
    /// The last fetch failed. Cleared when the next cycle starts fetching.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStatus {
    pub state: PollState,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub failures: u64,
}

/// Observable poller status, one entry per registry role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStatus {
    pub metadata: CategoryStatus,
    pub storage: CategoryStatus,
    /// Completed cycles, successful or not.
    pub cycles: u64,
}

impl PollStatus {
    pub fn category(&self, node_type: NodeType) -> &CategoryStatus {
        match node_type {
            NodeType::Metadata => &self.metadata,
            NodeType::Storage => &self.storage,
        }
    }

    fn category_mut(&mut self, node_type: NodeType) -> &mut CategoryStatus {
        match node_type {
            NodeType::Metadata => &mut self.metadata,
            NodeType::Storage => &mut self.storage,
        }
    }
}

/// Result of one fetch-and-merge pass over every category.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub merged: Vec<MergeReport>,
    pub failed: Vec<(NodeType, CoreError)>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn succeeded(&self, node_type: NodeType) -> bool {
        self.merged.iter().any(|m| m.node_type == node_type)
    }
}

// ── Poller ──────────────────────────────────────────────────────────

struct Shared<S> {
    source: S,
    registry: Arc<NodeRegistry>,
    prune_stale: bool,
    status: watch::Sender<PollStatus>,
    refresh: Notify,
    /// Held for the length of a cycle so cycles never overlap.
    cycle: tokio::sync::Mutex<()>,
}

type Running = Option<(CancellationToken, JoinHandle<()>)>;

/// A task that has neither been told to stop nor exited.
fn is_live(running: &Running) -> bool {
    running
        .as_ref()
        .is_some_and(|(cancel, handle)| !cancel.is_cancelled() && !handle.is_finished())
}

/// Keeps a [`NodeRegistry`] in sync with the admon service.
pub struct Poller<S: NodeSource = AdmonClient> {
    shared: Arc<Shared<S>>,
    interval: Duration,
    running: Mutex<Running>,
}

impl Poller<AdmonClient> {
    /// Poller for the service described by `config`.
    pub fn from_config(
        config: &AdmonConfig,
        registry: Arc<NodeRegistry>,
    ) -> Result<Self, CoreError> {
        Ok(Self::new(config.client()?, registry, config.poll_interval)
            .with_prune_stale(config.prune_stale))
    }
}

impl<S: NodeSource> Poller<S> {
    pub fn new(source: S, registry: Arc<NodeRegistry>, interval: Duration) -> Self {
        let (status, _) = watch::channel(PollStatus::default());
        Self {
            shared: Arc::new(Shared {
                source,
                registry,
                prune_stale: false,
                status,
                refresh: Notify::new(),
                cycle: tokio::sync::Mutex::new(()),
            }),
            interval,
            running: Mutex::new(None),
        }
    }

    /// Remove nodes missing from a successful response. Has no effect
    /// once the poller has been started.
    pub fn with_prune_stale(mut self, prune_stale: bool) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.prune_stale = prune_stale;
        }
        self
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.shared.registry
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn status(&self) -> PollStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.shared.status.subscribe()
    }

    /// Run one cycle now, on the caller's task.
    pub async fn poll_once(&self) -> CycleReport {
        self.shared.run_cycle().await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the background task. The first cycle runs immediately.
    /// Does nothing while a task is live; a task that was told to stop
    /// is replaced.
    pub fn start(&self) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if is_live(&running) {
            return;
        }
        // A stopping task may still finish its in-flight cycle; the cycle
        // lock keeps it from overlapping the new task's first one.
        if let Some((cancel, _)) = running.take() {
            cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(
            Arc::clone(&self.shared),
            self.interval,
            cancel.clone(),
        ));
        *running = Some((cancel, handle));
        info!(interval = ?self.interval, "node poller started");
    }

    pub fn is_running(&self) -> bool {
        is_live(&self.running.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Ask for a cycle ahead of schedule. The interval restarts after it.
    pub fn refresh_now(&self) {
        self.shared.refresh.notify_one();
    }

    /// Stop scheduling cycles without waiting for the task to exit.
    /// [`start`](Self::start) may be called again afterwards.
    pub fn should_stop(&self) {
        if let Some((cancel, _)) = &*self.running.lock().unwrap_or_else(PoisonError::into_inner) {
            cancel.cancel();
        }
    }

    /// Stop the task and wait for it. A fetch already in flight finishes
    /// first.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((cancel, handle)) = running {
            cancel.cancel();
            let _ = handle.await;
            info!("node poller stopped");
        }
    }
}

impl<S: NodeSource> Drop for Poller<S> {
    fn drop(&mut self) {
        if let Some((cancel, _)) = &*self.running.lock().unwrap_or_else(PoisonError::into_inner) {
            cancel.cancel();
        }
    }
}

impl<S: NodeSource> Shared<S> {
    fn update_status(&self, node_type: NodeType, f: impl FnOnce(&mut CategoryStatus)) {
        self.status.send_modify(|s| f(s.category_mut(node_type)));
    }

    async fn run_cycle(&self) -> CycleReport {
        let _cycle = self.cycle.lock().await;
        let mut report = CycleReport::default();

        for node_type in NodeType::iter() {
            self.update_status(node_type, |c| c.state = PollState::Fetching);
        }

        match self.source.fetch_node_list().await {
            Ok(mut listing) => {
                for node_type in NodeType::iter() {
                    let category = node_type.category();
                    match listing.remove(&category) {
                        Some(rows) => report.merged.push(self.merge(node_type, &rows)),
                        None => {
                            let err = CoreError::from(admon_api::Error::MissingElement {
                                name: category.element().to_owned(),
                            });
                            warn!(%category, error = %err, "node list section missing");
                            self.mark_failed(node_type, &err);
                            report.failed.push((node_type, err));
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "node list fetch failed");
                let err = CoreError::from(e);
                for node_type in NodeType::iter() {
                    self.mark_failed(node_type, &err);
                    report.failed.push((node_type, err.clone()));
                }
            }
        }

        self.status.send_modify(|s| s.cycles += 1);
        report
    }

    fn mark_failed(&self, node_type: NodeType, err: &CoreError) {
        self.update_status(node_type, |c| {
            c.state = PollState::Failed;
            c.last_error = Some(err.to_string());
            c.failures += 1;
        });
    }

    fn merge(&self, node_type: NodeType, rows: &[Row]) -> MergeReport {
        self.update_status(node_type, |c| c.state = PollState::Merging);
        let groups = groups_from_rows(rows, node_type);
        let merge = self
            .registry
            .merge_groups(node_type, &groups, self.prune_stale);
        debug!(
            category = %node_type.category(),
            groups = groups.len(),
            nodes = groups.node_count(),
            "poll cycle merged"
        );

        self.update_status(node_type, |c| {
            c.state = PollState::Idle;
            c.last_success = Some(Utc::now());
            c.last_error = None;
        });
        merge
    }
}

async fn poll_task<S: NodeSource>(
    shared: Arc<Shared<S>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
            () = shared.refresh.notified() => interval.reset(),
        }

        let report = shared.run_cycle().await;
        if !report.is_success() {
            debug!(failed = report.failed.len(), "poll cycle finished with failures");
        }
    }
}
