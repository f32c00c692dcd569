//! Domain layer between `admon-api` and presentation surfaces.
//!
//! - **[`NodeRegistry`]**: the continuously refreshed set of metadata and
//!   storage nodes, guarded by one lock so readers never observe a merge
//!   half applied. Lookups hand out [`NodeHandle`]s that see later merges.
//!
//! - **[`Poller`]**: background task that fetches the node list on an
//!   interval (or on demand), groups rows by failover group, and merges
//!   them into the registry. Fetch failures are logged, surfaced through
//!   [`PollStatus`], and never stop the task.
//!
//! - **Collections** ([`store`]): [`Nodes`], the role-checked
//!   [`TypedNodes`], and the per-response [`Groups`] view.
//!
//! - **Units** ([`units`]): size and time units, the [`ValueUnit`] pair,
//!   and the conversions used to render and compare measured values.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;
pub mod units;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::AdmonConfig;
pub use error::CoreError;
pub use model::{DEFAULT_GROUP, Node, NodeHandle, NodeKey, NodeType, TypedNodeId, parse_typed_node_id};
pub use poller::{CategoryStatus, CycleReport, NodeListing, NodeSource, PollState, PollStatus, Poller};
pub use store::{BulkOutcome, Groups, MergeReport, NodeCollection, NodeRegistry, Nodes, TypedNodes};
pub use units::{SizeUnit, TimeUnit, Unit, ValueUnit};
