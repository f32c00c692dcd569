// ── Node storage ──
//
// `Nodes` is the plain collection, `TypedNodes` pins it to one role, and
// `Groups` is the per-response view keyed by failover group. The shared,
// lock-guarded registry the poller writes into lives in `registry`.

mod groups;
mod nodes;
mod registry;
mod typed;

pub use groups::Groups;
pub use nodes::{BulkOutcome, NodeCollection, Nodes};
pub use registry::{MergeReport, NodeRegistry};
pub use typed::TypedNodes;
