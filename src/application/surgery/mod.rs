//! Graph surgery: multi-step edits computed from the current map and
//! applied all-or-nothing.

pub mod connect;
pub mod delete;
pub mod proximity;
pub mod spawn;

pub use connect::{connect, connect_nodes, disconnect_nodes, reconnect_edge, ConnectionRequest, Reconnection};
pub use delete::{plan_smart_delete, simple_delete, smart_delete, DeletePlan, DeleteReport, PlannedEdge};
pub use proximity::{
    closest_connection, finalize_drag, preview_edge, DragOutcome, ProposedConnection,
    PREVIEW_EDGE_TYPE, PROXIMITY_THRESHOLD,
};
pub use spawn::{inherit_orientation, spawn_connected_node, SpawnOutcome};
