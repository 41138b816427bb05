//! Domain layer: the mind-map model and its consistency rules.
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod clock;
pub mod edge;
pub mod error;
pub mod handles;
pub mod id;
pub mod mindmap;
pub mod node;
pub mod snapshot;

pub use arena::{OutlineItem, OutlineNode, OutlineTree};
pub use clock::{Clock, FixedClock, SystemClock};
pub use edge::{Edge, EdgeStyle, EdgeStyleUpdate, DEFAULT_EDGE_TYPE};
pub use error::{DomainError, DomainResult, EntityKind};
pub use handles::{default_source_handle, handle_id, root_handles, HandleOrientation};
pub use id::{EdgeId, HandleId, MindMapId, NodeId};
pub use mindmap::{EdgeUpdate, MindMap, NodeUpdate, Statistics};
pub use node::{
    Dimensions, Handle, HandleSide, HandleType, Metadata, Node, Position, PositionUpdate,
};
pub use snapshot::{EdgeData, MindMapData, NodeData};
