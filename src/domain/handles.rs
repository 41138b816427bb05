//! Handle layouts shared by root and spawned nodes.
//!
//! A root carries two source handles, one per side. Every other node carries
//! exactly one source and one target handle, placed left/right according to
//! its [`HandleOrientation`].

use crate::domain::id::{HandleId, NodeId};
use crate::domain::node::{Handle, HandleSide, HandleType, Node};

/// Handle types assigned to the left and right side of a non-root node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleOrientation {
    pub left: HandleType,
    pub right: HandleType,
}

impl HandleOrientation {
    /// Flow runs left to right: target on the left, source on the right.
    pub const RIGHTWARD: Self = Self {
        left: HandleType::Target,
        right: HandleType::Source,
    };

    /// Flow runs right to left: source on the left, target on the right.
    pub const LEFTWARD: Self = Self {
        left: HandleType::Source,
        right: HandleType::Target,
    };

    /// Read the orientation off a node's left/right handles.
    pub fn of(node: &Node) -> Option<Self> {
        let side_type = |side| {
            node.handle_config()
                .iter()
                .find(|h| h.side == side)
                .map(|h| h.handle_type)
        };
        match (side_type(HandleSide::Left), side_type(HandleSide::Right)) {
            (Some(left), Some(right)) if left != right => Some(Self { left, right }),
            _ => None,
        }
    }

    /// Handle config for node `id`: `<id>-<type>` on each side.
    pub fn handles_for(&self, id: &NodeId) -> Vec<Handle> {
        vec![
            Handle::new(handle_id(id, self.left), self.left, HandleSide::Left),
            Handle::new(handle_id(id, self.right), self.right, HandleSide::Right),
        ]
    }
}

/// `<node>-source` / `<node>-target`, the default handle ids of a non-root node.
pub fn handle_id(node_id: &NodeId, handle_type: HandleType) -> HandleId {
    HandleId::new(format!("{}-{}", node_id, handle_type))
}

/// Handle a new outgoing edge leaves `node` from when the caller names none:
/// the right-hand source handle if present, else the first source handle,
/// else the synthesized `<id>-source`.
pub fn default_source_handle(node: &Node) -> HandleId {
    node.handle_on(HandleType::Source, HandleSide::Right)
        .or_else(|| node.handles_of(HandleType::Source).next())
        .map(|h| h.id.clone())
        .unwrap_or_else(|| handle_id(node.id(), HandleType::Source))
}

/// Root layout: `<id>-source-left` and `<id>-source-right`.
pub fn root_handles(id: &NodeId) -> Vec<Handle> {
    [HandleSide::Left, HandleSide::Right]
        .into_iter()
        .map(|side| {
            Handle::new(
                format!("{}-source-{}", id, side.as_str()),
                HandleType::Source,
                side,
            )
        })
        .collect()
}
