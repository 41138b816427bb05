//! Spawning a node by dragging a connection out of a source handle.

use tracing::{debug, instrument};

use crate::domain::{
    handle_id, DomainError, DomainResult, Edge, EdgeId, EntityKind, HandleId, HandleOrientation,
    HandleSide, HandleType, MindMap, Node, NodeId, Position, DEFAULT_EDGE_TYPE,
};

/// Orientation for a node spawned from `source_handle` on `source`.
///
/// From a root, the new node mirrors the side dragged from: the left handle
/// yields left=source/right=target, the right handle the reverse. From any
/// other node the parent's own orientation is inherited, so one flow
/// direction runs down each branch.
pub fn inherit_orientation(source: &Node, source_handle: &HandleId) -> DomainResult<HandleOrientation> {
    let handle = source
        .handle(source_handle)
        .ok_or_else(|| DomainError::not_found(EntityKind::Handle, source_handle))?;
    if handle.handle_type != HandleType::Source {
        return Err(DomainError::validation(
            "Cannot start a connection from a target handle",
        ));
    }

    let by_side = match handle.side {
        HandleSide::Left => HandleOrientation::LEFTWARD,
        HandleSide::Right => HandleOrientation::RIGHTWARD,
    };
    if source.is_root() {
        return Ok(by_side);
    }
    Ok(HandleOrientation::of(source).unwrap_or(by_side))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub node_id: NodeId,
    pub edge_id: EdgeId,
}

/// Create a node at `position` wired from `source_handle` to the new node's
/// target handle.
#[instrument(level = "debug", skip(map, content), fields(map = %map.id()))]
pub fn spawn_connected_node(
    map: &mut MindMap,
    source: &NodeId,
    source_handle: &HandleId,
    position: Position,
    content: &str,
) -> DomainResult<SpawnOutcome> {
    let source_node = map
        .get_node(source)
        .ok_or_else(|| DomainError::not_found(EntityKind::Node, source))?;
    let orientation = inherit_orientation(source_node, source_handle)?;

    let mut node = Node::create(false, content, position, Some(source.clone()));
    let node_id = node.id().clone();
    node.set_handle_config(orientation.handles_for(&node_id));

    let mut edge = Edge::create(source.clone(), node_id.clone(), Some(DEFAULT_EDGE_TYPE));
    edge.set_handle_ids(
        Some(source_handle.clone()),
        Some(handle_id(&node_id, HandleType::Target)),
    );
    let edge_id = edge.id().clone();

    let mut work = map.clone();
    work.add_node(node)?;
    work.add_edge(edge)?;
    *map = work;

    debug!("spawned {} from {} via {}", node_id, source, source_handle);
    Ok(SpawnOutcome { node_id, edge_id })
}
