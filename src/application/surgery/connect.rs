//! Handle-level and node-level connection operations.

use tracing::{debug, instrument};

use crate::domain::{
    DomainError, DomainResult, Edge, EdgeId, EntityKind, Handle, HandleId, HandleType, MindMap,
    NodeId, DEFAULT_EDGE_TYPE,
};

/// A connection dropped from one handle onto another, in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub from_node: NodeId,
    pub from_handle: HandleId,
    pub to_node: NodeId,
    pub to_handle: HandleId,
    pub edge_type: Option<String>,
}

/// Endpoints of a reconnected edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconnection {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Option<HandleId>,
    pub target_handle: Option<HandleId>,
}

fn find_handle<'a>(map: &'a MindMap, node: &NodeId, handle: &HandleId) -> DomainResult<&'a Handle> {
    map.get_node(node)
        .ok_or_else(|| DomainError::not_found(EntityKind::Node, node))?
        .handle(handle)
        .ok_or_else(|| DomainError::not_found(EntityKind::Handle, handle))
}

/// Connect two handles. A drop from a target onto a source is flipped so
/// the edge always runs source → target.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn connect(map: &mut MindMap, request: ConnectionRequest) -> DomainResult<EdgeId> {
    let from = find_handle(map, &request.from_node, &request.from_handle)?.handle_type;
    let to = find_handle(map, &request.to_node, &request.to_handle)?.handle_type;

    let (source, target, source_handle, target_handle) = match (from, to) {
        (HandleType::Source, HandleType::Target) => (
            request.from_node,
            request.to_node,
            request.from_handle,
            request.to_handle,
        ),
        (HandleType::Target, HandleType::Source) => (
            request.to_node,
            request.from_node,
            request.to_handle,
            request.from_handle,
        ),
        _ => return Err(DomainError::validation("Invalid handle combination")),
    };

    if map.is_target_handle_connected(&target_handle) {
        return Err(DomainError::validation("Target handle already connected"));
    }

    let edge_type = request.edge_type.as_deref().unwrap_or(DEFAULT_EDGE_TYPE);
    let mut edge = Edge::create(source, target, Some(edge_type));
    edge.set_handle_ids(Some(source_handle), Some(target_handle));
    let id = map.add_edge(edge)?.id().clone();
    debug!("connected via edge {}", id);
    Ok(id)
}

/// Connect two nodes without handles. At most one edge may join a pair of
/// nodes, whatever its direction.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn connect_nodes(
    map: &mut MindMap,
    source: &NodeId,
    target: &NodeId,
    edge_type: Option<&str>,
) -> DomainResult<EdgeId> {
    for id in [source, target] {
        if !map.contains_node(id) {
            return Err(DomainError::not_found(EntityKind::Node, id));
        }
    }
    if map.edge_between(source, target).is_some() {
        return Err(DomainError::validation(
            "Connection already exists between these nodes",
        ));
    }
    let edge = Edge::create(source.clone(), target.clone(), edge_type);
    Ok(map.add_edge(edge)?.id().clone())
}

/// Remove the edge joining `a` and `b` in either direction.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn disconnect_nodes(map: &mut MindMap, a: &NodeId, b: &NodeId) -> DomainResult<EdgeId> {
    let id = map
        .edge_between(a, b)
        .map(|e| e.id().clone())
        .ok_or_else(|| {
            DomainError::not_found(EntityKind::Edge, format!("between {} and {}", a, b))
        })?;
    map.remove_edge(&id);
    Ok(id)
}

/// Replace `edge_id` with an edge between new endpoints, keeping its type
/// and style. The replaced edge does not count against target-handle
/// uniqueness.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn reconnect_edge(
    map: &mut MindMap,
    edge_id: &EdgeId,
    to: Reconnection,
) -> DomainResult<EdgeId> {
    let old = map
        .get_edge(edge_id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(EntityKind::Edge, edge_id))?;
    for id in [&to.source, &to.target] {
        if !map.contains_node(id) {
            return Err(DomainError::not_found(EntityKind::Node, id));
        }
    }
    if let Some(handle) = &to.target_handle {
        let taken = map
            .edges()
            .any(|e| e.id() != edge_id && e.target_handle_id() == Some(handle));
        if taken {
            return Err(DomainError::validation("Target handle already connected"));
        }
    }

    let mut edge = Edge::create(to.source, to.target, Some(old.edge_type()));
    edge.set_handle_ids(to.source_handle, to.target_handle);
    edge.style = old.style().clone();

    let mut work = map.clone();
    work.remove_edge(edge_id);
    let id = work.add_edge(edge)?.id().clone();
    *map = work;
    debug!("reconnected {} as {}", edge_id, id);
    Ok(id)
}
