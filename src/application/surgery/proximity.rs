//! Proximity auto-connect: propose the closest valid connection for a node
//! being dragged, preview it, and persist it on release.

use tracing::{debug, instrument, trace};

use crate::domain::{
    DomainError, DomainResult, Edge, EdgeId, EntityKind, Handle, HandleId, HandleSide, HandleType,
    MindMap, Node, NodeId, NodeUpdate, Position, DEFAULT_EDGE_TYPE,
};

/// Nodes at this distance or farther are never proposed.
pub const PROXIMITY_THRESHOLD: f64 = 400.0;

/// Edge type of a preview; previews are never stored in a map.
pub const PREVIEW_EDGE_TYPE: &str = "temp";

#[derive(Debug, Clone, PartialEq)]
pub struct ProposedConnection {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: HandleId,
    pub target_handle: HandleId,
    pub distance: f64,
}

impl ProposedConnection {
    /// `<source>-<target>`
    pub fn preview_id(&self) -> EdgeId {
        EdgeId::new(format!("{}-{}", self.source, self.target))
    }
}

/// Side of `node` that faces `other`.
fn facing_side(node: Position, other: Position) -> HandleSide {
    if other.x > node.x {
        HandleSide::Right
    } else {
        HandleSide::Left
    }
}

/// A root uses the handle on the side facing the other node; any other node
/// uses its first candidate.
fn pick<'a>(
    node: &Node,
    candidates: &[&'a Handle],
    facing: HandleSide,
) -> Option<&'a Handle> {
    if node.is_root() {
        candidates.iter().copied().find(|h| h.side == facing)
    } else {
        candidates.first().copied()
    }
}

fn free_targets<'a>(map: &MindMap, node: &'a Node) -> Vec<&'a Handle> {
    node.handles_of(HandleType::Target)
        .filter(|h| !map.is_target_handle_connected(&h.id))
        .collect()
}

/// Closest connection for `dragged` placed at `position`.
///
/// Other nodes are scanned in ascending id order; for each one within
/// `threshold` both directions are tried (dragged → other, other → dragged).
/// Occupied target handles and already existing edges are skipped. The
/// first candidate with the strictly smallest distance wins.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn closest_connection(
    map: &MindMap,
    dragged: &NodeId,
    position: Position,
    threshold: f64,
) -> Option<ProposedConnection> {
    let dragged_node = map.get_node(dragged)?;
    let dragged_sources: Vec<&Handle> = dragged_node.handles_of(HandleType::Source).collect();
    let dragged_targets = free_targets(map, dragged_node);

    let mut best: Option<ProposedConnection> = None;

    for other in map.nodes().filter(|n| n.id() != dragged) {
        let distance = position.distance_to(&other.position());
        if distance >= threshold {
            continue;
        }
        let dragged_facing = facing_side(position, other.position());
        let other_facing = facing_side(other.position(), position);

        let other_sources: Vec<&Handle> = other.handles_of(HandleType::Source).collect();
        let other_targets = free_targets(map, other);

        let mut options = Vec::with_capacity(2);

        // dragged → other
        if let (Some(sh), Some(th)) = (
            pick(dragged_node, &dragged_sources, dragged_facing),
            pick(other, &other_targets, other_facing),
        ) {
            options.push(ProposedConnection {
                source: dragged.clone(),
                target: other.id().clone(),
                source_handle: sh.id.clone(),
                target_handle: th.id.clone(),
                distance,
            });
        }

        // other → dragged
        if let (Some(sh), Some(th)) = (
            pick(other, &other_sources, other_facing),
            pick(dragged_node, &dragged_targets, dragged_facing),
        ) {
            options.push(ProposedConnection {
                source: other.id().clone(),
                target: dragged.clone(),
                source_handle: sh.id.clone(),
                target_handle: th.id.clone(),
                distance,
            });
        }

        for option in options {
            let exists = map.has_edge(
                &option.source,
                &option.target,
                Some(&option.source_handle),
                Some(&option.target_handle),
            );
            if exists {
                trace!("{} already connected", option.preview_id());
                continue;
            }
            let closer = best.as_ref().map_or(true, |b| option.distance < b.distance);
            if closer {
                best = Some(option);
            }
        }
    }

    match &best {
        Some(p) => debug!(
            "closest connection {} ({} -> {}) at {:.1}",
            p.preview_id(),
            p.source_handle,
            p.target_handle,
            p.distance
        ),
        None => debug!("no valid connection within {}", threshold),
    }
    best
}

/// Transient edge for the current drag position; never inserted in the map.
pub fn preview_edge(
    map: &MindMap,
    dragged: &NodeId,
    position: Position,
    threshold: f64,
) -> Option<Edge> {
    closest_connection(map, dragged, position, threshold).map(|p| {
        let mut edge = Edge::new(p.preview_id(), p.source, p.target, PREVIEW_EDGE_TYPE);
        edge.set_handle_ids(Some(p.source_handle), Some(p.target_handle));
        edge
    })
}

/// Result of releasing a dragged node.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub node_id: NodeId,
    pub position: Position,
    pub connected: Option<EdgeId>,
}

/// Move `dragged` to `position` and persist the proposed connection, if any.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn finalize_drag(
    map: &mut MindMap,
    dragged: &NodeId,
    position: Position,
    threshold: f64,
) -> DomainResult<DragOutcome> {
    if !map.contains_node(dragged) {
        return Err(DomainError::not_found(EntityKind::Node, dragged));
    }

    let mut work = map.clone();
    work.update_node(
        dragged,
        NodeUpdate {
            position: Some(position.into()),
            ..Default::default()
        },
    )?;

    let connected = match closest_connection(&work, dragged, position, threshold) {
        Some(p) => {
            let mut edge = Edge::create(p.source, p.target, Some(DEFAULT_EDGE_TYPE));
            edge.set_handle_ids(Some(p.source_handle), Some(p.target_handle));
            Some(work.add_edge(edge)?.id().clone())
        }
        None => None,
    };

    *map = work;
    Ok(DragOutcome {
        node_id: dragged.clone(),
        position,
        connected,
    })
}
