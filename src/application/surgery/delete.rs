//! Node deletion: the splicing smart delete and the plain simple delete.
//!
//! Parentless nodes are never deleted through either path.

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::{
    handle_id, DomainResult, Edge, EdgeId, HandleId, HandleType, MindMap, NodeId,
    DEFAULT_EDGE_TYPE,
};

/// Replacement edge bridging over a deleted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: HandleId,
    pub target_handle: HandleId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletePlan {
    pub nodes: Vec<NodeId>,
    pub edges_to_remove: BTreeSet<EdgeId>,
    pub edges_to_create: Vec<PlannedEdge>,
    /// Requested ids that were kept because they have no parent.
    pub protected: Vec<NodeId>,
}

impl DeletePlan {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// What a delete actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub removed_nodes: Vec<NodeId>,
    pub removed_edges: Vec<EdgeId>,
    pub created_edges: Vec<EdgeId>,
    pub protected: Vec<NodeId>,
}

/// Existing, unique, non-root ids in request order, plus the protected ones.
fn deletable(map: &MindMap, ids: &[NodeId]) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut targets = Vec::new();
    let mut protected = Vec::new();
    for id in ids.iter().unique() {
        let Some(node) = map.get_node(id) else {
            debug!("ignoring unknown node {}", id);
            continue;
        };
        if node.parent_id().is_none() {
            debug!("preventing deletion of root node {}", id);
            protected.push(id.clone());
        } else {
            targets.push(id.clone());
        }
    }
    (targets, protected)
}

/// Compute the smart-delete plan without touching the map.
///
/// Every surviving incomer of a deleted node is linked to every surviving
/// outgoer. The new edge reuses the incomer's source handle and the
/// outgoer's target handle, falling back to `<id>-source` / `<id>-target`.
/// Planned edges that would loop, duplicate, or land on a target handle that
/// is still taken are skipped.
#[instrument(level = "debug", skip(map, ids), fields(map = %map.id()))]
pub fn plan_smart_delete(map: &MindMap, ids: &[NodeId]) -> DeletePlan {
    let (nodes, protected) = deletable(map, ids);
    let doomed: BTreeSet<&NodeId> = nodes.iter().collect();

    let mut edges_to_remove = BTreeSet::new();
    let mut edges_to_create: Vec<PlannedEdge> = Vec::new();

    for id in &nodes {
        for edge in map.get_connected_edges(id) {
            edges_to_remove.insert(edge.id().clone());
        }
    }

    let handle_taken = |handle: &HandleId, planned: &[PlannedEdge]| {
        map.edges()
            .any(|e| e.target_handle_id() == Some(handle) && !edges_to_remove.contains(e.id()))
            || planned.iter().any(|p| &p.target_handle == handle)
    };

    for id in &nodes {
        let incomers = map.incomers(id);
        let outgoers = map.outgoers(id);
        debug!(
            "node {}: {} incomers, {} outgoers",
            id,
            incomers.len(),
            outgoers.len()
        );

        for source in incomers.iter().map(|n| n.id()).unique() {
            if doomed.contains(source) {
                continue;
            }
            let inbound = map
                .edges()
                .find(|e| e.source_node_id() == source && e.target_node_id() == id);

            for target in outgoers.iter().map(|n| n.id()).unique() {
                if doomed.contains(target) || source == target {
                    continue;
                }
                let outbound = map
                    .edges()
                    .find(|e| e.source_node_id() == id && e.target_node_id() == target);

                let planned = PlannedEdge {
                    source: source.clone(),
                    target: target.clone(),
                    source_handle: inbound
                        .and_then(Edge::source_handle_id)
                        .cloned()
                        .unwrap_or_else(|| handle_id(source, HandleType::Source)),
                    target_handle: outbound
                        .and_then(Edge::target_handle_id)
                        .cloned()
                        .unwrap_or_else(|| handle_id(target, HandleType::Target)),
                };

                if edges_to_create.contains(&planned) {
                    continue;
                }
                if handle_taken(&planned.target_handle, &edges_to_create) {
                    debug!(
                        "skipping {} -> {}: target handle {} already connected",
                        planned.source, planned.target, planned.target_handle
                    );
                    continue;
                }
                edges_to_create.push(planned);
            }
        }
    }

    debug!(
        "plan: delete {:?}, remove {} edges, create {} edges",
        nodes,
        edges_to_remove.len(),
        edges_to_create.len()
    );
    DeletePlan {
        nodes,
        edges_to_remove,
        edges_to_create,
        protected,
    }
}

/// Delete nodes and splice their neighbours together. All or nothing.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn smart_delete(map: &mut MindMap, ids: &[NodeId]) -> DomainResult<DeleteReport> {
    let plan = plan_smart_delete(map, ids);
    if plan.is_empty() {
        return Ok(DeleteReport {
            protected: plan.protected,
            ..Default::default()
        });
    }

    let mut work = map.clone();
    let mut report = DeleteReport {
        protected: plan.protected,
        ..Default::default()
    };

    for edge_id in &plan.edges_to_remove {
        if work.remove_edge(edge_id) {
            report.removed_edges.push(edge_id.clone());
        }
    }
    for planned in plan.edges_to_create {
        let mut edge = Edge::create(planned.source, planned.target, Some(DEFAULT_EDGE_TYPE));
        edge.set_handle_ids(Some(planned.source_handle), Some(planned.target_handle));
        let id = work.add_edge(edge)?.id().clone();
        report.created_edges.push(id);
    }
    for id in &plan.nodes {
        if work.remove_node(id) {
            report.removed_nodes.push(id.clone());
        }
    }

    *map = work;
    Ok(report)
}

/// Delete nodes and every edge touching them; no replacement edges.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn simple_delete(map: &mut MindMap, ids: &[NodeId]) -> DeleteReport {
    let (nodes, protected) = deletable(map, ids);
    let mut report = DeleteReport {
        protected,
        ..Default::default()
    };
    for id in &nodes {
        let touching: Vec<EdgeId> = map
            .get_connected_edges(id)
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        if map.remove_node(id) {
            report.removed_edges.extend(touching);
            report.removed_nodes.push(id.clone());
        }
    }
    report
}
