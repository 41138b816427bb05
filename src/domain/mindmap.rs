//! MindMap aggregate: owns every node and edge and keeps them consistent.
//!
//! Nodes and edges live in id-keyed maps (arena style); parent/child and
//! edge endpoints are id references into those maps. Edge direction defines
//! tree parentage: the source of an edge is the parent of its target.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace};

use crate::domain::clock;
use crate::domain::edge::{Edge, EdgeStyleUpdate};
use crate::domain::error::{DomainError, DomainResult, EntityKind};
use crate::domain::handles::root_handles;
use crate::domain::id::{EdgeId, HandleId, MindMapId, NodeId};
use crate::domain::node::{Metadata, Node, Position, PositionUpdate};

pub const DEFAULT_TITLE: &str = "Untitled Mind Map";
pub const DEFAULT_ROOT_CONTENT: &str = "Central Topic";
pub const DEFAULT_ROOT_POSITION: Position = Position { x: 250.0, y: 100.0 };

/// Field updates applied to a node through the aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub content: Option<String>,
    pub position: Option<PositionUpdate>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub metadata: Metadata,
}

/// Field updates applied to an edge through the aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeUpdate {
    pub style: Option<EdgeStyleUpdate>,
    pub edge_type: Option<String>,
    pub metadata: Metadata,
}

/// Summary figures of a mind map.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub root_node_id: Option<NodeId>,
    /// Longest parent chain, counted in edges (a lone root has depth 0).
    pub max_depth: usize,
    pub average_children: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MindMap {
    pub(crate) id: MindMapId,
    pub(crate) title: String,
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    pub(crate) root_node_id: Option<NodeId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) metadata: Metadata,
}

impl MindMap {
    /// Empty map without any node.
    pub fn new(id: MindMapId, title: impl Into<String>) -> Self {
        let now = clock::now();
        Self {
            id,
            title: title.into(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            root_node_id: None,
            created_at: now,
            updated_at: now,
            metadata: Metadata::new(),
        }
    }

    /// New map with a generated id and a single root node.
    pub fn create(title: impl Into<String>) -> Self {
        Self::create_with_root(title, DEFAULT_ROOT_CONTENT)
    }

    pub fn create_with_root(title: impl Into<String>, root_content: &str) -> Self {
        let mut map = Self::new(MindMapId::generate(), title);
        let content = if root_content.trim().is_empty() {
            DEFAULT_ROOT_CONTENT
        } else {
            root_content
        };
        let mut root = Node::create(true, content, DEFAULT_ROOT_POSITION, None);
        let root_id = root.id().clone();
        root.set_handle_config(root_handles(&root_id));
        map.nodes.insert(root_id.clone(), root);
        map.root_node_id = Some(root_id);
        map
    }

    pub fn id(&self) -> &MindMapId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root_node_id(&self) -> Option<&NodeId> {
        self.root_node_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.title.trim().is_empty()
    }

    pub fn rename(&mut self, title: impl Into<String>) -> DomainResult<()> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("Mind map title must not be empty"));
        }
        self.title = title;
        self.touch();
        Ok(())
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    // ------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------

    /// Insert a node. The first node of an empty map becomes its root.
    #[instrument(level = "debug", skip(self, node), fields(node = %node.id()))]
    pub fn add_node(&mut self, mut node: Node) -> DomainResult<&Node> {
        node.validate()?;
        if self.nodes.contains_key(node.id()) {
            return Err(DomainError::validation(format!(
                "Node with id {} already exists",
                node.id()
            )));
        }
        if let Some(parent_id) = node.parent_id() {
            if !self.nodes.contains_key(parent_id) {
                return Err(DomainError::validation("Parent node does not exist"));
            }
        }

        let id = node.id().clone();
        node.children.retain(|c| self.nodes.contains_key(c));
        if let Some(parent_id) = node.parent_id().cloned() {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.add_child(id.clone());
            }
        }
        self.nodes.insert(id.clone(), node);
        if self.nodes.len() == 1 {
            self.root_node_id = Some(id.clone());
        }
        self.touch();
        debug!("added node {}", id);
        self.nodes
            .get(&id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Node, &id))
    }

    /// Remove a node and every edge touching it. Children are orphaned, not
    /// deleted. Returns `false` if the node does not exist.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }

        let touching: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.connects_to(id))
            .map(|e| e.id().clone())
            .collect();
        for edge_id in &touching {
            self.detach_edge(edge_id);
        }

        for node in self.nodes.values_mut() {
            if node.parent_id() == Some(id) {
                node.set_parent(None);
            }
            node.remove_child(id);
        }

        self.nodes.remove(id);
        if self.root_node_id.as_ref() == Some(id) {
            self.root_node_id = self.elect_root();
            debug!("root removed, re-elected {:?}", self.root_node_id);
        }
        self.touch();
        true
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in ascending id order.
    pub fn get_all_nodes(&self) -> Vec<&Node> {
        self.nodes.values().collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Apply field updates to a node. Blank content is rejected before
    /// anything changes.
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> DomainResult<&Node> {
        if let Some(content) = &update.content {
            if content.trim().is_empty() {
                return Err(DomainError::validation("Node content must not be empty"));
            }
        }
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Node, id))?;

        if let Some(content) = update.content {
            node.update_content(Some(content));
        }
        if let Some(position) = update.position {
            node.update_position(position);
        }
        if update.height.is_some() || update.width.is_some() {
            node.update_dimensions(update.height, update.width);
        }
        for (key, value) in update.metadata {
            node.add_metadata(key, value);
        }
        self.updated_at = clock::now();
        self.nodes
            .get(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Node, id))
    }

    // ------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------

    /// Insert an edge and link source (parent) and target (child).
    #[instrument(level = "debug", skip(self, edge), fields(edge = %edge.id()))]
    pub fn add_edge(&mut self, edge: Edge) -> DomainResult<&Edge> {
        edge.validate()?;
        if !self.nodes.contains_key(edge.source_node_id())
            || !self.nodes.contains_key(edge.target_node_id())
        {
            return Err(DomainError::validation("Edge connects to non-existent nodes"));
        }
        if self.edges.contains_key(edge.id()) {
            return Err(DomainError::validation(format!(
                "Edge with id {} already exists",
                edge.id()
            )));
        }

        let source = edge.source_node_id().clone();
        let target = edge.target_node_id().clone();
        let id = edge.id().clone();
        self.edges.insert(id.clone(), edge);
        if let Some(node) = self.nodes.get_mut(&source) {
            node.add_child(target.clone());
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            node.set_parent(Some(source.clone()));
        }
        self.touch();
        debug!("added edge {} ({} -> {})", id, source, target);
        self.edges
            .get(&id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Edge, &id))
    }

    /// Remove an edge and unlink its endpoints. Returns `false` if absent.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        if self.detach_edge(id).is_none() {
            return false;
        }
        self.touch();
        true
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn get_all_edges(&self) -> Vec<&Edge> {
        self.edges.values().collect()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn update_edge(&mut self, id: &EdgeId, update: EdgeUpdate) -> DomainResult<&Edge> {
        let edge = self
            .edges
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Edge, id))?;
        if let Some(style) = update.style {
            edge.update_style(style);
        }
        if let Some(edge_type) = update.edge_type {
            edge.update_type(edge_type);
        }
        for (key, value) in update.metadata {
            edge.add_metadata(key, value);
        }
        self.updated_at = clock::now();
        self.edges
            .get(id)
            .ok_or_else(|| DomainError::not_found(EntityKind::Edge, id))
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    /// Child nodes in insertion order; ids that no longer resolve are dropped.
    pub fn get_children(&self, id: &NodeId) -> Vec<&Node> {
        self.nodes
            .get(id)
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(|c| self.nodes.get(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_parent(&self, id: &NodeId) -> Option<&Node> {
        self.nodes
            .get(id)
            .and_then(|n| n.parent_id())
            .and_then(|p| self.nodes.get(p))
    }

    pub fn get_connected_edges(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|e| e.connects_to(id)).collect()
    }

    /// Nodes with an edge pointing at `id`.
    pub fn incomers(&self, id: &NodeId) -> Vec<&Node> {
        self.edges
            .values()
            .filter(|e| e.target_node_id() == id)
            .filter_map(|e| self.nodes.get(e.source_node_id()))
            .collect()
    }

    /// Nodes that `id` points at.
    pub fn outgoers(&self, id: &NodeId) -> Vec<&Node> {
        self.edges
            .values()
            .filter(|e| e.source_node_id() == id)
            .filter_map(|e| self.nodes.get(e.target_node_id()))
            .collect()
    }

    /// Edge between `a` and `b` in either direction.
    pub fn edge_between(&self, a: &NodeId, b: &NodeId) -> Option<&Edge> {
        self.edges.values().find(|e| {
            (e.source_node_id() == a && e.target_node_id() == b)
                || (e.source_node_id() == b && e.target_node_id() == a)
        })
    }

    pub fn has_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
        source_handle: Option<&HandleId>,
        target_handle: Option<&HandleId>,
    ) -> bool {
        self.edges
            .values()
            .any(|e| e.same_connection(source, target, source_handle, target_handle))
    }

    /// A target handle accepts at most one incoming edge.
    pub fn is_target_handle_connected(&self, handle: &HandleId) -> bool {
        self.edges
            .values()
            .any(|e| e.target_handle_id() == Some(handle))
    }

    /// Nodes whose content contains `term`, case-insensitively.
    pub fn search(&self, term: &str) -> Vec<&Node> {
        let needle = term.to_lowercase();
        self.nodes
            .values()
            .filter(|n| n.content().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn statistics(&self) -> Statistics {
        let total_children: usize = self.nodes.values().map(|n| n.children().len()).sum();
        let average_children = if self.nodes.is_empty() {
            0.0
        } else {
            total_children as f64 / self.nodes.len() as f64
        };
        Statistics {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            root_node_id: self.root_node_id.clone(),
            max_depth: self.max_depth(),
            average_children,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Number of parent hops from `id` up to a parentless node.
    pub fn depth_of(&self, id: &NodeId) -> usize {
        let mut depth = 0;
        let mut seen = HashSet::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            if !seen.insert(node.id()) {
                break;
            }
            match node.parent_id().and_then(|p| self.nodes.get(p)) {
                Some(parent) => {
                    depth += 1;
                    current = Some(parent);
                }
                None => break,
            }
        }
        depth
    }

    fn max_depth(&self) -> usize {
        self.nodes
            .keys()
            .map(|id| self.depth_of(id))
            .max()
            .unwrap_or(0)
    }

    // ------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------

    /// Remove an edge and repair parent/child links without stamping.
    ///
    /// The target keeps a parent if another incoming edge remains.
    pub(crate) fn detach_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        let source = edge.source_node_id();
        let target = edge.target_node_id();

        let still_linked = self
            .edges
            .values()
            .any(|e| e.source_node_id() == source && e.target_node_id() == target);
        if !still_linked {
            if let Some(node) = self.nodes.get_mut(source) {
                node.remove_child(target);
            }
        }

        let target_parent = self.nodes.get(target).and_then(|n| n.parent_id().cloned());
        if target_parent.as_ref() == Some(source) || target_parent.is_none() {
            let fallback = self
                .edges
                .values()
                .filter(|e| e.target_node_id() == target && self.nodes.contains_key(e.source_node_id()))
                .max_by_key(|e| e.created_at())
                .map(|e| e.source_node_id().clone());
            if let Some(node) = self.nodes.get_mut(target) {
                if node.parent_id() != fallback.as_ref() {
                    node.set_parent(fallback);
                }
            }
        }
        trace!("detached edge {}", id);
        Some(edge)
    }

    /// Earliest created node, ties broken by smallest id.
    pub(crate) fn elect_root(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .min_by(|a, b| {
                a.created_at()
                    .cmp(&b.created_at())
                    .then_with(|| a.id().cmp(b.id()))
            })
            .map(|n| n.id().clone())
    }

    fn touch(&mut self) {
        self.updated_at = clock::now();
    }
}
