//! Mind map use cases
//!
//! Each mutating use case loads the map, applies one model or surgery
//! operation, and saves the result. A failed operation saves nothing.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::application::outline::{export_text, import_text};
use crate::application::surgery::{
    self, ConnectionRequest, DeleteReport, DragOutcome, Reconnection, SpawnOutcome,
};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    default_source_handle, DomainError, DomainResult, EdgeId, EdgeUpdate, EntityKind, HandleId,
    HandleOrientation, MindMap, MindMapId, Node, NodeId, NodeUpdate, Position, Statistics,
};
use crate::infrastructure::traits::MindMapRepository;

/// Interchange formats for export and import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeFormat {
    Json,
    Text,
}

impl FromStr for ExchangeFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExchangeFormat::Json),
            "text" | "txt" | "md" => Ok(ExchangeFormat::Text),
            other => Err(ApplicationError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeFormat::Json => f.write_str("json"),
            ExchangeFormat::Text => f.write_str("text"),
        }
    }
}

/// Listing entry for a stored map.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMapSummary {
    pub id: MindMapId,
    pub title: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&MindMap> for MindMapSummary {
    fn from(map: &MindMap) -> Self {
        Self {
            id: map.id().clone(),
            title: map.title().to_string(),
            node_count: map.node_count(),
            edge_count: map.edge_count(),
            updated_at: map.updated_at(),
        }
    }
}

/// How `delete_nodes` treats the neighbours of deleted nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Splice incomers to outgoers.
    #[default]
    Smart,
    /// Drop touching edges only.
    Simple,
}

/// Service for mind map use cases.
pub struct MindMapService {
    repo: Arc<dyn MindMapRepository>,
    settings: Arc<Settings>,
}

impl MindMapService {
    /// Create a new mind map service.
    pub fn new(repo: Arc<dyn MindMapRepository>, settings: Arc<Settings>) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load, mutate, save. Nothing is saved if `op` fails.
    fn modify<T>(
        &self,
        id: &MindMapId,
        op: impl FnOnce(&mut MindMap) -> DomainResult<T>,
    ) -> ApplicationResult<(T, MindMap)> {
        let mut map = self.load(id)?;
        let result = op(&mut map)?;
        let saved = self.repo.save(&map)?;
        Ok((result, saved))
    }

    // ------------------------------------------------------------
    // Maps
    // ------------------------------------------------------------

    #[instrument(level = "debug", skip(self))]
    pub fn create(&self, title: Option<&str>) -> ApplicationResult<MindMap> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(self.settings.default_title.as_str());
        let map = MindMap::create_with_root(title, &self.settings.root_content);
        info!("created mind map {} ({})", map.id(), map.title());
        self.repo.save(&map)
    }

    pub fn load(&self, id: &MindMapId) -> ApplicationResult<MindMap> {
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ApplicationError::MindMapNotFound(id.clone()))
    }

    pub fn save(&self, map: &MindMap) -> ApplicationResult<MindMap> {
        if !map.is_valid() {
            return Err(DomainError::validation("Invalid mind map data").into());
        }
        self.repo.save(map)
    }

    pub fn delete(&self, id: &MindMapId) -> ApplicationResult<()> {
        if !self.repo.delete(id)? {
            return Err(ApplicationError::MindMapNotFound(id.clone()));
        }
        info!("deleted mind map {}", id);
        Ok(())
    }

    pub fn list(&self) -> ApplicationResult<Vec<MindMapSummary>> {
        Ok(self
            .repo
            .find_all()?
            .iter()
            .map(MindMapSummary::from)
            .collect())
    }

    pub fn rename(&self, id: &MindMapId, title: &str) -> ApplicationResult<MindMap> {
        let ((), map) = self.modify(id, |map| map.rename(title))?;
        Ok(map)
    }

    // ------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------

    /// Add a node. With a parent the node is wired from the parent's default
    /// source handle and inherits its orientation.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(
        &self,
        id: &MindMapId,
        content: &str,
        position: Position,
        parent: Option<&NodeId>,
    ) -> ApplicationResult<(NodeId, MindMap)> {
        self.modify(id, |map| match parent {
            Some(parent_id) => {
                let parent_node = map
                    .get_node(parent_id)
                    .ok_or_else(|| DomainError::not_found(EntityKind::Node, parent_id))?;
                let handle = default_source_handle(parent_node);
                let outcome =
                    surgery::spawn_connected_node(map, parent_id, &handle, position, content)?;
                Ok(outcome.node_id)
            }
            None => {
                let mut node = Node::create(false, content, position, None);
                let node_id = node.id().clone();
                node.set_handle_config(HandleOrientation::RIGHTWARD.handles_for(&node_id));
                map.add_node(node)?;
                Ok(node_id)
            }
        })
    }

    pub fn update_node(
        &self,
        id: &MindMapId,
        node_id: &NodeId,
        update: NodeUpdate,
    ) -> ApplicationResult<MindMap> {
        let ((), map) = self.modify(id, |map| map.update_node(node_id, update).map(|_| ()))?;
        Ok(map)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete_nodes(
        &self,
        id: &MindMapId,
        node_ids: &[NodeId],
        mode: DeleteMode,
    ) -> ApplicationResult<(DeleteReport, MindMap)> {
        let (report, map) = self.modify(id, |map| match mode {
            DeleteMode::Smart => surgery::smart_delete(map, node_ids),
            DeleteMode::Simple => Ok(surgery::simple_delete(map, node_ids)),
        })?;
        debug!(
            "deleted {} nodes, rerouted {} edges",
            report.removed_nodes.len(),
            report.created_edges.len()
        );
        Ok((report, map))
    }

    pub fn spawn_node(
        &self,
        id: &MindMapId,
        source: &NodeId,
        source_handle: &HandleId,
        position: Position,
        content: Option<&str>,
    ) -> ApplicationResult<(SpawnOutcome, MindMap)> {
        let content = content.unwrap_or(self.settings.spawn_content.as_str());
        self.modify(id, |map| {
            surgery::spawn_connected_node(map, source, source_handle, position, content)
        })
    }

    /// Release a dragged node at `position`, auto-connecting it if a valid
    /// connection is in reach.
    pub fn drop_node(
        &self,
        id: &MindMapId,
        node_id: &NodeId,
        position: Position,
    ) -> ApplicationResult<(DragOutcome, MindMap)> {
        let threshold = self.settings.proximity_threshold;
        self.modify(id, |map| surgery::finalize_drag(map, node_id, position, threshold))
    }

    // ------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------

    pub fn connect(
        &self,
        id: &MindMapId,
        request: ConnectionRequest,
    ) -> ApplicationResult<(EdgeId, MindMap)> {
        self.modify(id, |map| surgery::connect(map, request))
    }

    pub fn connect_nodes(
        &self,
        id: &MindMapId,
        source: &NodeId,
        target: &NodeId,
        edge_type: Option<&str>,
    ) -> ApplicationResult<(EdgeId, MindMap)> {
        self.modify(id, |map| surgery::connect_nodes(map, source, target, edge_type))
    }

    pub fn disconnect_nodes(
        &self,
        id: &MindMapId,
        a: &NodeId,
        b: &NodeId,
    ) -> ApplicationResult<(EdgeId, MindMap)> {
        self.modify(id, |map| surgery::disconnect_nodes(map, a, b))
    }

    pub fn update_edge(
        &self,
        id: &MindMapId,
        edge_id: &EdgeId,
        update: EdgeUpdate,
    ) -> ApplicationResult<MindMap> {
        let ((), map) = self.modify(id, |map| map.update_edge(edge_id, update).map(|_| ()))?;
        Ok(map)
    }

    pub fn reconnect_edge(
        &self,
        id: &MindMapId,
        edge_id: &EdgeId,
        to: Reconnection,
    ) -> ApplicationResult<(EdgeId, MindMap)> {
        self.modify(id, |map| surgery::reconnect_edge(map, edge_id, to))
    }

    // ------------------------------------------------------------
    // Queries and interchange
    // ------------------------------------------------------------

    /// Matching nodes as `(id, content)` pairs.
    pub fn search(&self, id: &MindMapId, term: &str) -> ApplicationResult<Vec<(NodeId, String)>> {
        let map = self.load(id)?;
        Ok(map
            .search(term)
            .into_iter()
            .map(|n| (n.id().clone(), n.content().to_string()))
            .collect())
    }

    pub fn statistics(&self, id: &MindMapId) -> ApplicationResult<Statistics> {
        Ok(self.load(id)?.statistics())
    }

    pub fn export(&self, id: &MindMapId, format: ExchangeFormat) -> ApplicationResult<String> {
        let map = self.load(id)?;
        match format {
            ExchangeFormat::Json => Ok(map.to_json()?),
            ExchangeFormat::Text => Ok(export_text(&map)),
        }
    }

    #[instrument(level = "debug", skip(self, data))]
    pub fn import(&self, data: &str, format: ExchangeFormat) -> ApplicationResult<MindMap> {
        let map = match format {
            ExchangeFormat::Json => MindMap::from_json(data)?,
            ExchangeFormat::Text => import_text(data)?,
        };
        info!(
            "imported mind map {} with {} nodes",
            map.id(),
            map.node_count()
        );
        self.save(&map)
    }
}
