//! Plain-data wire shape of a mind map and its conversion to/from the aggregate.
//!
//! Loading treats the edge list as the source of truth for connectivity:
//! embedded `children` arrays only contribute their ordering, never their
//! membership. Drift found on load is repaired and logged, never reported
//! as an error.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::clock;
use crate::domain::edge::{Edge, EdgeStyle, DEFAULT_EDGE_TYPE};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::{EdgeId, HandleId, MindMapId, NodeId};
use crate::domain::mindmap::MindMap;
use crate::domain::node::{
    Dimensions, Handle, Metadata, Node, Position, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: NodeId,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub handle_config: Option<Vec<Handle>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
    #[serde(default)]
    pub source_handle_id: Option<HandleId>,
    #[serde(default)]
    pub target_handle_id: Option<HandleId>,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapData {
    pub id: MindMapId,
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    #[serde(default)]
    pub root_node_id: Option<NodeId>,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis", default = "clock::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl From<&Node> for NodeData {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            is_root: node.is_root,
            content: node.content.clone(),
            position: node.position,
            parent_id: node.parent_id.clone(),
            children: node.children.clone(),
            created_at: node.created_at,
            updated_at: node.updated_at,
            metadata: node.metadata.clone(),
            height: node.dimensions.height,
            width: node.dimensions.width,
            handle_config: Some(node.handle_config.clone()),
        }
    }
}

impl From<&Edge> for EdgeData {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source_node_id: edge.source_node_id.clone(),
            target_node_id: edge.target_node_id.clone(),
            edge_type: edge.edge_type.clone(),
            source_handle_id: edge.source_handle_id.clone(),
            target_handle_id: edge.target_handle_id.clone(),
            style: edge.style.clone(),
            created_at: edge.created_at,
            updated_at: edge.updated_at,
            metadata: edge.metadata.clone(),
        }
    }
}

impl From<&MindMap> for MindMapData {
    fn from(map: &MindMap) -> Self {
        Self {
            id: map.id.clone(),
            title: map.title.clone(),
            nodes: map.nodes.values().map(NodeData::from).collect(),
            edges: map.edges.values().map(EdgeData::from).collect(),
            root_node_id: map.root_node_id.clone(),
            created_at: map.created_at,
            updated_at: map.updated_at,
            metadata: map.metadata.clone(),
        }
    }
}

impl NodeData {
    fn into_node(self) -> Node {
        Node {
            id: self.id,
            is_root: self.is_root,
            content: self.content,
            position: self.position,
            dimensions: Dimensions {
                width: self.width,
                height: self.height,
            },
            parent_id: self.parent_id,
            children: Vec::new(),
            handle_config: self.handle_config.unwrap_or_default(),
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl EdgeData {
    fn into_edge(self) -> Edge {
        Edge {
            id: self.id,
            source_node_id: self.source_node_id,
            target_node_id: self.target_node_id,
            edge_type: self.edge_type,
            source_handle_id: self.source_handle_id,
            target_handle_id: self.target_handle_id,
            style: self.style,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl MindMap {
    pub fn to_data(&self) -> MindMapData {
        MindMapData::from(self)
    }

    /// Rebuild an aggregate, repairing drift between nodes and edges.
    #[instrument(level = "debug", skip(data), fields(map = %data.id))]
    pub fn from_data(data: MindMapData) -> DomainResult<Self> {
        if data.id.is_empty() {
            return Err(DomainError::Malformed("mind map id is missing".into()));
        }
        if !data.id.is_file_name_safe() {
            return Err(DomainError::Malformed(format!(
                "mind map id '{}' is not a plain name",
                data.id
            )));
        }

        let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
        let mut child_order: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for node_data in data.nodes {
            if node_data.id.is_empty() {
                return Err(DomainError::Malformed("node id is missing".into()));
            }
            if nodes.contains_key(&node_data.id) {
                warn!("duplicate node {} in snapshot, keeping the last", node_data.id);
            }
            child_order.insert(node_data.id.clone(), node_data.children.clone());
            let node = node_data.into_node();
            nodes.insert(node.id.clone(), node);
        }

        let mut edges: BTreeMap<EdgeId, Edge> = BTreeMap::new();
        let mut edge_order: Vec<EdgeId> = Vec::new();
        for edge_data in data.edges {
            let edge = edge_data.into_edge();
            if edge.validate().is_err() {
                warn!("dropping invalid edge {}", edge.id);
                continue;
            }
            if !nodes.contains_key(&edge.source_node_id)
                || !nodes.contains_key(&edge.target_node_id)
            {
                warn!("dropping edge {} with a missing endpoint", edge.id);
                continue;
            }
            if edges.contains_key(&edge.id) {
                warn!("dropping duplicate edge {}", edge.id);
                continue;
            }
            edge_order.push(edge.id.clone());
            edges.insert(edge.id.clone(), edge);
        }

        // Membership from edges, ordering hinted by the payload.
        let mut derived: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut latest_incoming: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for edge_id in &edge_order {
            if let Some(edge) = edges.get(edge_id) {
                let list = derived.entry(edge.source_node_id.clone()).or_default();
                if !list.contains(&edge.target_node_id) {
                    list.push(edge.target_node_id.clone());
                }
                latest_incoming.insert(edge.target_node_id.clone(), edge.source_node_id.clone());
            }
        }

        // A declared parent stands only if an edge backs it.
        let node_ids: Vec<NodeId> = nodes.keys().cloned().collect();
        for id in &node_ids {
            let declared = nodes.get(id).and_then(|n| n.parent_id.clone());
            let backed = declared
                .as_ref()
                .is_some_and(|p| derived.get(p).is_some_and(|c| c.contains(id)));
            if backed {
                continue;
            }
            let repaired = latest_incoming.get(id).cloned();
            if let Some(parent) = &declared {
                warn!("parent {} of node {} has no edge, re-deriving", parent, id);
            }
            if let Some(node) = nodes.get_mut(id) {
                node.parent_id = repaired;
            }
        }

        for (id, members) in derived {
            let hint = child_order.remove(&id).unwrap_or_default();
            let members_set: HashSet<&NodeId> = members.iter().collect();
            let mut ordered: Vec<NodeId> = Vec::with_capacity(members.len());
            for child in hint {
                if members_set.contains(&child) && !ordered.contains(&child) {
                    ordered.push(child);
                }
            }
            for child in members.iter() {
                if !ordered.contains(child) {
                    ordered.push(child.clone());
                }
            }
            if let Some(node) = nodes.get_mut(&id) {
                node.children = ordered;
            }
        }

        let mut map = MindMap {
            id: data.id,
            title: data.title,
            nodes,
            edges,
            root_node_id: data.root_node_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
            metadata: data.metadata,
        };

        let root_ok = map
            .root_node_id
            .as_ref()
            .is_some_and(|r| map.nodes.contains_key(r));
        if !root_ok && !map.nodes.is_empty() {
            if let Some(stale) = &map.root_node_id {
                warn!("root {} is missing, re-electing", stale);
            }
            map.root_node_id = map.elect_root();
        } else if !root_ok {
            map.root_node_id = None;
        }

        debug!(
            "loaded {} nodes and {} edges",
            map.nodes.len(),
            map.edges.len()
        );
        Ok(map)
    }

    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(&self.to_data())
            .map_err(|e| DomainError::Malformed(e.to_string()))
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        let data: MindMapData =
            serde_json::from_str(json).map_err(|e| DomainError::Malformed(e.to_string()))?;
        Self::from_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_timestamp_when_serialized_then_millisecond_zulu_format() {
        let map = MindMap::create("t");
        let json = serde_json::to_value(map.to_data()).unwrap();
        let created = json["createdAt"].as_str().unwrap();
        assert_eq!(created.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(created.ends_with('Z'));
    }

    #[test]
    fn given_minimal_payload_when_loading_then_defaults_applied() {
        let json = r#"{
            "id": "m", "title": "t",
            "nodes": [{"id": "a", "content": "A", "createdAt": "2024-01-01T00:00:00.000Z",
                       "updatedAt": "2024-01-01T00:00:00.000Z", "handleConfig": null}],
            "edges": []
        }"#;
        let map = MindMap::from_json(json).unwrap();
        let node = map.get_node(&NodeId::new("a")).unwrap();
        assert_eq!(node.dimensions(), Dimensions::default());
        assert!(node.handle_config().is_empty());
        assert_eq!(map.root_node_id(), Some(&NodeId::new("a")));
    }

    #[test]
    fn given_garbage_when_loading_then_malformed() {
        assert!(matches!(
            MindMap::from_json("{ not json"),
            Err(DomainError::Malformed(_))
        ));
    }
}
