//! Edge entity: a directed, typed connection between two node handles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::clock;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::{EdgeId, HandleId, NodeId};
use crate::domain::node::Metadata;

pub const DEFAULT_EDGE_TYPE: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            color: "#666".to_string(),
            width: 2.0,
            opacity: 1.0,
        }
    }
}

/// Partial style; unset fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeStyleUpdate {
    pub color: Option<String>,
    pub width: Option<f64>,
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source_node_id: NodeId,
    pub(crate) target_node_id: NodeId,
    pub(crate) edge_type: String,
    pub(crate) source_handle_id: Option<HandleId>,
    pub(crate) target_handle_id: Option<HandleId>,
    pub(crate) style: EdgeStyle,
    pub(crate) metadata: Metadata,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        edge_type: impl Into<String>,
    ) -> Self {
        let now = clock::now();
        Self {
            id,
            source_node_id,
            target_node_id,
            edge_type: edge_type.into(),
            source_handle_id: None,
            target_handle_id: None,
            style: EdgeStyle::default(),
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build an edge with a generated id and the default style.
    pub fn create(source_node_id: NodeId, target_node_id: NodeId, edge_type: Option<&str>) -> Self {
        Self::new(
            EdgeId::generate(),
            source_node_id,
            target_node_id,
            edge_type.unwrap_or(DEFAULT_EDGE_TYPE),
        )
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source_node_id(&self) -> &NodeId {
        &self.source_node_id
    }

    pub fn target_node_id(&self) -> &NodeId {
        &self.target_node_id
    }

    pub fn edge_type(&self) -> &str {
        &self.edge_type
    }

    pub fn source_handle_id(&self) -> Option<&HandleId> {
        self.source_handle_id.as_ref()
    }

    pub fn target_handle_id(&self) -> Option<&HandleId> {
        self.target_handle_id.as_ref()
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn update_style(&mut self, update: EdgeStyleUpdate) {
        if let Some(color) = update.color {
            self.style.color = color;
        }
        if let Some(width) = update.width {
            self.style.width = width;
        }
        if let Some(opacity) = update.opacity {
            self.style.opacity = opacity;
        }
        self.touch();
    }

    pub fn update_type(&mut self, edge_type: impl Into<String>) {
        self.edge_type = edge_type.into();
        self.touch();
    }

    pub fn set_handle_ids(&mut self, source: Option<HandleId>, target: Option<HandleId>) {
        self.source_handle_id = source;
        self.target_handle_id = target;
        self.touch();
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    pub fn connects_to(&self, node_id: &NodeId) -> bool {
        &self.source_node_id == node_id || &self.target_node_id == node_id
    }

    /// The endpoint that is not `node_id`, or `None` if `node_id` is neither.
    pub fn other_node(&self, node_id: &NodeId) -> Option<&NodeId> {
        if &self.source_node_id == node_id {
            Some(&self.target_node_id)
        } else if &self.target_node_id == node_id {
            Some(&self.source_node_id)
        } else {
            None
        }
    }

    /// Same endpoints and handles, ignoring id and style.
    pub fn same_connection(
        &self,
        source: &NodeId,
        target: &NodeId,
        source_handle: Option<&HandleId>,
        target_handle: Option<&HandleId>,
    ) -> bool {
        &self.source_node_id == source
            && &self.target_node_id == target
            && self.source_handle_id.as_ref() == source_handle
            && self.target_handle_id.as_ref() == target_handle
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("Edge id is missing"));
        }
        if self.source_node_id.is_empty() || self.target_node_id.is_empty() {
            return Err(DomainError::validation("Edge endpoints are missing"));
        }
        if self.source_node_id == self.target_node_id {
            return Err(DomainError::validation("Edge cannot connect a node to itself"));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = clock::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: &str, target: &str) -> Edge {
        Edge::create(NodeId::new(source), NodeId::new(target), None)
    }

    #[test]
    fn given_new_edge_then_has_default_style_and_type() {
        let e = edge("a", "b");
        assert_eq!(e.edge_type(), "default");
        assert_eq!(e.style().color, "#666");
        assert_eq!(e.style().width, 2.0);
        assert_eq!(e.style().opacity, 1.0);
        assert!(e.source_handle_id().is_none());
    }

    #[test]
    fn given_self_loop_when_validating_then_invalid() {
        let e = edge("a", "a");
        assert_eq!(
            e.validate(),
            Err(DomainError::validation("Edge cannot connect a node to itself"))
        );
    }

    #[test]
    fn given_partial_style_when_updating_then_merges() {
        let mut e = edge("a", "b");
        e.update_style(EdgeStyleUpdate {
            color: Some("#f00".into()),
            ..Default::default()
        });
        assert_eq!(e.style().color, "#f00");
        assert_eq!(e.style().width, 2.0);
    }

    #[test]
    fn given_edge_when_asking_other_node_then_returns_opposite_endpoint() {
        let e = edge("a", "b");
        assert_eq!(e.other_node(&NodeId::new("a")), Some(&NodeId::new("b")));
        assert_eq!(e.other_node(&NodeId::new("b")), Some(&NodeId::new("a")));
        assert_eq!(e.other_node(&NodeId::new("c")), None);
        assert!(e.connects_to(&NodeId::new("b")));
        assert!(!e.connects_to(&NodeId::new("c")));
    }
}
