//! Node entity: a positioned, content-bearing vertex of the mind map.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::clock;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::id::{HandleId, NodeId};

pub const DEFAULT_WIDTH: f64 = 150.0;
pub const DEFAULT_HEIGHT: f64 = 75.0;

/// Open key-value bag attached to nodes, edges and maps.
/// Values are arbitrary JSON; the model never interprets them.
pub type Metadata = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Partial position; only the given axes are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl From<Position> for PositionUpdate {
    fn from(p: Position) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Whether a handle originates or terminates edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    Source,
    Target,
}

impl HandleType {
    pub fn opposite(self) -> Self {
        match self {
            HandleType::Source => HandleType::Target,
            HandleType::Target => HandleType::Source,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandleType::Source => "source",
            HandleType::Target => "target",
        }
    }
}

impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Left,
    Right,
}

impl HandleSide {
    pub fn as_str(self) -> &'static str {
        match self {
            HandleSide::Left => "left",
            HandleSide::Right => "right",
        }
    }
}

/// A named connection point on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub id: HandleId,
    #[serde(rename = "type")]
    pub handle_type: HandleType,
    #[serde(rename = "position")]
    pub side: HandleSide,
}

impl Handle {
    pub fn new(id: impl Into<HandleId>, handle_type: HandleType, side: HandleSide) -> Self {
        Self {
            id: id.into(),
            handle_type,
            side,
        }
    }
}

/// Vertex of the mind map.
///
/// Parent/children are id back-references into the owning map; the node
/// never resolves them itself. Every mutator stamps `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) is_root: bool,
    pub(crate) content: String,
    pub(crate) position: Position,
    pub(crate) dimensions: Dimensions,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) handle_config: Vec<Handle>,
    pub(crate) metadata: Metadata,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Node {
    /// Build a node with an explicit id.
    pub fn new(
        id: NodeId,
        is_root: bool,
        content: impl Into<String>,
        position: Position,
        parent_id: Option<NodeId>,
    ) -> Self {
        let now = clock::now();
        Self {
            id,
            is_root,
            content: content.into(),
            position,
            dimensions: Dimensions::default(),
            parent_id,
            children: Vec::new(),
            handle_config: Vec::new(),
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a node with a freshly generated id.
    pub fn create(
        is_root: bool,
        content: impl Into<String>,
        position: Position,
        parent_id: Option<NodeId>,
    ) -> Self {
        Self::new(NodeId::generate(), is_root, content, position, parent_id)
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn handle_config(&self) -> &[Handle] {
        &self.handle_config
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

    pub fn handle(&self, id: &HandleId) -> Option<&Handle> {
        self.handle_config.iter().find(|h| &h.id == id)
    }

    /// Handles of the given type, in configuration order.
    pub fn handles_of(&self, handle_type: HandleType) -> impl Iterator<Item = &Handle> {
        self.handle_config
            .iter()
            .filter(move |h| h.handle_type == handle_type)
    }

    pub fn handle_on(&self, handle_type: HandleType, side: HandleSide) -> Option<&Handle> {
        self.handles_of(handle_type).find(|h| h.side == side)
    }

    /// Replace the content. `None` and the empty string both store an empty
    /// string; this never fails, callers validate before persisting.
    pub fn update_content<S: Into<String>>(&mut self, content: Option<S>) {
        self.content = content.map(Into::into).unwrap_or_default();
        self.touch();
    }

    /// Shallow-merge the given axes.
    pub fn update_position(&mut self, update: PositionUpdate) {
        if let Some(x) = update.x {
            self.position.x = x;
        }
        if let Some(y) = update.y {
            self.position.y = y;
        }
        self.touch();
    }

    /// Each dimension changes only if provided.
    pub fn update_dimensions(&mut self, height: Option<f64>, width: Option<f64>) {
        if let Some(height) = height {
            self.dimensions.height = height;
        }
        if let Some(width) = width {
            self.dimensions.width = width;
        }
        self.touch();
    }

    pub fn set_parent(&mut self, parent_id: Option<NodeId>) {
        self.parent_id = parent_id;
        self.touch();
    }

    /// Idempotent: a child already present is not inserted twice.
    pub fn add_child(&mut self, child_id: NodeId) {
        if !self.children.contains(&child_id) {
            self.children.push(child_id);
            self.touch();
        }
    }

    pub fn remove_child(&mut self, child_id: &NodeId) {
        if let Some(index) = self.children.iter().position(|c| c == child_id) {
            self.children.remove(index);
            self.touch();
        }
    }

    pub fn set_handle_config(&mut self, handles: Vec<Handle>) {
        self.handle_config = handles;
        self.touch();
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
        self.touch();
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.id.is_empty() {
            return Err(DomainError::validation("Node id is missing"));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::validation("Node content must not be empty"));
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
    use crate::domain::clock::{install, FixedClock};
    use chrono::Duration;
    use std::sync::Arc;

    fn node(content: &str) -> Node {
        Node::create(false, content, Position::default(), None)
    }

    #[test]
    fn given_new_node_then_has_defaults() {
        let n = node("idea");
        assert_eq!(n.dimensions(), Dimensions::default());
        assert!(n.handle_config().is_empty());
        assert!(n.children().is_empty());
        assert_eq!(n.created_at(), n.updated_at());
    }

    #[test]
    fn given_child_added_twice_when_inspecting_then_present_once() {
        let mut n = node("idea");
        let child = NodeId::new("c1");
        n.add_child(child.clone());
        n.add_child(child.clone());
        assert_eq!(n.children(), &[child]);
    }

    #[test]
    fn given_absent_child_when_removed_then_noop() {
        let mut n = node("idea");
        n.add_child(NodeId::new("c1"));
        n.remove_child(&NodeId::new("other"));
        assert_eq!(n.children().len(), 1);
    }

    #[test]
    fn given_none_content_when_updating_then_stores_empty_and_invalidates() {
        let mut n = node("idea");
        n.update_content(None::<String>);
        assert_eq!(n.content(), "");
        assert!(!n.is_valid());
    }

    #[test]
    fn given_whitespace_content_when_validating_then_invalid() {
        assert!(!node("   ").is_valid());
        assert!(node(" x ").is_valid());
    }

    #[test]
    fn given_partial_position_when_updating_then_only_given_axis_changes() {
        let mut n = Node::create(false, "a", Position::new(1.0, 2.0), None);
        n.update_position(PositionUpdate {
            x: None,
            y: Some(9.0),
        });
        assert_eq!(n.position(), Position::new(1.0, 9.0));
    }

    #[test]
    fn given_only_width_when_updating_dimensions_then_height_retained() {
        let mut n = node("a");
        n.update_dimensions(None, Some(300.0));
        assert_eq!(n.dimensions().width, 300.0);
        assert_eq!(n.dimensions().height, DEFAULT_HEIGHT);
    }

    #[test]
    fn given_mutation_when_clock_advanced_then_updated_at_moves() {
        let clock = Arc::new(FixedClock::epoch());
        let _guard = install(clock.clone());
        let mut n = node("a");
        clock.advance(Duration::seconds(10));

        n.add_metadata("color", serde_json::json!("red"));

        assert_eq!(n.updated_at() - n.created_at(), Duration::seconds(10));
        assert_eq!(n.metadata()["color"], serde_json::json!("red"));
    }

    #[test]
    fn given_handles_when_querying_by_type_and_side_then_found() {
        let mut n = node("a");
        n.set_handle_config(vec![
            Handle::new("a-target", HandleType::Target, HandleSide::Left),
            Handle::new("a-source", HandleType::Source, HandleSide::Right),
        ]);
        assert_eq!(
            n.handle_on(HandleType::Source, HandleSide::Right).map(|h| h.id.as_str()),
            Some("a-source")
        );
        assert!(n.handle_on(HandleType::Source, HandleSide::Left).is_none());
        assert_eq!(n.handles_of(HandleType::Target).count(), 1);
    }
}
