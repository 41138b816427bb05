//! Plain-text outline interchange.
//!
//! ```text
//! # Title
//!
//! - Central Topic
//!   - Child
//!     - Grandchild
//! ```

use generational_arena::Index;
use regex::Regex;
use tracing::{debug, instrument};

use crate::application::surgery::inherit_orientation;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    default_source_handle, handle_id, root_handles, DomainError, Edge, HandleOrientation,
    HandleType, MindMap, MindMapId, Node, NodeId, OutlineItem, OutlineTree, Position,
    DEFAULT_EDGE_TYPE,
};

pub const IMPORTED_TITLE: &str = "Imported Mind Map";

const INDENT: &str = "  ";
const COLUMN_WIDTH: f64 = 250.0;
const ROW_HEIGHT: f64 = 100.0;
const ORIGIN: Position = Position { x: 250.0, y: 100.0 };

/// Render `map` as an indented bullet list under a `# title` heading.
#[instrument(level = "debug", skip(map), fields(map = %map.id()))]
pub fn export_text(map: &MindMap) -> String {
    let tree = OutlineTree::from_mindmap(map);
    let mut lines = vec![format!("# {}", map.title()), String::new()];
    lines.extend(
        tree.iter()
            .map(|(_, level, node)| format!("{}- {}", INDENT.repeat(level), node.item.content)),
    );
    lines.join("\n")
}

/// Parse an outline into a tree. Returns the title, if a heading was found.
pub fn parse_outline(text: &str) -> ApplicationResult<(Option<String>, OutlineTree)> {
    let re = Regex::new(r"^(\s*)- (.+)$").map_err(|e| ApplicationError::OperationFailed {
        context: "compile outline pattern".to_string(),
        source: Box::new(e),
    })?;
    let mut title = None;
    let mut tree = OutlineTree::new();
    let mut stack: Vec<Index> = Vec::new();

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(heading) = line.strip_prefix("# ") {
            title = Some(heading.to_string());
            continue;
        }
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let level = caps[1].chars().count() / 2;
        let content = caps[2].to_string();
        if content.trim().is_empty() {
            debug!("skipping blank outline item");
            continue;
        }

        stack.truncate(level);
        let parent = stack.last().copied();
        let idx = tree.insert(
            OutlineItem {
                node_id: None,
                content,
            },
            parent,
        );
        stack.push(idx);
    }
    Ok((title, tree))
}

/// Build a new mind map from an outline.
///
/// The first top-level item becomes the root; every nested item is linked
/// from its nearest shallower item with an inherited handle orientation.
#[instrument(level = "debug", skip(text))]
pub fn import_text(text: &str) -> ApplicationResult<MindMap> {
    let (title, tree) = parse_outline(text)?;
    if tree.is_empty() {
        return Err(DomainError::validation("Outline contains no items").into());
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| IMPORTED_TITLE.to_string());
    let mut map = MindMap::new(MindMapId::generate(), title);

    let mut ids: Vec<(Index, NodeId)> = Vec::with_capacity(tree.len());
    let lookup = |ids: &[(Index, NodeId)], idx: Index| {
        ids.iter().find(|(i, _)| *i == idx).map(|(_, id)| id.clone())
    };

    for (row, (idx, level, entry)) in tree.iter().enumerate() {
        let position = Position::new(
            ORIGIN.x + COLUMN_WIDTH * level as f64,
            ORIGIN.y + ROW_HEIGHT * row as f64,
        );
        let is_root = row == 0;
        let mut node = Node::create(is_root, entry.item.content.as_str(), position, None);
        let node_id = node.id().clone();

        let parent = entry.parent.and_then(|p| lookup(&ids, p));
        let (orientation, source_handle) = match &parent {
            Some(parent_id) => {
                let parent_node = map
                    .get_node(parent_id)
                    .ok_or_else(|| DomainError::validation("Outline parent was not created"))?;
                let source_handle = default_source_handle(parent_node);
                (inherit_orientation(parent_node, &source_handle)?, Some(source_handle))
            }
            None => (HandleOrientation::RIGHTWARD, None),
        };

        if is_root {
            node.set_handle_config(root_handles(&node_id));
        } else {
            node.set_handle_config(orientation.handles_for(&node_id));
        }
        map.add_node(node)?;

        if let (Some(parent_id), Some(source_handle)) = (parent, source_handle) {
            let mut edge = Edge::create(parent_id, node_id.clone(), Some(DEFAULT_EDGE_TYPE));
            edge.set_handle_ids(
                Some(source_handle),
                Some(handle_id(&node_id, HandleType::Target)),
            );
            map.add_edge(edge)?;
        }
        ids.push((idx, node_id));
    }

    debug!("imported {} nodes", map.node_count());
    Ok(map)
}
