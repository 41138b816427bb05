//! Arena-backed outline tree: the mind map flattened into an ordered
//! hierarchy for text interchange and tree display.

use std::collections::HashSet;
use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::id::NodeId;
use crate::domain::mindmap::MindMap;

/// Payload of one outline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    /// Backing node, if the entry came from a mind map.
    pub node_id: Option<NodeId>,
    pub content: String,
}

impl fmt::Display for OutlineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(id) => write!(f, "{} [{}]", self.content, id),
            None => f.write_str(&self.content),
        }
    }
}

#[derive(Debug)]
pub struct OutlineNode {
    pub item: OutlineItem,
    pub parent: Option<Index>,
    pub children: Vec<Index>,
}

/// Forest of outline entries. The first top-level entry is the map root.
#[derive(Debug, Default)]
pub struct OutlineTree {
    arena: Arena<OutlineNode>,
    roots: Vec<Index>,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the map depth-first from the root along `children`. Parentless
    /// nodes and anything left unvisited (cycles) become extra top-level
    /// entries; a node is emitted at most once.
    #[instrument(level = "debug", skip(map), fields(map = %map.id()))]
    pub fn from_mindmap(map: &MindMap) -> Self {
        let mut tree = Self::new();
        let mut visited: HashSet<NodeId> = HashSet::new();

        let mut starts: Vec<&NodeId> = Vec::new();
        if let Some(root) = map.root_node_id() {
            starts.push(root);
        }
        starts.extend(
            map.nodes()
                .filter(|n| n.parent_id().is_none())
                .map(|n| n.id()),
        );
        starts.extend(map.nodes().map(|n| n.id()));

        for start in starts {
            if !visited.contains(start) {
                tree.append_subtree(map, start, None, &mut visited);
            }
        }
        tree
    }

    fn append_subtree(
        &mut self,
        map: &MindMap,
        id: &NodeId,
        parent: Option<Index>,
        visited: &mut HashSet<NodeId>,
    ) {
        let Some(node) = map.get_node(id) else {
            return;
        };
        if !visited.insert(id.clone()) {
            return;
        }
        let idx = self.insert(
            OutlineItem {
                node_id: Some(id.clone()),
                content: node.content().to_string(),
            },
            parent,
        );
        for child in node.children() {
            self.append_subtree(map, child, Some(idx), visited);
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, item: OutlineItem, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(OutlineNode {
            item,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(idx),
            None => {
                if let Some(node) = self.arena.get_mut(idx) {
                    node.parent = None;
                }
                self.roots.push(idx);
            }
        }
        idx
    }

    pub fn get(&self, idx: Index) -> Option<&OutlineNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk yielding `(index, level, node)`; top-level entries are level 0.
    pub fn iter(&self) -> OutlineIter<'_> {
        OutlineIter::new(self)
    }

    /// Number of levels in the deepest branch.
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&r| self.calculate_depth(r))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        match self.get(idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Contents of entries without children, in pre-order.
    pub fn leaves(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, _, node)| node.children.is_empty())
            .map(|(_, _, node)| node.item.content.clone())
            .collect()
    }

    /// Render under a single heading, e.g. the map title.
    pub fn to_termtree(&self, heading: &str) -> Tree<String> {
        let mut top = Tree::new(heading.to_string());
        for &root in &self.roots {
            if let Some(tree) = self.subtree(root) {
                top.push(tree);
            }
        }
        top
    }

    fn subtree(&self, idx: Index) -> Option<Tree<String>> {
        let node = self.get(idx)?;
        let mut tree = Tree::new(node.item.to_string());
        for &child in &node.children {
            if let Some(sub) = self.subtree(child) {
                tree.push(sub);
            }
        }
        Some(tree)
    }
}

pub struct OutlineIter<'a> {
    tree: &'a OutlineTree,
    stack: Vec<(Index, usize)>,
}

impl<'a> OutlineIter<'a> {
    fn new(tree: &'a OutlineTree) -> Self {
        let stack = tree.roots.iter().rev().map(|&r| (r, 0)).collect();
        Self { tree, stack }
    }
}

impl<'a> Iterator for OutlineIter<'a> {
    type Item = (Index, usize, &'a OutlineNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, level)) = self.stack.pop() {
            if let Some(node) = self.tree.get(idx) {
                // Reverse push keeps siblings left to right.
                for &child in node.children.iter().rev() {
                    self.stack.push((child, level + 1));
                }
                return Some((idx, level, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str) -> OutlineItem {
        OutlineItem {
            node_id: None,
            content: content.to_string(),
        }
    }

    #[test]
    fn given_nested_items_when_iterating_then_preorder_with_levels() {
        let mut tree = OutlineTree::new();
        let a = tree.insert(item("a"), None);
        let b = tree.insert(item("b"), Some(a));
        tree.insert(item("c"), Some(b));
        tree.insert(item("d"), Some(a));

        let walked: Vec<(String, usize)> = tree
            .iter()
            .map(|(_, level, n)| (n.item.content.clone(), level))
            .collect();

        assert_eq!(
            walked,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 1)
            ]
        );
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaves(), vec!["c", "d"]);
    }

    #[test]
    fn given_tree_when_rendering_termtree_then_heading_on_top() {
        let mut tree = OutlineTree::new();
        let a = tree.insert(item("a"), None);
        tree.insert(item("b"), Some(a));
        let rendered = tree.to_termtree("Title").to_string();
        assert!(rendered.starts_with("Title"));
        assert!(rendered.contains("a"));
        assert!(rendered.contains("b"));
    }
}
