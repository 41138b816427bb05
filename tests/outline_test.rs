//! Tests for plain-text outline export and import

use mindmap::application::{export_text, import_text, ApplicationError};
use mindmap::domain::{
    DomainError, Edge, HandleOrientation, HandleType, MindMap, MindMapId, Node, NodeId, Position,
};

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

/// Root -> A -> B, Root -> C
fn tree_map() -> MindMap {
    let mut map = MindMap::new(MindMapId::new("m"), "Plan");
    for (name, content) in [("r", "Root"), ("a", "A"), ("b", "B"), ("c", "C")] {
        let node = Node::new(id(name), name == "r", content, Position::default(), None);
        map.add_node(node).unwrap();
    }
    for (s, t) in [("r", "a"), ("a", "b"), ("r", "c")] {
        map.add_edge(Edge::create(id(s), id(t), None)).unwrap();
    }
    map
}

fn content_of<'a>(map: &'a MindMap, node: &NodeId) -> &'a str {
    map.get_node(node).unwrap().content()
}

#[test]
fn given_tree_when_exporting_then_indented_outline_under_heading() {
    let text = export_text(&tree_map());
    assert_eq!(text, "# Plan\n\n- Root\n  - A\n    - B\n  - C");
}

#[test]
fn given_orphan_when_exporting_then_listed_as_extra_top_level_item() {
    let mut map = tree_map();
    map.add_node(Node::new(id("z"), false, "Loose", Position::default(), None))
        .unwrap();

    let text = export_text(&map);

    assert!(text.ends_with("\n- Loose"), "{text}");
}

#[test]
fn given_outline_when_importing_then_first_item_is_root_with_linked_children() {
    let text = "# Trip\n\n- Japan\n  - Tokyo\n    - Shibuya\n  - Kyoto\n";

    let map = import_text(text).unwrap();

    assert_eq!(map.title(), "Trip");
    assert_eq!(map.node_count(), 4);
    assert_eq!(map.edge_count(), 3);
    let root_id = map.root_node_id().cloned().unwrap();
    let root = map.get_node(&root_id).unwrap();
    assert!(root.is_root());
    assert_eq!(root.content(), "Japan");
    assert_eq!(root.handle_config().len(), 2);
    assert_eq!(root.position(), Position::new(250.0, 100.0));

    let children: Vec<&str> = root.children().iter().map(|c| content_of(&map, c)).collect();
    assert_eq!(children, vec!["Tokyo", "Kyoto"]);

    let tokyo = map.get_node(&root.children()[0]).unwrap();
    assert_eq!(tokyo.position(), Position::new(500.0, 200.0));
    assert_eq!(HandleOrientation::of(tokyo), Some(HandleOrientation::RIGHTWARD));
    let shibuya = map.get_node(&tokyo.children()[0]).unwrap();
    assert_eq!(shibuya.content(), "Shibuya");
    assert_eq!(shibuya.position(), Position::new(750.0, 300.0));
}

#[test]
fn given_imported_edges_when_inspecting_then_wired_through_handles() {
    let map = import_text("- Root\n  - Child\n").unwrap();
    let root_id = map.root_node_id().cloned().unwrap();
    let edge = map.edges().next().unwrap();

    assert_eq!(edge.source_node_id(), &root_id);
    assert_eq!(
        edge.source_handle_id().map(|h| h.as_str().to_string()),
        Some(format!("{root_id}-source-right"))
    );
    let child = edge.target_node_id();
    assert_eq!(
        edge.target_handle_id().map(|h| h.as_str().to_string()),
        Some(format!("{child}-{}", HandleType::Target))
    );
}

#[test]
fn given_no_heading_when_importing_then_default_title() {
    let map = import_text("- Only\n").unwrap();
    assert_eq!(map.title(), "Imported Mind Map");
}

#[test]
fn given_empty_outline_when_importing_then_validation_error() {
    let err = import_text("# Nothing here\n\nsome prose\n").unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::Validation(_))
    ));
}

#[test]
fn given_exported_map_when_reimported_then_same_shape() {
    let original = tree_map();

    let back = import_text(&export_text(&original)).unwrap();

    assert_eq!(export_text(&back), export_text(&original));
    assert_eq!(back.statistics().max_depth, 2);
}
