//! Tests for the MindMap aggregate
//!
//! Node/edge bookkeeping, parent/children consistency and root election.

use std::sync::Arc;

use chrono::Duration;
use rstest::rstest;

use mindmap::domain::clock::{self, FixedClock};
use mindmap::domain::{
    handle_id, root_handles, DomainError, Edge, EdgeId, HandleOrientation, HandleType, MindMap,
    MindMapId, Node, NodeId, NodeUpdate, Position, PositionUpdate,
};
use mindmap::util::testing;

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

fn node(name: &str) -> Node {
    let mut node = Node::new(id(name), false, name.to_uppercase(), Position::default(), None);
    node.set_handle_config(HandleOrientation::RIGHTWARD.handles_for(&id(name)));
    node
}

fn edge(eid: &str, source: &str, target: &str) -> Edge {
    let mut edge = Edge::new(EdgeId::new(eid), id(source), id(target), "default");
    edge.set_handle_ids(
        Some(handle_id(&id(source), HandleType::Source)),
        Some(handle_id(&id(target), HandleType::Target)),
    );
    edge
}

/// Every edge endpoint exists, and parent/children links mirror each other.
fn assert_consistent(map: &MindMap) {
    for e in map.edges() {
        assert!(map.contains_node(e.source_node_id()), "dangling source in {}", e.id());
        assert!(map.contains_node(e.target_node_id()), "dangling target in {}", e.id());
        assert_ne!(e.source_node_id(), e.target_node_id());
    }
    for n in map.nodes() {
        if let Some(parent) = n.parent_id() {
            let p = map.get_node(parent).expect("parent exists");
            assert!(p.children().contains(n.id()), "{} missing from {}", n.id(), parent);
        }
        for child in n.children() {
            let c = map.get_node(child).expect("child exists");
            assert_eq!(c.parent_id(), Some(n.id()), "child {} of {}", child, n.id());
        }
    }
}

/// root -> a -> b
fn chain() -> MindMap {
    let mut map = MindMap::new(MindMapId::new("m"), "Chain");
    let mut root = Node::new(id("root"), true, "Root", Position::new(250.0, 100.0), None);
    root.set_handle_config(root_handles(&id("root")));
    map.add_node(root).unwrap();
    map.add_node(node("a")).unwrap();
    map.add_node(node("b")).unwrap();
    map.add_edge(edge("e1", "root", "a")).unwrap();
    map.add_edge(edge("e2", "a", "b")).unwrap();
    map
}

// ============================================================
// create / add
// ============================================================

#[test]
fn given_create_when_inspecting_then_single_root_and_no_edges() {
    testing::init_test_setup();
    let map = MindMap::create("Ideas");

    assert_eq!(map.node_count(), 1);
    assert_eq!(map.edge_count(), 0);
    let root = map.get_all_nodes()[0];
    assert_eq!(map.root_node_id(), Some(root.id()));
    assert!(root.is_root());
    assert_eq!(root.content(), "Central Topic");
    assert_eq!(root.position(), Position::new(250.0, 100.0));
    assert_eq!(root.handle_config().len(), 2);
}

#[test]
fn given_root_when_adding_node_and_edge_then_parent_and_children_linked() {
    let mut map = MindMap::create("Ideas");
    let root_id = map.root_node_id().cloned().unwrap();
    map.add_node(node("n2")).unwrap();

    map.add_edge(Edge::create(root_id.clone(), id("n2"), None)).unwrap();

    assert_eq!(map.get_node(&root_id).unwrap().children(), &[id("n2")]);
    assert_eq!(map.get_node(&id("n2")).unwrap().parent_id(), Some(&root_id));
    assert_consistent(&map);
}

#[test]
fn given_empty_map_when_adding_first_node_then_it_becomes_root() {
    let mut map = MindMap::new(MindMapId::new("m"), "t");
    map.add_node(node("a")).unwrap();
    assert_eq!(map.root_node_id(), Some(&id("a")));
}

#[test]
fn given_existing_id_when_adding_node_then_validation_error() {
    let mut map = chain();
    let err = map.add_node(node("a")).unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(map.node_count(), 3);
}

#[test]
fn given_preset_parent_when_adding_node_then_registered_as_child() {
    let mut map = chain();
    let mut child = node("c");
    child.set_parent(Some(id("b")));

    map.add_node(child).unwrap();

    assert_eq!(map.get_node(&id("b")).unwrap().children(), &[id("c")]);
    assert_consistent(&map);
}

#[test]
fn given_unknown_preset_parent_when_adding_node_then_rejected() {
    let mut map = chain();
    let mut child = node("c");
    child.set_parent(Some(id("ghost")));
    assert!(map.add_node(child).is_err());
    assert!(!map.contains_node(&id("c")));
}

#[rstest]
#[case("root", "ghost")]
#[case("ghost", "a")]
fn given_missing_endpoint_when_adding_edge_then_rejected(#[case] source: &str, #[case] target: &str) {
    let mut map = chain();
    let err = map.add_edge(edge("bad", source, target)).unwrap_err();
    assert_eq!(
        err,
        DomainError::Validation("Edge connects to non-existent nodes".to_string())
    );
    assert_eq!(map.edge_count(), 2);
}

#[test]
fn given_self_loop_when_adding_edge_then_rejected() {
    let mut map = chain();
    assert!(map.add_edge(edge("loop", "a", "a")).is_err());
}

// ============================================================
// remove
// ============================================================

#[test]
fn given_root_edge_when_removed_then_child_orphaned() {
    let mut map = MindMap::create("Ideas");
    let root_id = map.root_node_id().cloned().unwrap();
    map.add_node(node("n2")).unwrap();
    let eid = map
        .add_edge(Edge::create(root_id.clone(), id("n2"), None))
        .unwrap()
        .id()
        .clone();

    assert!(map.remove_edge(&eid));

    assert_eq!(map.get_node(&id("n2")).unwrap().parent_id(), None);
    assert!(map.get_node(&root_id).unwrap().children().is_empty());
    assert!(!map.remove_edge(&eid));
}

#[test]
fn given_second_node_when_root_removed_then_root_reelected() {
    let mut map = MindMap::create("Ideas");
    let root_id = map.root_node_id().cloned().unwrap();
    map.add_node(node("n2")).unwrap();

    assert!(map.remove_node(&root_id));

    assert_eq!(map.root_node_id(), Some(&id("n2")));
}

#[test]
fn given_several_candidates_when_root_removed_then_earliest_created_wins() {
    let fixed = Arc::new(FixedClock::epoch());
    let _guard = clock::install(fixed.clone());
    let mut map = MindMap::new(MindMapId::new("m"), "t");
    map.add_node(node("root")).unwrap();
    fixed.advance(Duration::seconds(1));
    map.add_node(node("z-old")).unwrap();
    fixed.advance(Duration::seconds(1));
    map.add_node(node("a-new")).unwrap();

    map.remove_node(&id("root"));

    assert_eq!(map.root_node_id(), Some(&id("z-old")));
}

#[test]
fn given_middle_node_when_removed_then_edges_dropped_and_child_orphaned() {
    let mut map = chain();

    assert!(map.remove_node(&id("a")));

    assert_eq!(map.edge_count(), 0);
    assert!(map.get_node(&id("root")).unwrap().children().is_empty());
    assert_eq!(map.get_node(&id("b")).unwrap().parent_id(), None);
    assert_consistent(&map);
}

#[test]
fn given_unknown_node_when_removed_then_false() {
    let mut map = chain();
    assert!(!map.remove_node(&id("ghost")));
    assert_eq!(map.node_count(), 3);
}

#[test]
fn given_two_incoming_edges_when_parent_edge_removed_then_parent_rederived() {
    let mut map = chain();
    map.add_node(node("c")).unwrap();
    map.add_edge(edge("e3", "c", "b")).unwrap();
    assert_eq!(map.get_node(&id("b")).unwrap().parent_id(), Some(&id("c")));

    map.remove_edge(&EdgeId::new("e3"));

    assert_eq!(map.get_node(&id("b")).unwrap().parent_id(), Some(&id("a")));
    assert!(map.get_node(&id("c")).unwrap().children().is_empty());
}

// ============================================================
// updates and queries
// ============================================================

#[test]
fn given_blank_content_when_updating_node_then_rejected_and_unchanged() {
    let mut map = chain();
    let update = NodeUpdate {
        content: Some("   ".into()),
        ..Default::default()
    };
    assert!(map.update_node(&id("a"), update).is_err());
    assert_eq!(map.get_node(&id("a")).unwrap().content(), "A");
}

#[test]
fn given_partial_position_when_updating_node_then_other_axis_kept() {
    let mut map = chain();
    let update = NodeUpdate {
        position: Some(PositionUpdate {
            x: Some(40.0),
            y: None,
        }),
        width: Some(300.0),
        ..Default::default()
    };
    let node = map.update_node(&id("a"), update).unwrap();
    assert_eq!(node.position(), Position::new(40.0, 0.0));
    assert_eq!(node.dimensions().width, 300.0);
    assert_eq!(node.dimensions().height, 75.0);
}

#[test]
fn given_unknown_node_when_updating_then_not_found() {
    let mut map = chain();
    let err = map.update_node(&id("ghost"), NodeUpdate::default()).unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[test]
fn given_chain_when_querying_neighbours_then_incomers_and_outgoers() {
    let map = chain();
    let incomers: Vec<&NodeId> = map.incomers(&id("a")).into_iter().map(Node::id).collect();
    let outgoers: Vec<&NodeId> = map.outgoers(&id("a")).into_iter().map(Node::id).collect();
    assert_eq!(incomers, vec![&id("root")]);
    assert_eq!(outgoers, vec![&id("b")]);
    assert!(map.edge_between(&id("b"), &id("a")).is_some());
    assert!(map.edge_between(&id("root"), &id("b")).is_none());
    assert!(map.is_target_handle_connected(&handle_id(&id("b"), HandleType::Target)));
    assert_eq!(map.get_parent(&id("b")).map(Node::id), Some(&id("a")));
}

#[test]
fn given_chain_when_computing_statistics_then_depth_and_counts() {
    let map = chain();
    let stats = map.statistics();
    assert_eq!(stats.total_nodes, 3);
    assert_eq!(stats.total_edges, 2);
    assert_eq!(stats.max_depth, 2);
    assert!((stats.average_children - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.root_node_id, Some(id("root")));
}

#[test]
fn given_mixed_case_content_when_searching_then_case_insensitive() {
    let map = chain();
    let hits: Vec<&NodeId> = map.search("ro").into_iter().map(Node::id).collect();
    assert_eq!(hits, vec![&id("root")]);
    assert_eq!(map.search("B").len(), 1);
}

#[test]
fn given_blank_title_when_renaming_then_rejected() {
    let mut map = chain();
    assert!(map.rename("  ").is_err());
    map.rename("Renamed").unwrap();
    assert_eq!(map.title(), "Renamed");
}

#[test]
fn given_mutation_when_applied_then_updated_at_advances() {
    let fixed = Arc::new(FixedClock::epoch());
    let _guard = clock::install(fixed.clone());
    let mut map = chain();
    let before = map.updated_at();

    fixed.advance(Duration::milliseconds(5));
    map.remove_edge(&EdgeId::new("e2"));

    assert_eq!(map.updated_at(), before + Duration::milliseconds(5));
}
