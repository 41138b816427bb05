//! Tests for proximity auto-connect
//!
//! While a node is dragged the closest valid connection within reach is
//! proposed; releasing the node persists it.

use rstest::rstest;

use mindmap::application::surgery::{
    closest_connection, finalize_drag, preview_edge, PREVIEW_EDGE_TYPE, PROXIMITY_THRESHOLD,
};
use mindmap::domain::{
    handle_id, root_handles, DomainError, Edge, EdgeId, HandleId, HandleOrientation, HandleType,
    MindMap, MindMapId, Node, NodeId, Position,
};
use mindmap::util::testing;

fn id(s: &str) -> NodeId {
    NodeId::new(s)
}

fn target(s: &str) -> HandleId {
    handle_id(&id(s), HandleType::Target)
}

fn add_root(map: &mut MindMap, name: &str, at: Position) {
    let mut node = Node::new(id(name), true, name, at, None);
    node.set_handle_config(root_handles(&id(name)));
    map.add_node(node).unwrap();
}

fn add_plain(map: &mut MindMap, name: &str, at: Position) {
    let mut node = Node::new(id(name), false, name, at, None);
    node.set_handle_config(HandleOrientation::RIGHTWARD.handles_for(&id(name)));
    map.add_node(node).unwrap();
}

/// Root at (250, 100) and a loose node `n` far away.
fn scene() -> MindMap {
    let mut map = MindMap::new(MindMapId::new("m"), "Drag");
    add_root(&mut map, "r", Position::new(250.0, 100.0));
    add_plain(&mut map, "n", Position::new(2000.0, 2000.0));
    map
}

#[rstest]
#[case::right_of_root(Position::new(500.0, 100.0), "r-source-right")]
#[case::left_of_root(Position::new(0.0, 100.0), "r-source-left")]
fn given_root_nearby_when_dragging_then_root_handle_facing_node_used(
    #[case] at: Position,
    #[case] expected_handle: &str,
) {
    testing::init_test_setup();
    let map = scene();

    let proposal = closest_connection(&map, &id("n"), at, PROXIMITY_THRESHOLD).unwrap();

    assert_eq!(proposal.source, id("r"));
    assert_eq!(proposal.target, id("n"));
    assert_eq!(proposal.source_handle.as_str(), expected_handle);
    assert_eq!(proposal.target_handle, target("n"));
    assert_eq!(proposal.distance, 250.0);
}

#[rstest]
#[case::at_threshold(400.0, false)]
#[case::inside_threshold(399.0, true)]
fn given_distance_when_dragging_then_threshold_is_exclusive(#[case] dx: f64, #[case] found: bool) {
    let map = scene();
    let at = Position::new(250.0 + dx, 100.0);

    let proposal = closest_connection(&map, &id("n"), at, PROXIMITY_THRESHOLD);

    assert_eq!(proposal.is_some(), found);
}

#[test]
fn given_occupied_target_handle_when_dragging_then_never_proposed() {
    let mut map = scene();
    add_plain(&mut map, "o", Position::new(600.0, 100.0));
    let mut taken = Edge::new(EdgeId::new("e1"), id("r"), id("o"), "default");
    taken.set_handle_ids(Some(HandleId::new("r-source-right")), Some(target("o")));
    map.add_edge(taken).unwrap();

    // nearer to `o` than to the root
    let proposal =
        closest_connection(&map, &id("n"), Position::new(700.0, 100.0), PROXIMITY_THRESHOLD)
            .unwrap();

    assert_ne!(proposal.target_handle, target("o"));
    assert_eq!(proposal.source, id("o"));
    assert_eq!(proposal.target, id("n"));
}

#[test]
fn given_dragged_target_taken_and_no_free_target_in_reach_then_none() {
    let mut map = scene();
    add_plain(&mut map, "far", Position::new(5000.0, 5000.0));
    let mut taken = Edge::new(EdgeId::new("e1"), id("far"), id("n"), "default");
    taken.set_handle_ids(
        Some(handle_id(&id("far"), HandleType::Source)),
        Some(target("n")),
    );
    map.add_edge(taken).unwrap();

    // the root has no target handle and `n` has no free one
    let proposal =
        closest_connection(&map, &id("n"), Position::new(300.0, 100.0), PROXIMITY_THRESHOLD);

    assert!(proposal.is_none());
}

#[test]
fn given_two_nodes_in_reach_when_dragging_then_closest_wins() {
    let mut map = scene();
    add_plain(&mut map, "near", Position::new(900.0, 100.0));

    let proposal =
        closest_connection(&map, &id("n"), Position::new(800.0, 100.0), PROXIMITY_THRESHOLD)
            .unwrap();

    assert_eq!(proposal.distance, 100.0);
    assert!(proposal.source == id("near") || proposal.target == id("near"));
}

#[test]
fn given_equal_distances_when_dragging_then_first_by_id_wins() {
    let mut map = MindMap::new(MindMapId::new("m"), "Tie");
    add_plain(&mut map, "b", Position::new(400.0, 0.0));
    add_plain(&mut map, "c", Position::new(600.0, 0.0));
    add_plain(&mut map, "n", Position::new(0.0, 900.0));

    let proposal =
        closest_connection(&map, &id("n"), Position::new(500.0, 0.0), PROXIMITY_THRESHOLD)
            .unwrap();

    assert_eq!(proposal.source, id("n"));
    assert_eq!(proposal.target, id("b"));
}

#[test]
fn given_proposal_when_previewing_then_temp_edge_not_stored() {
    let map = scene();

    let preview =
        preview_edge(&map, &id("n"), Position::new(500.0, 100.0), PROXIMITY_THRESHOLD).unwrap();

    assert_eq!(preview.id().as_str(), "r-n");
    assert_eq!(preview.edge_type(), PREVIEW_EDGE_TYPE);
    assert_eq!(map.edge_count(), 0);
}

// ============================================================
// finalize_drag()
// ============================================================

#[test]
fn given_node_in_reach_when_released_then_moved_and_connected() {
    let mut map = scene();

    let outcome =
        finalize_drag(&mut map, &id("n"), Position::new(500.0, 100.0), PROXIMITY_THRESHOLD)
            .unwrap();

    let edge_id = outcome.connected.expect("connected");
    let edge = map.get_edge(&edge_id).unwrap();
    assert_eq!(edge.edge_type(), "default");
    assert_eq!(edge.source_handle_id().map(HandleId::as_str), Some("r-source-right"));
    let node = map.get_node(&id("n")).unwrap();
    assert_eq!(node.position(), Position::new(500.0, 100.0));
    assert_eq!(node.parent_id(), Some(&id("r")));
}

#[test]
fn given_nothing_in_reach_when_released_then_only_moved() {
    let mut map = scene();

    let outcome =
        finalize_drag(&mut map, &id("n"), Position::new(3000.0, 0.0), PROXIMITY_THRESHOLD)
            .unwrap();

    assert_eq!(outcome.connected, None);
    assert_eq!(map.edge_count(), 0);
    assert_eq!(
        map.get_node(&id("n")).unwrap().position(),
        Position::new(3000.0, 0.0)
    );
}

#[test]
fn given_unknown_node_when_released_then_not_found() {
    let mut map = scene();
    let err = finalize_drag(&mut map, &id("ghost"), Position::default(), PROXIMITY_THRESHOLD)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}
