//! Tests for the layout adapter.
mod common;
use common::*;
use ahash::AHashMap;
use flowsmith::prelude::*;
use pretty_assertions::assert_eq;

fn compiled(definition: &Definition) -> Graph {
    compile(&definition.sequence, &definition.properties, Position::default())
}

fn position_of(graph: &Graph, id: &str) -> Position {
    graph.node(id).expect("node exists").position
}

#[test]
fn test_layout_keeps_identity() {
    let graph = compiled(&switch_definition());
    let laid_out = layout(&graph, Direction::TopBottom, &LayeredLayout::default());

    assert_eq!(node_ids(&laid_out), node_ids(&graph));
    assert_eq!(edge_ids(&laid_out), edge_ids(&graph));
    assert!(laid_out.nodes.iter().all(|n| n.layouted));
    laid_out.check_invariants().expect("layout keeps the graph sound");
}

#[test]
fn test_layout_is_deterministic() {
    let graph = compiled(&foreach_definition());
    let engine = LayeredLayout::default();

    let first = layout(&graph, Direction::TopBottom, &engine);
    let second = layout(&first, Direction::TopBottom, &engine);
    assert_eq!(first, second);
}

#[test]
fn test_top_bottom_ranks_grow_downwards() {
    let graph = layout(
        &compiled(&linear_definition()),
        Direction::TopBottom,
        &LayeredLayout::default(),
    );

    let a = position_of(&graph, "a");
    let b = position_of(&graph, "b");
    assert!(b.y > a.y);
    assert_eq!(a.x, b.x);
    assert_eq!(position_of(&graph, START_ID).y, 0.0);
}

#[test]
fn test_left_right_ranks_grow_rightwards() {
    let graph = layout(
        &compiled(&linear_definition()),
        Direction::LeftRight,
        &LayeredLayout::default(),
    );

    let a = position_of(&graph, "a");
    let b = position_of(&graph, "b");
    assert!(b.x > a.x);
    assert_eq!(a.y, b.y);
}

#[test]
fn test_branches_share_a_rank() {
    let graph = layout(
        &compiled(&switch_definition()),
        Direction::TopBottom,
        &LayeredLayout::default(),
    );

    let x = position_of(&graph, "x");
    let y = position_of(&graph, "y");
    assert_eq!(x.y, y.y);
    assert!(x.x < y.x);
    // z waits for both branches.
    assert!(position_of(&graph, "z").y > x.y);
}

#[test]
fn test_no_animation_without_placeholder_nodes() {
    let definition = linear_definition();
    let mut editor = Editor::builder(definition).build();
    editor.delete_nodes("b").expect("Failed to delete b");
    editor.delete_nodes("a").expect("Failed to delete a");
    editor.layout();

    let animated: Vec<&str> = editor
        .graph()
        .edges
        .iter()
        .filter(|e| e.animated)
        .map(|e| e.id.as_str())
        .collect();
    assert!(animated.is_empty(), "no placeholders expected: {:?}", animated);

    let mut graph = compiled(&linear_definition());
    graph.edges.retain(|e| e.id != "ea-b");
    let editor = {
        let mut editor = Editor::builder_from_graph(graph, Properties::new("gap")).build();
        editor.layout();
        editor
    };
    assert_eq!(editor.definition().sequence.last(), Some(&Step::empty("a__empty")));
    assert!(editor.graph().edges.iter().all(|e| !e.animated));
}

#[test]
fn test_deleting_loop_tail_creates_animated_placeholder() {
    let mut graph = compiled(&foreach_definition());
    // Drop everything after the loop so deleting it leaves nothing to reconnect to.
    graph.nodes.retain(|n| n.id != "z");
    graph.edges.retain(|e| e.source != "z" && e.target != "z");
    let mut editor = Editor::builder_from_graph(graph, manual_properties("tail")).build();

    editor.delete_nodes("loop").expect("Failed to delete loop");
    assert!(editor.graph().contains_node("loop__empty"));
    editor.layout();

    let edge = editor.graph().edge("ea-loop__empty").expect("edge into placeholder");
    assert!(edge.animated);
    assert!(editor.graph().edges.iter().filter(|e| e.animated).count() == 1);
}

struct Fixed;

impl LayoutEngine for Fixed {
    fn positions(&self, graph: &Graph, _direction: Direction) -> AHashMap<String, Position> {
        graph
            .nodes
            .iter()
            .filter(|n| n.id != END_ID)
            .map(|n| (n.id.clone(), Position::new(1.0, 2.0)))
            .collect()
    }
}

#[test]
fn test_custom_engine_and_missing_positions() {
    let origin = Position::new(-5.0, -5.0);
    let config = EditorConfig {
        origin,
        ..Default::default()
    };
    let mut editor = Editor::builder(linear_definition())
        .with_config(config)
        .with_layout_engine(Box::new(Fixed))
        .build();
    editor.layout();

    assert_eq!(position_of(editor.graph(), "a"), Position::new(1.0, 2.0));
    assert_eq!(position_of(editor.graph(), END_ID), origin);
    assert!(editor.graph().node(END_ID).expect("end exists").layouted);
}
