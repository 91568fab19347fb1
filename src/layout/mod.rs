//! Positioning of graph nodes.
//!
//! The editor never computes coordinates itself. It hands the graph to a
//! [`LayoutEngine`] and copies the returned positions back, leaving node and
//! edge identity untouched.

mod layered;

pub use layered::LayeredLayout;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{EMPTY_MARKER, Graph, Position};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::TopBottom => write!(f, "TB"),
            Direction::LeftRight => write!(f, "LR"),
        }
    }
}

/// Computes a position for every node of a graph.
///
/// Implementations must be deterministic: the same graph and direction always
/// produce the same positions. Nodes missing from the returned map keep their
/// current position.
pub trait LayoutEngine: Send + Sync {
    fn positions(&self, graph: &Graph, direction: Direction) -> AHashMap<String, Position>;
}

/// Returns a laid-out copy of `graph`.
///
/// Every node is marked `layouted`, and an edge is animated exactly when it
/// leads into a placeholder.
pub fn layout(graph: &Graph, direction: Direction, engine: &dyn LayoutEngine) -> Graph {
    let positions = engine.positions(graph, direction);
    let mut laid_out = graph.clone();

    for node in &mut laid_out.nodes {
        if let Some(position) = positions.get(&node.id) {
            node.position = *position;
        }
        node.layouted = true;
    }
    for edge in &mut laid_out.edges {
        edge.animated = edge.target.contains(EMPTY_MARKER);
    }

    tracing::debug!(nodes = laid_out.nodes.len(), %direction, "laid out graph");
    laid_out
}
