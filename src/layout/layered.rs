use ahash::AHashMap;
use std::collections::VecDeque;

use super::{Direction, LayoutEngine};
use crate::graph::{Graph, Position};

/// Longest-path layering: every node sits one rank below its deepest
/// predecessor, and each rank is centered on the cross axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredLayout {
    pub node_width: f64,
    pub node_height: f64,
    /// Space between consecutive ranks.
    pub rank_gap: f64,
    /// Space between neighbours within a rank.
    pub node_gap: f64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            node_width: 250.0,
            node_height: 80.0,
            rank_gap: 60.0,
            node_gap: 40.0,
        }
    }
}

impl LayeredLayout {
    /// Rank of every node. Nodes left over by a cycle stay at rank 0.
    fn ranks<'g>(&self, graph: &'g Graph) -> AHashMap<&'g str, usize> {
        let mut in_degree: AHashMap<&'g str, usize> =
            graph.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
        for edge in &graph.edges {
            if in_degree.contains_key(edge.source.as_str()) {
                if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
                    *degree += 1;
                }
            }
        }

        let mut ranks: AHashMap<&'g str, usize> = AHashMap::new();
        let mut queue: VecDeque<&'g str> = graph
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
            .collect();
        for id in &queue {
            ranks.insert(*id, 0);
        }

        while let Some(current) = queue.pop_front() {
            let rank = ranks.get(current).copied().unwrap_or(0);
            for edge in graph.edges.iter().filter(|e| e.source == current) {
                let target = edge.target.as_str();
                let Some(degree) = in_degree.get_mut(target) else {
                    continue;
                };
                let entry = ranks.entry(target).or_insert(0);
                *entry = (*entry).max(rank + 1);
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(target);
                }
            }
        }

        for node in &graph.nodes {
            if in_degree.get(node.id.as_str()).copied().unwrap_or(0) > 0 {
                ranks.insert(node.id.as_str(), 0);
            }
        }
        ranks
    }
}

impl LayoutEngine for LayeredLayout {
    fn positions(&self, graph: &Graph, direction: Direction) -> AHashMap<String, Position> {
        let ranks = self.ranks(graph);

        let mut layers: Vec<Vec<&str>> = Vec::new();
        for node in &graph.nodes {
            let rank = ranks.get(node.id.as_str()).copied().unwrap_or(0);
            if layers.len() <= rank {
                layers.resize_with(rank + 1, Vec::new);
            }
            layers[rank].push(node.id.as_str());
        }

        let (main_step, cross_size) = match direction {
            Direction::TopBottom => (self.node_height + self.rank_gap, self.node_width),
            Direction::LeftRight => (self.node_width + self.rank_gap, self.node_height),
        };
        let cross_step = cross_size + self.node_gap;

        let mut positions = AHashMap::new();
        for (rank, layer) in layers.iter().enumerate() {
            let span = layer.len() as f64 * cross_step - self.node_gap;
            let first = -span / 2.0;
            for (i, id) in layer.iter().enumerate() {
                let main = rank as f64 * main_step;
                let cross = first + i as f64 * cross_step;
                let position = match direction {
                    Direction::TopBottom => Position::new(cross, main),
                    Direction::LeftRight => Position::new(main, cross),
                };
                positions.insert(id.to_string(), position);
            }
        }
        positions
    }
}
