use ahash::AHashSet;
use itertools::Itertools;

use super::{EditEvent, Editor};
use crate::compiler::Link;
use crate::definition::Step;
use crate::error::{EditError, StructuralError};
use crate::graph::{Edge, Node, is_protected, placeholder_id};

impl Editor {
    /// Removes `node_id` together with everything it encloses.
    ///
    /// Switches take both branches with them and containers their body and
    /// end-boundary. Each predecessor left without an outgoing edge in its
    /// slot is reconnected to every successor of the removed range, keeping
    /// its label and style. Returns the removed ids in graph order.
    pub fn delete_nodes(&mut self, node_id: &str) -> Result<Vec<String>, EditError> {
        if is_protected(node_id) {
            return Err(StructuralError::ProtectedNode(node_id.to_string()).into());
        }
        let current = &self.document.graph;
        let node = current
            .node(node_id)
            .ok_or_else(|| StructuralError::NodeNotFound(node_id.to_string()))?;
        if let Some(owner) = node.boundary_owner() {
            return Err(StructuralError::BoundaryNode {
                node_id: node_id.to_string(),
                owner_id: owner.to_string(),
            }
            .into());
        }
        let entry_position = node.position;
        let entry_scope = node.scope.clone();
        let was_sound = current.check_invariants().is_ok();

        let removed = current.region(node_id);
        let in_range: AHashSet<&str> = removed.iter().map(String::as_str).collect();
        let touches = |e: &Edge| {
            in_range.contains(e.source.as_str()) || in_range.contains(e.target.as_str())
        };

        let predecessors: Vec<Edge> = current
            .edges
            .iter()
            .filter(|e| in_range.contains(e.target.as_str()) && !in_range.contains(e.source.as_str()))
            .cloned()
            .collect();
        let successors: Vec<String> = current
            .edges
            .iter()
            .filter(|e| in_range.contains(e.source.as_str()) && !in_range.contains(e.target.as_str()))
            .map(|e| e.target.clone())
            .unique()
            .collect();
        let edge_at = current.edges.iter().position(|e| touches(e));
        let node_at = current
            .nodes
            .iter()
            .position(|n| in_range.contains(n.id.as_str()));

        let mut graph = current.clone();
        graph.edges.retain(|e| !touches(e));
        graph.nodes.retain(|n| !in_range.contains(n.id.as_str()));

        let mut reconnected: Vec<Edge> = Vec::new();
        if successors.is_empty() {
            let placeholder = Node::from_step(Step::empty(&placeholder_id(node_id)), entry_position)
                .with_scope(entry_scope);
            reconnected.extend(predecessors.iter().map(|e| Link::from_edge(e).to(&placeholder.id)));
            let at = node_at.unwrap_or(graph.nodes.len()).min(graph.nodes.len());
            graph.nodes.insert(at, placeholder);
        } else {
            for edge in &predecessors {
                let slot_filled = graph
                    .edges
                    .iter()
                    .any(|e| e.source == edge.source && e.label == edge.label);
                if slot_filled {
                    continue;
                }
                reconnected.extend(successors.iter().map(|target| Link::from_edge(edge).to(target)));
            }
        }

        let existing: AHashSet<String> = graph.edges.iter().map(|e| e.id.clone()).collect();
        let reconnected: Vec<Edge> = reconnected
            .into_iter()
            .filter(|e| !existing.contains(&e.id))
            .unique_by(|e| e.id.clone())
            .collect();
        let at = edge_at.unwrap_or(graph.edges.len()).min(graph.edges.len());
        graph.edges.splice(at..at, reconnected);
        graph.order_branch_edges();

        if was_sound {
            graph.check_invariants()?;
        }

        let properties = self.document.definition.properties.clone();
        self.commit(
            graph,
            properties,
            EditEvent::Deleted {
                node_ids: removed.clone(),
            },
        );
        Ok(removed)
    }
}
