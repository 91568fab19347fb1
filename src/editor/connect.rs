use super::{EditEvent, Editor};
use crate::definition::{Branch, ComponentType};
use crate::graph::{Edge, Lane, NodeKind, is_trigger_lane_target};

impl Editor {
    /// Draws an edge from `source_id` to `target_id`.
    ///
    /// Outgoing edges are capped per node: two for a switch (the new edge takes
    /// whichever branch label is still free), none for `end` and one for
    /// everything else, `trigger_start` included. An edge may not cross between
    /// the trigger lane and the main lane. Requests that break either rule,
    /// loop on a node, duplicate an edge or name an unknown node are ignored
    /// and return `false`. Connecting does not check the remaining graph
    /// invariants: it is how a user rewires a graph mid-edit.
    pub fn connect(&mut self, source_id: &str, target_id: &str) -> bool {
        let current = &self.document.graph;
        let (Some(source), Some(target)) = (current.node(source_id), current.node(target_id)) else {
            tracing::warn!(source_id, target_id, "connect: unknown node");
            return false;
        };
        if source_id == target_id {
            tracing::warn!(source_id, "connect: a node cannot connect to itself");
            return false;
        }

        let lane = current.lane_for_source(source_id);
        let lane_ok = match lane {
            Lane::Trigger => match source.kind {
                NodeKind::Start => matches!(target.kind, NodeKind::TriggerStart),
                _ => is_trigger_lane_target(target),
            },
            Lane::Main => {
                !is_trigger_lane_target(target)
                    && !matches!(target.kind, NodeKind::Start | NodeKind::TriggerStart)
            }
        };
        if !lane_ok {
            tracing::warn!(source_id, target_id, "connect: edge would cross lanes");
            return false;
        }

        let outgoing = current.outgoing(source_id);
        let cap = match (&source.kind, source.component_type()) {
            (NodeKind::End, _) => 0,
            (_, ComponentType::Switch) => Branch::ORDERED.len(),
            _ => 1,
        };
        if outgoing.len() >= cap {
            tracing::warn!(source_id, cap, "connect: outgoing edge limit reached");
            return false;
        }

        let edge = if source.component_type() == ComponentType::Switch {
            let free = Branch::ORDERED
                .into_iter()
                .find(|b| outgoing.iter().all(|e| e.label != Some(*b)));
            match free {
                Some(branch) => Edge::branch(source_id, target_id, branch),
                None => {
                    tracing::warn!(source_id, "connect: both branches are taken");
                    return false;
                }
            }
        } else {
            Edge::new(source_id, target_id, lane)
        };
        if current.contains_edge(&edge.id) {
            tracing::warn!(edge_id = %edge.id, "connect: edge already exists");
            return false;
        }

        let mut graph = current.clone();
        let edge_id = edge.id.clone();
        graph.edges.push(edge);
        graph.order_branch_edges();
        for id in [source_id, target_id] {
            if let Some(node) = graph.node_mut(id) {
                node.draggable = false;
            }
        }

        let properties = self.document.definition.properties.clone();
        self.commit(graph, properties, EditEvent::Connected { edge_id });
        true
    }
}
