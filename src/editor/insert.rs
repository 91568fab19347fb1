use serde_json::Value;
use uuid::Uuid;

use super::{Anchor, EditEvent, Editor, rules};
use crate::compiler::Link;
use crate::definition::{Step, TriggerKind, parse_step};
use crate::error::{EditError, StructuralError};
use crate::graph::{Edge, Graph, Lane, TRIGGER_END_ID, TRIGGER_START_ID, edge_id};

impl Editor {
    /// Inserts the step described by `payload` onto the edge designated by `anchor`.
    ///
    /// Preconditions are checked in order (payload schema, anchor, placement
    /// rules, trigger uniqueness) before anything is touched. On success the
    /// new step sits between the anchor edge's source and target, and its id
    /// is returned. Steps get fresh ids; triggers are identified by their kind.
    pub fn insert_between(&mut self, anchor: &Anchor, payload: &Value) -> Result<String, EditError> {
        let mut step = parse_step(payload)?;

        let current = &self.document.graph;
        let edge = rules::resolve_anchor(current, anchor)?.clone();
        rules::check_placement(current, &edge, &step, &self.config)?;
        if let Some(kind) = step.trigger_kind() {
            if current.contains_node(kind.as_str()) {
                return Err(StructuralError::DuplicateTrigger(kind.to_string()).into());
            }
        }

        let was_sound = current.check_invariants().is_ok();
        let lane_was_sound = current.check_trigger_lane().is_ok();
        let mut graph = current.clone();
        let node_id = match step.trigger_kind() {
            Some(kind) => self.splice_trigger(&mut graph, &step, kind),
            None => {
                step.visit_mut(&mut |s: &mut Step| s.id = Uuid::new_v4().to_string());
                self.splice_step(&mut graph, &edge, &step)?
            }
        };
        graph.order_branch_edges();
        if was_sound {
            graph.check_invariants()?;
        } else if lane_was_sound {
            graph.check_trigger_lane()?;
        }

        let properties = self.document.definition.properties.clone();
        self.commit(
            graph,
            properties,
            EditEvent::Inserted {
                node_id: node_id.clone(),
            },
        );
        Ok(node_id)
    }

    /// Replaces `edge` with the compiled fragment of `step`, nodes going in
    /// just before the edge's target.
    fn splice_step(&self, graph: &mut Graph, edge: &Edge, step: &Step) -> Result<String, StructuralError> {
        let scope = rules::scope_for_edge(graph, edge);
        let fragment = self.compiler.compile_fragment(
            step,
            Link::from_edge(edge),
            &edge.target,
            scope.as_ref(),
        );

        let edge_at = graph
            .edge_index(&edge.id)
            .ok_or_else(|| StructuralError::AnchorNotFound(format!("edge '{}'", edge.id)))?;
        graph.edges.splice(edge_at..=edge_at, fragment.edges);

        let node_at = graph.node_index(&edge.target).unwrap_or(graph.nodes.len());
        graph.nodes.splice(node_at..node_at, fragment.nodes);

        Ok(step.id.clone())
    }

    /// Adds a trigger to the trigger lane, keeping triggers in canonical kind
    /// order. The empty-lane edge is consumed if present; otherwise the trigger
    /// runs in parallel with the existing ones.
    fn splice_trigger(&self, graph: &mut Graph, step: &Step, kind: TriggerKind) -> String {
        let fragment = self.compiler.compile_fragment(
            step,
            Link::new(TRIGGER_START_ID, Lane::Trigger),
            TRIGGER_END_ID,
            None,
        );

        let later_kind = TriggerKind::ALL
            .into_iter()
            .skip_while(|k| *k != kind)
            .skip(1)
            .find(|k| graph.contains_node(k.as_str()));

        let empty_lane = edge_id(TRIGGER_START_ID, TRIGGER_END_ID, None);
        match graph.edge_index(&empty_lane) {
            Some(at) => {
                graph.edges.splice(at..=at, fragment.edges);
            }
            None => {
                let at = later_kind
                    .and_then(|k| graph.edge_index(&edge_id(TRIGGER_START_ID, k.as_str(), None)))
                    .or_else(|| {
                        graph
                            .edges
                            .iter()
                            .rposition(|e| e.target == TRIGGER_END_ID)
                            .map(|i| i + 1)
                    })
                    .unwrap_or(graph.edges.len());
                graph.edges.splice(at..at, fragment.edges);
            }
        }

        let node_at = later_kind
            .and_then(|k| graph.node_index(k.as_str()))
            .or_else(|| graph.node_index(TRIGGER_END_ID))
            .unwrap_or(graph.nodes.len());
        graph.nodes.splice(node_at..node_at, fragment.nodes);

        step.id.clone()
    }
}
