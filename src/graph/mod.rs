//! The editable node/edge projection of a workflow definition.

pub mod edge;
pub mod node;

pub use edge::*;
pub use node::*;

use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::definition::{Branch, Component, ComponentType, TriggerConfig, TriggerKind};
use crate::error::StructuralError;

pub const START_ID: &str = "start";
pub const END_ID: &str = "end";
pub const TRIGGER_START_ID: &str = "trigger_start";
pub const TRIGGER_END_ID: &str = "trigger_end";

/// Sentinel ids that can never be deleted or reparented.
pub const PROTECTED_IDS: [&str; 4] = [START_ID, END_ID, TRIGGER_START_ID, TRIGGER_END_ID];

/// Marker contained in the id of every placeholder node.
pub const EMPTY_MARKER: &str = "__empty";

pub fn is_protected(id: &str) -> bool {
    PROTECTED_IDS.contains(&id)
}

/// Id of the end-boundary node closing container `owner_id`.
pub fn boundary_id(step_type: &str, owner_id: &str) -> String {
    format!("{}__end__{}", step_type, owner_id)
}

/// Id of the placeholder standing in for whatever should follow `anchor_id`.
pub fn placeholder_id(anchor_id: &str) -> String {
    format!("{}{}", anchor_id, EMPTY_MARKER)
}

/// True for the nodes an edge leaving `trigger_start` may lead to.
pub fn is_trigger_lane_target(node: &Node) -> bool {
    matches!(node.kind, NodeKind::TriggerEnd) || node.component_type() == ComponentType::Trigger
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_index(&self, id: &str) -> Option<usize> {
        self.edges.iter().position(|e| e.id == id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge(id).is_some()
    }

    /// Outgoing edges of `id`, in edge order.
    pub fn outgoing(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == id).collect()
    }

    /// Incoming edges of `id`, in edge order.
    pub fn incoming(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == id).collect()
    }

    /// Trigger configurations carried by the trigger nodes, in node order.
    pub fn trigger_configs(&self) -> Vec<TriggerConfig> {
        self.nodes
            .iter()
            .filter_map(|n| match &n.step()?.component {
                Component::Trigger { properties } => Some(properties.clone()),
                _ => None,
            })
            .collect()
    }

    /// Lane an edge leaving `source_id` belongs to.
    pub fn lane_for_source(&self, source_id: &str) -> Lane {
        if source_id == START_ID || source_id == TRIGGER_START_ID {
            return Lane::Trigger;
        }
        match self.node(source_id) {
            Some(node) if node.component_type() == ComponentType::Trigger => Lane::Trigger,
            _ => Lane::Main,
        }
    }

    /// Enclosing scopes of a node with scope `scope`, innermost first.
    pub fn scope_chain<'a>(&'a self, scope: Option<&'a Scope>) -> Vec<&'a Scope> {
        let mut chain = Vec::new();
        let mut current = scope;
        while let Some(scope) = current {
            // A malformed graph could nest a region inside itself.
            if chain.len() > self.nodes.len() {
                break;
            }
            chain.push(scope);
            current = self.node(&scope.owner).and_then(|owner| owner.scope.as_ref());
        }
        chain
    }

    /// Number of switch branches enclosing a node with scope `scope`.
    pub fn switch_depth(&self, scope: Option<&Scope>) -> usize {
        self.scope_chain(scope)
            .iter()
            .filter(|s| matches!(s.slot, Slot::Branch(_)))
            .count()
    }

    /// Number of container bodies enclosing a node with scope `scope`.
    pub fn container_depth(&self, scope: Option<&Scope>) -> usize {
        self.scope_chain(scope)
            .iter()
            .filter(|s| s.slot == Slot::Body)
            .count()
    }

    /// True if `node` sits somewhere inside the region opened by `ancestor_id`.
    pub fn is_within(&self, node: &Node, ancestor_id: &str) -> bool {
        self.scope_chain(node.scope.as_ref())
            .iter()
            .any(|s| s.owner == ancestor_id)
    }

    /// End-boundary node owned by container `container_id`.
    pub fn boundary_of(&self, container_id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.boundary_owner() == Some(container_id))
    }

    /// Ids of `id` and everything it encloses (nested nodes and its own boundary), in node order.
    pub fn region(&self, id: &str) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.id == id || n.boundary_owner() == Some(id) || self.is_within(n, id))
            .map(|n| n.id.clone())
            .collect()
    }

    /// Moves every switch's `false` edge in front of its `true` edge.
    pub fn order_branch_edges(&mut self) {
        let switches: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.component_type() == ComponentType::Switch)
            .map(|n| n.id.clone())
            .collect();

        for switch_id in switches {
            let position_of = |branch: Branch| {
                self.edges
                    .iter()
                    .position(|e| e.source == switch_id && e.label == Some(branch))
            };
            if let (Some(false_idx), Some(true_idx)) =
                (position_of(Branch::False), position_of(Branch::True))
            {
                if true_idx < false_idx {
                    self.edges.swap(true_idx, false_idx);
                }
            }
        }
    }

    /// Checks that triggers and the main lane never mix: every trigger sits
    /// alone between `trigger_start` and `trigger_end`, and `trigger_start`
    /// only leads to triggers or straight to `trigger_end`.
    pub fn check_trigger_lane(&self) -> Result<(), StructuralError> {
        for node in &self.nodes {
            if node.component_type() != ComponentType::Trigger {
                continue;
            }
            let ins = self.incoming(&node.id);
            let out = self.outgoing(&node.id);
            let lane_ok = matches!(ins.as_slice(), [only] if only.source == TRIGGER_START_ID)
                && matches!(out.as_slice(), [only] if only.target == TRIGGER_END_ID);
            if !lane_ok {
                return Err(StructuralError::InvariantViolation(format!(
                    "trigger '{}' must sit between 'trigger_start' and 'trigger_end'",
                    node.id
                )));
            }
        }

        for edge in self.outgoing(TRIGGER_START_ID) {
            if !self.node(&edge.target).is_some_and(is_trigger_lane_target) {
                return Err(StructuralError::InvariantViolation(format!(
                    "edge '{}' leaves the trigger lane",
                    edge.id
                )));
            }
        }
        Ok(())
    }

    /// Checks the structural invariants every settled graph must satisfy.
    pub fn check_invariants(&self) -> Result<(), StructuralError> {
        let violation = |message: String| Err(StructuralError::InvariantViolation(message));

        if let Some(dup) = self.nodes.iter().map(|n| n.id.as_str()).duplicates().next() {
            return violation(format!("duplicate node id '{}'", dup));
        }
        if let Some(dup) = self.edges.iter().map(|e| e.id.as_str()).duplicates().next() {
            return violation(format!("duplicate edge id '{}'", dup));
        }

        let sentinels: [(&str, fn(&NodeKind) -> bool); 4] = [
            (START_ID, |k| matches!(k, NodeKind::Start)),
            (END_ID, |k| matches!(k, NodeKind::End)),
            (TRIGGER_START_ID, |k| matches!(k, NodeKind::TriggerStart)),
            (TRIGGER_END_ID, |k| matches!(k, NodeKind::TriggerEnd)),
        ];
        for (id, is_kind) in sentinels {
            let count = self.nodes.iter().filter(|n| is_kind(&n.kind)).count();
            let in_place = self.node(id).is_some_and(|n| is_kind(&n.kind));
            if count != 1 || !in_place {
                return violation(format!("expected exactly one '{}' node", id));
            }
        }

        let index: AHashMap<&str, &Node> = self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut outgoing: AHashMap<&str, Vec<(usize, &Edge)>> = AHashMap::new();
        for (i, edge) in self.edges.iter().enumerate() {
            if !index.contains_key(edge.source.as_str()) || !index.contains_key(edge.target.as_str()) {
                return violation(format!("edge '{}' references a missing node", edge.id));
            }
            outgoing.entry(edge.source.as_str()).or_default().push((i, edge));
        }

        for node in &self.nodes {
            let out = outgoing.get(node.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            match (&node.kind, node.component_type()) {
                (NodeKind::End, _) => {
                    if !out.is_empty() {
                        return violation("'end' cannot have outgoing edges".to_string());
                    }
                }
                (NodeKind::TriggerStart, _) => {
                    if out.is_empty() {
                        return violation("'trigger_start' has no outgoing edge".to_string());
                    }
                }
                (_, ComponentType::Switch) => {
                    let false_idx = out.iter().find(|(_, e)| e.label == Some(Branch::False));
                    let true_idx = out.iter().find(|(_, e)| e.label == Some(Branch::True));
                    match (out.len(), false_idx, true_idx) {
                        (2, Some((f, _)), Some((t, _))) if f < t => {}
                        _ => {
                            return violation(format!(
                                "switch '{}' must have a 'false' then a 'true' outgoing edge",
                                node.id
                            ));
                        }
                    }
                }
                _ => {
                    if out.len() != 1 {
                        return violation(format!(
                            "node '{}' must have exactly one outgoing edge, found {}",
                            node.id,
                            out.len()
                        ));
                    }
                }
            }

            if let Some(scope) = &node.scope {
                let owner_ok = index.get(scope.owner.as_str()).is_some_and(|owner| {
                    matches!(
                        (scope.slot, owner.component_type()),
                        (Slot::Branch(_), ComponentType::Switch)
                            | (Slot::Body, ComponentType::Container)
                    )
                });
                if !owner_ok {
                    return violation(format!(
                        "node '{}' is scoped to '{}', which does not open such a region",
                        node.id, scope.owner
                    ));
                }
            }

            if node.component_type() == ComponentType::Container {
                let boundaries = self
                    .nodes
                    .iter()
                    .filter(|n| n.boundary_owner() == Some(node.id.as_str()))
                    .count();
                if boundaries != 1 {
                    return violation(format!(
                        "container '{}' must be closed by exactly one boundary",
                        node.id
                    ));
                }
            }

            if let Some(step) = node.step() {
                let reserved = TriggerKind::ALL
                    .into_iter()
                    .find(|kind| kind.as_str() == node.id)
                    .is_some_and(|kind| step.trigger_kind() != Some(kind));
                if reserved {
                    return violation(format!(
                        "id '{}' is reserved for the trigger of that kind",
                        node.id
                    ));
                }
            }

            if let Some(owner) = node.boundary_owner() {
                let owner_ok = index
                    .get(owner)
                    .is_some_and(|o| o.component_type() == ComponentType::Container);
                if !owner_ok {
                    return violation(format!(
                        "boundary '{}' is owned by '{}', which is not a container",
                        node.id, owner
                    ));
                }
            }
        }

        if let Some(kind) = self
            .nodes
            .iter()
            .filter_map(|n| n.step()?.trigger_kind())
            .duplicates()
            .next()
        {
            return violation(format!("more than one '{}' trigger", kind));
        }

        self.check_trigger_lane()?;

        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([START_ID]);
        visited.insert(START_ID);
        while let Some(current) = queue.pop_front() {
            for (_, edge) in outgoing.get(current).map(Vec::as_slice).unwrap_or(&[]) {
                if visited.insert(edge.target.as_str()) {
                    queue.push_back(edge.target.as_str());
                }
            }
        }
        if !visited.contains(END_ID) {
            return violation("'end' is not reachable from 'start'".to_string());
        }

        Ok(())
    }
}
