use crate::definition::{Branch, Component, Step};
use crate::graph::{Edge, EdgeStyle, Lane, Node, NodeKind, Position, Scope, boundary_id, edge_id};

/// The loose end of a path under construction: everything needed to emit the
/// edge once the next node is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: String,
    pub label: Option<Branch>,
    pub style: Option<EdgeStyle>,
    pub lane: Lane,
}

impl Link {
    pub fn new(source: &str, lane: Lane) -> Self {
        Self {
            source: source.to_string(),
            label: None,
            style: None,
            lane,
        }
    }

    /// The labeled output of a switch.
    pub fn branch(source: &str, branch: Branch) -> Self {
        Self {
            source: source.to_string(),
            label: Some(branch),
            style: Some(EdgeStyle::for_branch(branch)),
            lane: Lane::Main,
        }
    }

    /// Continues an existing edge: same source, label, style and lane.
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            label: edge.label,
            style: edge.style.clone(),
            lane: edge.lane,
        }
    }

    pub fn to(&self, target: &str) -> Edge {
        Edge {
            id: edge_id(&self.source, target, self.label),
            source: self.source.clone(),
            target: target.to_string(),
            label: self.label,
            style: self.style.clone(),
            lane: self.lane,
            animated: false,
        }
    }
}

/// Accumulates nodes and edges while a step tree is expanded into graph form.
pub(super) struct GraphBuilder {
    origin: Position,
    pub(super) nodes: Vec<Node>,
    pub(super) edges: Vec<Edge>,
}

impl GraphBuilder {
    pub(super) fn new(origin: Position) -> Self {
        Self {
            origin,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub(super) fn push_node(&mut self, id: &str, kind: NodeKind, scope: Option<&Scope>) {
        self.nodes
            .push(Node::new(id, kind, self.origin).with_scope(scope.cloned()));
    }

    /// Closes every open link onto `target`.
    pub(super) fn connect(&mut self, links: Vec<Link>, target: &str) {
        self.edges.extend(links.iter().map(|link| link.to(target)));
    }

    pub(super) fn expand_sequence(
        &mut self,
        steps: &[Step],
        open: Vec<Link>,
        scope: Option<&Scope>,
    ) -> Vec<Link> {
        steps
            .iter()
            .fold(open, |open, step| self.expand_step(step, open, scope))
    }

    /// Emits `step` (and everything nested in it) after `open`, returning the
    /// links the following node must be wired from.
    pub(super) fn expand_step(
        &mut self,
        step: &Step,
        open: Vec<Link>,
        scope: Option<&Scope>,
    ) -> Vec<Link> {
        self.push_node(&step.id, NodeKind::Step { step: step.shallow() }, scope);
        self.connect(open, &step.id);

        match &step.component {
            Component::Switch { branches, .. } => {
                let mut exits = Vec::new();
                for branch in Branch::ORDERED {
                    let inner = Scope::branch(&step.id, branch);
                    exits.extend(self.expand_sequence(
                        branches.get(branch),
                        vec![Link::branch(&step.id, branch)],
                        Some(&inner),
                    ));
                }
                exits
            }
            Component::Container { sequence, .. } => {
                let inner = Scope::body(&step.id);
                let body_exits = self.expand_sequence(
                    sequence,
                    vec![Link::new(&step.id, Lane::Main)],
                    Some(&inner),
                );
                let boundary = boundary_id(&step.step_type, &step.id);
                self.push_node(
                    &boundary,
                    NodeKind::ContainerEnd {
                        owner: step.id.clone(),
                    },
                    scope,
                );
                self.connect(body_exits, &boundary);
                vec![Link::new(&boundary, Lane::Main)]
            }
            Component::Trigger { .. } => vec![Link::new(&step.id, Lane::Trigger)],
            _ => vec![Link::new(&step.id, Lane::Main)],
        }
    }
}
