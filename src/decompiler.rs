//! Graph to definition decompilation.
//!
//! Decompilation never fails. Graphs caught in the middle of an edit may have
//! dangling nodes, switches missing a branch or edges into nowhere; each such
//! gap becomes an explicit `empty` placeholder step so the definition always
//! reflects what is on the canvas.

use ahash::AHashSet;

use crate::definition::{Branch, Component, Definition, Properties, Step};
use crate::graph::{Graph, NodeKind, Scope, TRIGGER_END_ID, placeholder_id};

/// Where the walk of a region stopped.
enum Exit<'a> {
    /// At the first node outside the region.
    At(&'a str),
    /// The path ended inside the region; a placeholder already marks the gap.
    Dangling,
}

/// How the walk continues after a step.
enum Next<'a> {
    Node(&'a str),
    /// The step has no successor.
    Missing,
    /// The gap was already recorded by a nested region.
    Recorded,
}

struct Walker<'a> {
    graph: &'a Graph,
    visited: AHashSet<&'a str>,
}

impl<'a> Walker<'a> {
    fn first_successor(&self, id: &str) -> Option<&'a str> {
        self.graph
            .edges
            .iter()
            .find(|e| e.source == id)
            .map(|e| e.target.as_str())
    }

    fn branch_successor(&self, id: &str, branch: Branch) -> Option<&'a str> {
        self.graph
            .edges
            .iter()
            .find(|e| e.source == id && e.label == Some(branch))
            .map(|e| e.target.as_str())
    }

    /// Collects the steps of region `scope`, starting at `entry`, which was
    /// reached from node `from`.
    fn collect(
        &mut self,
        entry: Option<&'a str>,
        from: &'a str,
        scope: Option<&Scope>,
    ) -> (Vec<Step>, Exit<'a>) {
        let graph = self.graph;
        let mut steps = Vec::new();
        let mut previous = from;
        let mut current = entry;

        loop {
            let node = match current.and_then(|id| graph.node(id)) {
                Some(node) => node,
                None => {
                    steps.push(Step::empty(&placeholder_id(previous)));
                    return (steps, Exit::Dangling);
                }
            };
            let id = node.id.as_str();
            if node.scope.as_ref() != scope {
                return (steps, Exit::At(id));
            }
            let NodeKind::Step { step } = &node.kind else {
                return (steps, Exit::At(id));
            };
            if !self.visited.insert(id) {
                steps.push(Step::empty(&placeholder_id(previous)));
                return (steps, Exit::Dangling);
            }

            let mut step = step.clone();
            previous = id;
            let next = match &mut step.component {
                Component::Switch { branches, .. } => {
                    let mut exit = None;
                    for branch in Branch::ORDERED {
                        let collected = match self.branch_successor(id, branch) {
                            Some(target) => {
                                let inner = Scope::branch(id, branch);
                                let (collected, branch_exit) =
                                    self.collect(Some(target), id, Some(&inner));
                                if let (None, Exit::At(target)) = (exit, branch_exit) {
                                    exit = Some(target);
                                }
                                collected
                            }
                            None => vec![Step::empty(&format!("{}__empty_{}", id, branch))],
                        };
                        *branches.get_mut(branch) = collected;
                    }
                    exit.map_or(Next::Recorded, Next::Node)
                }
                Component::Container { sequence, .. } => {
                    let inner = Scope::body(id);
                    let (body, body_exit) =
                        self.collect(self.first_successor(id), id, Some(&inner));
                    *sequence = body;
                    match (graph.boundary_of(id), body_exit) {
                        (Some(boundary), _) => {
                            previous = boundary.id.as_str();
                            self.first_successor(previous).map_or(Next::Missing, Next::Node)
                        }
                        (None, Exit::At(target)) => Next::Node(target),
                        (None, Exit::Dangling) => Next::Recorded,
                    }
                }
                Component::Empty => self.first_successor(id).map_or(Next::Recorded, Next::Node),
                _ => self.first_successor(id).map_or(Next::Missing, Next::Node),
            };
            steps.push(step);

            match next {
                Next::Node(target) => current = Some(target),
                Next::Missing => current = None,
                Next::Recorded => return (steps, Exit::Dangling),
            }
        }
    }
}

/// Rebuilds the definition a graph represents.
///
/// Trigger configuration is taken from the trigger nodes; every other
/// workflow property is carried over from `current`.
pub fn decompile(graph: &Graph, current: &Properties) -> Definition {
    let mut properties = current.clone();
    properties.triggers = graph.trigger_configs().into_iter().collect();

    let mut walker = Walker {
        graph,
        visited: AHashSet::new(),
    };
    let entry = walker.first_successor(TRIGGER_END_ID);
    let (sequence, _) = walker.collect(entry, TRIGGER_END_ID, None);

    tracing::debug!(steps = sequence.len(), "decompiled graph");
    Definition::new(properties, sequence)
}
