//! Placement legality, checked before any mutation takes place.

use super::Anchor;
use crate::config::EditorConfig;
use crate::definition::{ComponentType, Step};
use crate::error::{PlacementRule, StructuralError};
use crate::graph::{Edge, Graph, Lane, Scope, TRIGGER_START_ID};

/// The edge an anchor designates. A node anchor stands for the node's single
/// incoming edge.
pub(super) fn resolve_anchor<'g>(
    graph: &'g Graph,
    anchor: &Anchor,
) -> Result<&'g Edge, StructuralError> {
    match anchor {
        Anchor::Edge(id) => graph
            .edge(id)
            .ok_or_else(|| StructuralError::AnchorNotFound(format!("edge '{}'", id))),
        Anchor::Node(id) => match graph.incoming(id).as_slice() {
            [edge] => Ok(*edge),
            [] => Err(StructuralError::AnchorNotFound(format!(
                "node '{}' has no incoming edge",
                id
            ))),
            _ => Err(StructuralError::AnchorNotFound(format!(
                "node '{}' has more than one incoming edge",
                id
            ))),
        },
    }
}

/// Scope a node spliced onto `edge` ends up in.
pub(super) fn scope_for_edge(graph: &Graph, edge: &Edge) -> Option<Scope> {
    let source = graph.node(&edge.source)?;
    match (source.component_type(), edge.label) {
        (ComponentType::Switch, Some(branch)) => Some(Scope::branch(&source.id, branch)),
        (ComponentType::Container, _) => Some(Scope::body(&source.id)),
        _ => match source.boundary_owner() {
            Some(owner) => graph.node(owner).and_then(|o| o.scope.clone()),
            None => source.scope.clone(),
        },
    }
}

pub(super) fn check_placement(
    graph: &Graph,
    edge: &Edge,
    step: &Step,
    config: &EditorConfig,
) -> Result<(), StructuralError> {
    let illegal = |rule| Err(StructuralError::IllegalPlacement(rule));

    if step.trigger_kind().is_some() {
        if edge.source != TRIGGER_START_ID {
            return illegal(PlacementRule::TriggerOutsideTriggerLane);
        }
        return Ok(());
    }
    if edge.lane == Lane::Trigger || edge.source == TRIGGER_START_ID {
        return illegal(PlacementRule::StepOnTriggerLane);
    }

    let scope = scope_for_edge(graph, edge);
    let switch_depth = graph.switch_depth(scope.as_ref()) + step.switch_depth();
    if switch_depth > config.max_switch_depth {
        return illegal(PlacementRule::SwitchBranchCapacity {
            depth: switch_depth,
            max: config.max_switch_depth,
        });
    }
    let container_depth = graph.container_depth(scope.as_ref()) + step.container_depth();
    if container_depth > config.max_container_depth {
        return illegal(PlacementRule::ContainerNestingCapped {
            depth: container_depth,
            max: config.max_container_depth,
        });
    }
    Ok(())
}
