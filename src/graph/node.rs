use serde::{Deserialize, Serialize};

use crate::definition::{Branch, ComponentType, Step};

/// 2-D canvas position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The part of a region a nested node lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Branch(Branch),
    Body,
}

/// Typed relation from a nested node to the switch or container enclosing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub owner: String,
    pub slot: Slot,
}

impl Scope {
    pub fn branch(owner: &str, branch: Branch) -> Self {
        Self {
            owner: owner.to_string(),
            slot: Slot::Branch(branch),
        }
    }

    pub fn body(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            slot: Slot::Body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Start,
    End,
    TriggerStart,
    TriggerEnd,
    Step { step: Step },
    /// Closes the body of the container `owner`.
    ContainerEnd { owner: String },
}

/// A graph vertex: one step (or sentinel) plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub draggable: bool,
    pub layouted: bool,
}

impl Node {
    pub fn new(id: &str, kind: NodeKind, position: Position) -> Self {
        let draggable = matches!(kind, NodeKind::Step { .. });
        Self {
            id: id.to_string(),
            kind,
            position,
            scope: None,
            draggable,
            layouted: false,
        }
    }

    pub fn from_step(step: Step, position: Position) -> Self {
        let id = step.id.clone();
        Self::new(&id, NodeKind::Step { step }, position)
    }

    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope;
        self
    }

    pub fn step(&self) -> Option<&Step> {
        match &self.kind {
            NodeKind::Step { step } => Some(step),
            _ => None,
        }
    }

    pub fn step_mut(&mut self) -> Option<&mut Step> {
        match &mut self.kind {
            NodeKind::Step { step } => Some(step),
            _ => None,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match &self.kind {
            NodeKind::Start | NodeKind::TriggerStart => ComponentType::Start,
            NodeKind::End | NodeKind::TriggerEnd | NodeKind::ContainerEnd { .. } => {
                ComponentType::End
            }
            NodeKind::Step { step } => step.component_type(),
        }
    }

    /// True when the node sits inside a switch branch or a container body.
    pub fn is_nested(&self) -> bool {
        self.scope.is_some()
    }

    pub fn is_protected(&self) -> bool {
        super::is_protected(&self.id)
    }

    /// Owner of a container end-boundary node.
    pub fn boundary_owner(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::ContainerEnd { owner } => Some(owner),
            _ => None,
        }
    }

    /// Human label, falling back to the id.
    pub fn label(&self) -> &str {
        match &self.kind {
            NodeKind::Step { step } => step.display_key(),
            _ => &self.id,
        }
    }
}
