use std::fmt;
use thiserror::Error;

/// Errors raised when a step or trigger payload does not match its schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Failed to parse JSON: {0}")]
    JsonParseError(String),

    #[error("Step payload must be a JSON object")]
    NotAnObject,

    #[error("Step payload is missing required field '{0}'")]
    MissingField(String),

    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    #[error("Component type '{0}' is reserved and cannot be created from a payload")]
    ReservedComponentType(String),

    #[error("Unknown trigger type '{0}'")]
    UnknownTriggerKind(String),

    #[error("Trigger '{0}' cannot be nested inside another step")]
    NestedTrigger(String),

    #[error("Step type '{step_type}' is not valid for a {component} step")]
    InvalidStepType {
        step_type: String,
        component: String,
    },

    #[error("Invalid properties for '{step_type}': {message}")]
    InvalidProperties { step_type: String, message: String },
}

/// The structural rule an insertion would break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementRule {
    /// Triggers may only be attached to edges leaving `trigger_start`.
    TriggerOutsideTriggerLane,
    /// Ordinary steps may not be placed on the trigger lane.
    StepOnTriggerLane,
    /// The switch nesting depth at the anchor would exceed the configured limit.
    SwitchBranchCapacity { depth: usize, max: usize },
    /// The container nesting depth at the anchor would exceed the configured limit.
    ContainerNestingCapped { depth: usize, max: usize },
}

impl fmt::Display for PlacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementRule::TriggerOutsideTriggerLane => {
                write!(f, "triggers can only be added to edges leaving 'trigger_start'")
            }
            PlacementRule::StepOnTriggerLane => {
                write!(f, "steps cannot be added to the trigger lane")
            }
            PlacementRule::SwitchBranchCapacity { depth, max } => write!(
                f,
                "switch nesting depth {} exceeds the maximum of {}",
                depth, max
            ),
            PlacementRule::ContainerNestingCapped { depth, max } => write!(
                f,
                "container nesting depth {} exceeds the maximum of {}",
                depth, max
            ),
        }
    }
}

/// Errors raised when an edit would violate a graph invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("Anchor not found: {0}")]
    AnchorNotFound(String),

    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    #[error("Node '{0}' is protected and cannot be modified")]
    ProtectedNode(String),

    #[error("Boundary node '{node_id}' can only be removed together with container '{owner_id}'")]
    BoundaryNode { node_id: String, owner_id: String },

    #[error("A '{0}' trigger already exists in this workflow")]
    DuplicateTrigger(String),

    #[error("Illegal placement: {0}")]
    IllegalPlacement(PlacementRule),

    #[error("Node '{node_id}' is a {from} and cannot be changed into a {to}")]
    ComponentChange {
        node_id: String,
        from: String,
        to: String,
    },

    #[error("Graph invariant violated: {0}")]
    InvariantViolation(String),
}

/// Any error an editor command can fail with. The document is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}
