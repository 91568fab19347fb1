//! The authoritative tree form of a workflow.

pub mod conversion;
pub mod payload;
pub mod properties;
pub mod step;
pub mod trigger;

pub use conversion::*;
pub use payload::parse_step;
pub use properties::*;
pub use step::*;
pub use trigger::*;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Trigger properties plus the ordered, possibly nested step sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub sequence: Vec<Step>,
}

impl Definition {
    pub fn new(properties: Properties, sequence: Vec<Step>) -> Self {
        Self {
            properties,
            sequence,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        json.into_definition()
    }

    /// Every step of the sequence, nested ones included, depth first with their nesting depth.
    pub fn steps(&self) -> Vec<(&Step, usize)> {
        let mut steps = Vec::new();
        for step in &self.sequence {
            step.visit(0, &mut |s, depth| steps.push((s, depth)));
        }
        steps
    }
}
