use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::graph::Position;
use crate::layout::Direction;

/// Tunables of an [`Editor`](crate::editor::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Flow direction handed to the layout engine.
    pub direction: Direction,
    /// How many switches may enclose one another.
    pub max_switch_depth: usize,
    /// How many containers may enclose one another.
    pub max_container_depth: usize,
    /// Where freshly compiled nodes are placed before layout.
    pub origin: Position,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            max_switch_depth: 3,
            max_container_depth: 1,
            origin: Position::default(),
        }
    }
}

impl EditorConfig {
    /// Loads a config from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::JsonParseError(e.to_string()))
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_switch_depth(mut self, depth: usize) -> Self {
        self.max_switch_depth = depth;
        self
    }

    pub fn with_max_container_depth(mut self, depth: usize) -> Self {
        self.max_container_depth = depth;
        self
    }
}
