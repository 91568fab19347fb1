use serde::{Deserialize, Serialize};

use crate::definition::Branch;

/// Which lane of the canvas an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Trigger,
    Main,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
}

impl EdgeStyle {
    pub fn for_branch(branch: Branch) -> Self {
        let stroke = match branch {
            Branch::False => "red",
            Branch::True => "green",
        };
        Self {
            stroke: stroke.to_string(),
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    pub lane: Lane,
    #[serde(default)]
    pub animated: bool,
}

impl Edge {
    pub fn new(source: &str, target: &str, lane: Lane) -> Self {
        Self {
            id: edge_id(source, target, None),
            source: source.to_string(),
            target: target.to_string(),
            label: None,
            style: None,
            lane,
            animated: false,
        }
    }

    /// A labeled switch output.
    pub fn branch(source: &str, target: &str, branch: Branch) -> Self {
        Self::new(source, target, Lane::Main)
            .with_label(Some(branch), Some(EdgeStyle::for_branch(branch)))
    }

    /// Sets label and style, keeping the id consistent with the label.
    pub fn with_label(mut self, label: Option<Branch>, style: Option<EdgeStyle>) -> Self {
        self.id = edge_id(&self.source, &self.target, label);
        self.label = label;
        self.style = style;
        self
    }
}

pub fn edge_id(source: &str, target: &str, label: Option<Branch>) -> String {
    match label {
        Some(branch) => format!("e{}-{}-{}", source, target, branch),
        None => format!("e{}-{}", source, target),
    }
}
