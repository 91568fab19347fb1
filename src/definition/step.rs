use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::trigger::{TriggerConfig, TriggerKind};

/// Prefix of task types that query a provider (`step-<provider>`).
pub const STEP_PREFIX: &str = "step-";
/// Prefix of task types that notify through a provider (`action-<provider>`).
pub const ACTION_PREFIX: &str = "action-";
pub const THRESHOLD_TYPE: &str = "condition-threshold";
pub const ASSERT_TYPE: &str = "condition-assert";
pub const FOREACH_TYPE: &str = "foreach";
pub const EMPTY_TYPE: &str = "empty";

/// One of the two outputs of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    False,
    True,
}

impl Branch {
    /// Branch order is always `false` then `true`.
    pub const ORDERED: [Branch; 2] = [Branch::False, Branch::True];

    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::False => "false",
            Branch::True => "true",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discriminant naming which structural rules apply to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Start,
    End,
    Trigger,
    Task,
    Switch,
    Container,
    Empty,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Start => "start",
            ComponentType::End => "end",
            ComponentType::Trigger => "trigger",
            ComponentType::Task => "task",
            ComponentType::Switch => "switch",
            ComponentType::Container => "container",
            ComponentType::Empty => "empty",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a task reads from its provider or sends through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Step,
    Action,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskProperties {
    /// Reference to an installed provider instance, e.g. `{{ providers.my-slack }}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub with: serde_json::Map<String, serde_json::Value>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
}

impl TaskProperties {
    /// Name of the provider instance referenced by `config`, accepting both the
    /// templated (`{{ providers.name }}`) and the bare form.
    pub fn provider_instance(&self) -> Option<&str> {
        let raw = self.config.as_deref()?.trim();
        let inner = raw
            .strip_prefix("{{")
            .and_then(|s| s.strip_suffix("}}"))
            .map(str::trim)
            .unwrap_or(raw);
        let name = inner.strip_prefix("providers.").unwrap_or(inner).trim();
        (!name.is_empty()).then_some(name)
    }
}

/// The condition a switch evaluates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Threshold { value: String, compare_to: String },
    Assert { assert: String },
}

impl Condition {
    /// The empty condition for a switch of `step_type`, if the type is a known switch type.
    pub fn default_for(step_type: &str) -> Option<Self> {
        match step_type {
            THRESHOLD_TYPE => Some(Condition::Threshold {
                value: String::new(),
                compare_to: String::new(),
            }),
            ASSERT_TYPE => Some(Condition::Assert {
                assert: String::new(),
            }),
            _ => None,
        }
    }

    pub fn matches_type(&self, step_type: &str) -> bool {
        matches!(
            (self, step_type),
            (Condition::Threshold { .. }, THRESHOLD_TYPE) | (Condition::Assert { .. }, ASSERT_TYPE)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branches {
    #[serde(default, rename = "false")]
    pub false_branch: Vec<Step>,
    #[serde(default, rename = "true")]
    pub true_branch: Vec<Step>,
}

impl Branches {
    pub fn get(&self, branch: Branch) -> &[Step] {
        match branch {
            Branch::False => &self.false_branch,
            Branch::True => &self.true_branch,
        }
    }

    pub fn get_mut(&mut self, branch: Branch) -> &mut Vec<Step> {
        match branch {
            Branch::False => &mut self.false_branch,
            Branch::True => &mut self.true_branch,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.false_branch.is_empty() && self.true_branch.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerProperties {
    /// Expression producing the items to iterate over, e.g. `{{ steps.get-alerts.results }}`.
    #[serde(default)]
    pub value: String,
}

/// Variant-specific part of a step, discriminated by `componentType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "componentType", rename_all = "lowercase")]
pub enum Component {
    Trigger {
        properties: TriggerConfig,
    },
    Task {
        #[serde(default)]
        properties: TaskProperties,
    },
    Switch {
        properties: Condition,
        #[serde(default)]
        branches: Branches,
    },
    Container {
        #[serde(default)]
        properties: ContainerProperties,
        #[serde(default)]
        sequence: Vec<Step>,
    },
    Empty,
}

/// A unit of work in a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(flatten)]
    pub component: Component,
}

impl Step {
    pub fn task(id: &str, name: &str, step_type: &str, properties: TaskProperties) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            step_type: step_type.to_string(),
            component: Component::Task { properties },
        }
    }

    pub fn switch(id: &str, name: &str, condition: Condition, branches: Branches) -> Self {
        let step_type = match condition {
            Condition::Threshold { .. } => THRESHOLD_TYPE,
            Condition::Assert { .. } => ASSERT_TYPE,
        };
        Self {
            id: id.to_string(),
            name: name.to_string(),
            step_type: step_type.to_string(),
            component: Component::Switch {
                properties: condition,
                branches,
            },
        }
    }

    pub fn foreach(id: &str, name: &str, value: &str, sequence: Vec<Step>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            step_type: FOREACH_TYPE.to_string(),
            component: Component::Container {
                properties: ContainerProperties {
                    value: value.to_string(),
                },
                sequence,
            },
        }
    }

    pub fn trigger(config: TriggerConfig) -> Self {
        let kind = config.kind();
        Self {
            id: kind.as_str().to_string(),
            name: kind.display_name().to_string(),
            step_type: kind.as_str().to_string(),
            component: Component::Trigger { properties: config },
        }
    }

    /// A neutral placeholder standing in for a missing part of the workflow.
    pub fn empty(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            step_type: EMPTY_TYPE.to_string(),
            component: Component::Empty,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self.component {
            Component::Trigger { .. } => ComponentType::Trigger,
            Component::Task { .. } => ComponentType::Task,
            Component::Switch { .. } => ComponentType::Switch,
            Component::Container { .. } => ComponentType::Container,
            Component::Empty => ComponentType::Empty,
        }
    }

    pub fn trigger_kind(&self) -> Option<TriggerKind> {
        match &self.component {
            Component::Trigger { properties } => Some(properties.kind()),
            _ => None,
        }
    }

    pub fn task_kind(&self) -> Option<TaskKind> {
        if !matches!(self.component, Component::Task { .. }) {
            return None;
        }
        if self.step_type.starts_with(STEP_PREFIX) {
            Some(TaskKind::Step)
        } else if self.step_type.starts_with(ACTION_PREFIX) {
            Some(TaskKind::Action)
        } else {
            None
        }
    }

    /// Provider type a task is bound to, e.g. `slack` for `action-slack`.
    pub fn provider_type(&self) -> Option<&str> {
        match self.task_kind()? {
            TaskKind::Step => self.step_type.strip_prefix(STEP_PREFIX),
            TaskKind::Action => self.step_type.strip_prefix(ACTION_PREFIX),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.component, Component::Empty)
    }

    /// Key used to address this step in user-facing output: the name, or the id when unnamed.
    pub fn display_key(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// A copy of this step without its nested steps. Graph nodes hold shallow steps,
    /// since branches and bodies are represented by the graph itself.
    pub fn shallow(&self) -> Step {
        let mut step = self.clone();
        match &mut step.component {
            Component::Switch { branches, .. } => *branches = Branches::default(),
            Component::Container { sequence, .. } => sequence.clear(),
            _ => {}
        }
        step
    }

    /// Greatest number of nested switches along any path through this step, itself included.
    pub fn switch_depth(&self) -> usize {
        match &self.component {
            Component::Switch { branches, .. } => {
                1 + Branch::ORDERED
                    .iter()
                    .map(|b| max_depth(branches.get(*b), Step::switch_depth))
                    .max()
                    .unwrap_or(0)
            }
            Component::Container { sequence, .. } => max_depth(sequence, Step::switch_depth),
            _ => 0,
        }
    }

    /// Greatest number of nested containers along any path through this step, itself included.
    pub fn container_depth(&self) -> usize {
        match &self.component {
            Component::Switch { branches, .. } => Branch::ORDERED
                .iter()
                .map(|b| max_depth(branches.get(*b), Step::container_depth))
                .max()
                .unwrap_or(0),
            Component::Container { sequence, .. } => {
                1 + max_depth(sequence, Step::container_depth)
            }
            _ => 0,
        }
    }

    /// Visits this step and every nested step, depth first, in sequence order.
    pub fn visit<'a>(&'a self, depth: usize, f: &mut impl FnMut(&'a Step, usize)) {
        f(self, depth);
        match &self.component {
            Component::Switch { branches, .. } => {
                for branch in Branch::ORDERED {
                    for step in branches.get(branch) {
                        step.visit(depth + 1, f);
                    }
                }
            }
            Component::Container { sequence, .. } => {
                for step in sequence {
                    step.visit(depth + 1, f);
                }
            }
            _ => {}
        }
    }

    /// Applies `f` to this step and every nested step.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Step)) {
        f(self);
        match &mut self.component {
            Component::Switch { branches, .. } => {
                for branch in Branch::ORDERED {
                    for step in branches.get_mut(branch) {
                        step.visit_mut(f);
                    }
                }
            }
            Component::Container { sequence, .. } => {
                for step in sequence {
                    step.visit_mut(f);
                }
            }
            _ => {}
        }
    }
}

fn max_depth(steps: &[Step], depth: fn(&Step) -> usize) -> usize {
    steps.iter().map(depth).max().unwrap_or(0)
}
