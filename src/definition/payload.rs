//! Boundary parsing of untyped step payloads.
//!
//! Payloads arrive as loose JSON (for instance from a drag source in a UI).
//! They are checked once here against the schema of their `componentType` and
//! turned into a typed [`Step`]; everything past this point works on the typed
//! variant only.

use serde_json::{Map, Value};

use super::step::{
    ACTION_PREFIX, Branch, Branches, Component, Condition, ContainerProperties, FOREACH_TYPE,
    STEP_PREFIX, Step, TaskProperties,
};
use super::trigger::{TriggerConfig, TriggerKind};
use crate::error::SchemaError;

/// Parses a payload into a typed step.
///
/// Triggers are validated against the trigger schema (`type` must name a
/// trigger kind, `properties` must match that kind); everything else against
/// the generic step schema. Nested branch and body steps are parsed
/// recursively. A missing `id` is left empty for the caller to assign.
pub fn parse_step(payload: &Value) -> Result<Step, SchemaError> {
    let object = payload.as_object().ok_or(SchemaError::NotAnObject)?;
    let component_type = required_str(object, "componentType")?;

    match component_type {
        "trigger" => parse_trigger(object),
        "task" | "switch" | "container" => parse_generic(object, component_type),
        "start" | "end" | "empty" => Err(SchemaError::ReservedComponentType(
            component_type.to_string(),
        )),
        other => Err(SchemaError::UnknownComponentType(other.to_string())),
    }
}

fn parse_trigger(object: &Map<String, Value>) -> Result<Step, SchemaError> {
    let kind: TriggerKind = required_str(object, "type")?.parse()?;
    let config = match object.get("properties") {
        Some(properties) if !properties.is_null() => {
            TriggerConfig::from_properties(kind, properties.clone())?
        }
        _ => TriggerConfig::default_for(kind),
    };

    let mut step = Step::trigger(config);
    if let Some(name) = optional_str(object, "name") {
        step.name = name.to_string();
    }
    Ok(step)
}

fn parse_generic(object: &Map<String, Value>, component_type: &str) -> Result<Step, SchemaError> {
    let step_type = required_str(object, "type")?;
    let name = required_str(object, "name")?;
    let id = optional_str(object, "id").unwrap_or_default();
    let properties = object.get("properties").filter(|p| !p.is_null());

    let invalid_type = || SchemaError::InvalidStepType {
        step_type: step_type.to_string(),
        component: component_type.to_string(),
    };
    let invalid_properties = |e: serde_json::Error| SchemaError::InvalidProperties {
        step_type: step_type.to_string(),
        message: e.to_string(),
    };

    let component = match component_type {
        "task" => {
            let provider = step_type
                .strip_prefix(STEP_PREFIX)
                .or_else(|| step_type.strip_prefix(ACTION_PREFIX))
                .ok_or_else(invalid_type)?;
            if provider.is_empty() {
                return Err(invalid_type());
            }
            let properties: TaskProperties = match properties {
                Some(p) => serde_json::from_value(p.clone()).map_err(invalid_properties)?,
                None => TaskProperties::default(),
            };
            Component::Task { properties }
        }
        "switch" => {
            let default = Condition::default_for(step_type).ok_or_else(invalid_type)?;
            let condition = match properties {
                Some(p) => {
                    let condition: Condition =
                        serde_json::from_value(p.clone()).map_err(invalid_properties)?;
                    if !condition.matches_type(step_type) {
                        return Err(SchemaError::InvalidProperties {
                            step_type: step_type.to_string(),
                            message: "properties do not match the condition type".to_string(),
                        });
                    }
                    condition
                }
                None => default,
            };
            Component::Switch {
                properties: condition,
                branches: parse_branches(object.get("branches"))?,
            }
        }
        _ => {
            if step_type != FOREACH_TYPE {
                return Err(invalid_type());
            }
            let properties: ContainerProperties = match properties {
                Some(p) => serde_json::from_value(p.clone()).map_err(invalid_properties)?,
                None => ContainerProperties::default(),
            };
            Component::Container {
                properties,
                sequence: parse_sequence(object.get("sequence"))?,
            }
        }
    };

    Ok(Step {
        id: id.to_string(),
        name: name.to_string(),
        step_type: step_type.to_string(),
        component,
    })
}

fn parse_branches(value: Option<&Value>) -> Result<Branches, SchemaError> {
    let mut branches = Branches::default();
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(branches);
    };
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;
    for branch in Branch::ORDERED {
        *branches.get_mut(branch) = parse_sequence(object.get(branch.as_str()))?;
    }
    Ok(branches)
}

fn parse_sequence(value: Option<&Value>) -> Result<Vec<Step>, SchemaError> {
    match value.filter(|v| !v.is_null()) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(parse_nested).collect(),
        Some(_) => Err(SchemaError::InvalidProperties {
            step_type: "sequence".to_string(),
            message: "expected an array of steps".to_string(),
        }),
    }
}

/// Steps inside a branch or a body run on the main lane, so triggers are refused.
fn parse_nested(value: &Value) -> Result<Step, SchemaError> {
    let step = parse_step(value)?;
    match step.trigger_kind() {
        Some(kind) => Err(SchemaError::NestedTrigger(kind.as_str().to_string())),
        None => Ok(step),
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str, SchemaError> {
    optional_str(object, field).ok_or_else(|| SchemaError::MissingField(field.to_string()))
}

fn optional_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object.get(field).and_then(Value::as_str)
}
