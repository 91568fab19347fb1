use itertools::Itertools;

use super::{Finding, FindingTarget};
use crate::definition::{Definition, TriggerConfig};

/// Checks that concern the workflow as a whole.
pub(super) fn check_workflow(definition: &Definition) -> Vec<Finding> {
    let mut findings = Vec::new();
    let properties = &definition.properties;

    if properties.name.trim().is_empty() {
        findings.push(Finding::error(
            FindingTarget::Workflow,
            "Workflow name is required",
        ));
    }

    if properties.triggers.is_empty() {
        findings.push(Finding::error(
            FindingTarget::Workflow,
            "Workflow needs at least one trigger",
        ));
    }
    for config in properties.triggers.configs() {
        if let Some(message) = trigger_problem(&config) {
            findings.push(Finding::error(
                FindingTarget::Trigger {
                    kind: config.kind(),
                },
                message,
            ));
        }
    }

    if definition.sequence.is_empty() {
        findings.push(Finding::warning(
            FindingTarget::Workflow,
            "Workflow has no steps",
        ));
    }

    let duplicates = definition
        .steps()
        .into_iter()
        .map(|(step, _)| step.name.trim())
        .filter(|name| !name.is_empty())
        .duplicates();
    for name in duplicates {
        findings.push(Finding::error(
            FindingTarget::Step {
                key: name.to_string(),
            },
            format!("Step name '{}' is used more than once", name),
        ));
    }

    findings
}

fn trigger_problem(config: &TriggerConfig) -> Option<&'static str> {
    match config {
        TriggerConfig::Manual(_) => None,
        TriggerConfig::Interval(c) if c.interval == 0 => {
            Some("Interval must be greater than 0 seconds")
        }
        TriggerConfig::Interval(_) => None,
        TriggerConfig::Alert(c) => {
            let has_cel = c.cel.as_deref().is_some_and(|cel| !cel.trim().is_empty());
            (c.filters.is_empty() && !has_cel)
                .then_some("Alert trigger needs at least one filter or a CEL expression")
        }
        TriggerConfig::Incident(c) => c
            .events
            .is_empty()
            .then_some("Incident trigger needs at least one event"),
    }
}
