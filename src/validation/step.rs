use ahash::AHashSet;
use itertools::Itertools;
use serde_json::Value;

use super::references::{self, ReferenceContext, Resolution};
use super::{Finding, FindingTarget, ProviderCatalog};
use crate::definition::{Branch, Component, Condition, Definition, Step, TaskKind, TaskProperties};

/// Runs the per-step checks over every step, nested ones included.
pub(super) fn check_steps(definition: &Definition, catalog: &ProviderCatalog) -> Vec<Finding> {
    let mut checker = StepChecker {
        definition,
        catalog,
        declared: AHashSet::new(),
        findings: Vec::new(),
    };
    checker.check_sequence(&definition.sequence, false);
    checker.findings
}

struct StepChecker<'a> {
    definition: &'a Definition,
    catalog: &'a ProviderCatalog,
    declared: AHashSet<&'a str>,
    findings: Vec<Finding>,
}

impl<'a> StepChecker<'a> {
    fn check_sequence(&mut self, steps: &'a [Step], in_container: bool) {
        for step in steps {
            self.check_step(step, in_container);
        }
    }

    fn check_step(&mut self, step: &'a Step, in_container: bool) {
        let target = FindingTarget::Step {
            key: step.display_key().to_string(),
        };

        match &step.component {
            Component::Empty => self.error(&target, "Step is incomplete"),
            Component::Task { properties } => self.check_task(step, properties, &target),
            Component::Switch {
                properties,
                branches,
            } => {
                let incomplete = match properties {
                    Condition::Threshold { value, compare_to } => {
                        (value.trim().is_empty() || compare_to.trim().is_empty())
                            .then_some("Threshold condition needs both 'value' and 'compare_to'")
                    }
                    Condition::Assert { assert } => assert
                        .trim()
                        .is_empty()
                        .then_some("Assert condition needs an expression"),
                };
                if let Some(message) = incomplete {
                    self.error(&target, message);
                }
                if branches.get(Branch::True).is_empty() {
                    self.warning(&target, "The 'true' branch has no steps");
                }
            }
            Component::Container {
                properties,
                sequence,
            } => {
                if properties.value.trim().is_empty() {
                    self.error(&target, "Foreach needs a value to iterate over");
                }
                if sequence.is_empty() {
                    self.warning(&target, "Foreach body has no steps");
                }
            }
            Component::Trigger { .. } => {}
        }

        self.check_references(step, in_container, &target);

        self.declared.insert(step.id.as_str());
        if !step.name.trim().is_empty() {
            self.declared.insert(step.name.as_str());
        }

        match &step.component {
            Component::Switch { branches, .. } => {
                // A branch only sees what precedes the switch and itself.
                let outer = self.declared.clone();
                let mut merged = outer.clone();
                for branch in Branch::ORDERED {
                    self.declared = outer.clone();
                    self.check_sequence(branches.get(branch), in_container);
                    merged.extend(self.declared.iter().copied());
                }
                self.declared = merged;
            }
            Component::Container { sequence, .. } => self.check_sequence(sequence, true),
            _ => {}
        }
    }

    fn check_task(&mut self, step: &Step, properties: &TaskProperties, target: &FindingTarget) {
        let (Some(kind), Some(provider_type)) = (step.task_kind(), step.provider_type()) else {
            self.error(target, format!("Unknown task type '{}'", step.step_type));
            return;
        };

        let catalog = self.catalog;
        let spec = catalog.provider(provider_type);
        match spec {
            None => self.error(target, format!("Unknown provider type '{}'", provider_type)),
            Some(spec) if !spec.supports(kind) => {
                let capability = match kind {
                    TaskKind::Step => "be queried",
                    TaskKind::Action => "send notifications",
                };
                self.error(
                    target,
                    format!("Provider '{}' cannot {}", provider_type, capability),
                );
            }
            Some(_) => {}
        }

        match properties.provider_instance() {
            None => self.warning(target, "No provider selected"),
            Some(name) => match catalog.installed(name) {
                None => self.warning(target, format!("Provider '{}' is not installed", name)),
                Some(installed) if installed.provider_type != provider_type => self.warning(
                    target,
                    format!(
                        "Provider '{}' is a {} provider, not {}",
                        name, installed.provider_type, provider_type
                    ),
                ),
                Some(_) => {}
            },
        }

        if let Some(spec) = spec.filter(|s| s.supports(kind)) {
            let missing = spec
                .params(kind)
                .iter()
                .filter(|param| param.required && !has_value(properties.with.get(&param.name)))
                .map(|param| param.name.as_str())
                .join(", ");
            if !missing.is_empty() {
                self.error(target, format!("Missing required parameters: {}", missing));
            }
        }
    }

    /// At most one error (first unresolved reference) and one warning (first
    /// unknown root) per step.
    fn check_references(&mut self, step: &'a Step, in_container: bool, target: &FindingTarget) {
        let context = ReferenceContext {
            definition: self.definition,
            catalog: self.catalog,
            declared: &self.declared,
            in_container,
            step,
        };

        let mut unresolved = None;
        let mut unknown = None;
        for text in references::step_texts(step) {
            for reference in references::scan(text) {
                match context.resolve(&reference) {
                    Resolution::Resolved => {}
                    Resolution::Unresolved => {
                        unresolved.get_or_insert_with(|| reference.raw.to_string());
                    }
                    Resolution::UnknownRoot => {
                        unknown.get_or_insert_with(|| reference.raw.to_string());
                    }
                }
            }
        }

        if let Some(raw) = unresolved {
            self.error(target, format!("Reference '{}' cannot be resolved", raw));
        }
        if let Some(raw) = unknown {
            self.warning(target, format!("Reference '{}' has an unknown root", raw));
        }
    }

    fn error(&mut self, target: &FindingTarget, message: impl Into<String>) {
        self.findings.push(Finding::error(target.clone(), message));
    }

    fn warning(&mut self, target: &FindingTarget, message: impl Into<String>) {
        self.findings.push(Finding::warning(target.clone(), message));
    }
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
