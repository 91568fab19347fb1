use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ProviderCatalog;
use crate::definition::{Component, Condition, Definition, Step, TriggerKind};

/// Pattern for `{{ root.field ... }}` template references
static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][\w-]*)(?:\.([\w-]+))?[^}]*\}\}").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Reference<'a> {
    pub raw: &'a str,
    pub root: &'a str,
    pub field: Option<&'a str>,
}

pub(super) fn scan(text: &str) -> Vec<Reference<'_>> {
    REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            Some(Reference {
                raw: caps.get(0)?.as_str(),
                root: caps.get(1)?.as_str(),
                field: caps.get(2).map(|m| m.as_str()),
            })
        })
        .collect()
}

/// Every string of a step that may carry template references. The provider
/// `config` is left out: it is checked against the installed providers directly.
pub(super) fn step_texts(step: &Step) -> Vec<&str> {
    let mut texts = Vec::new();
    match &step.component {
        Component::Task { properties } => {
            for value in properties.with.values() {
                json_strings(value, &mut texts);
            }
            texts.extend(properties.condition.as_deref());
            texts.extend(properties.vars.values().map(String::as_str));
        }
        Component::Switch { properties, .. } => match properties {
            Condition::Threshold { value, compare_to } => {
                texts.push(value);
                texts.push(compare_to);
            }
            Condition::Assert { assert } => texts.push(assert),
        },
        Component::Container { properties, .. } => texts.push(&properties.value),
        Component::Trigger { .. } | Component::Empty => {}
    }
    texts
}

fn json_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| json_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| json_strings(v, out)),
        _ => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Resolution {
    Resolved,
    /// The root is known but nothing in scope matches.
    Unresolved,
    UnknownRoot,
}

/// What a reference inside one step can see.
pub(super) struct ReferenceContext<'a> {
    pub definition: &'a Definition,
    pub catalog: &'a ProviderCatalog,
    /// Names and ids of the steps that come before this one.
    pub declared: &'a AHashSet<&'a str>,
    pub in_container: bool,
    pub step: &'a Step,
}

impl ReferenceContext<'_> {
    pub fn resolve(&self, reference: &Reference<'_>) -> Resolution {
        let field = reference.field;
        let triggers = &self.definition.properties.triggers;
        let resolved = match reference.root {
            "steps" => field.is_some_and(|name| self.declared.contains(name)),
            "alert" => triggers.contains(TriggerKind::Alert),
            "incident" => triggers.contains(TriggerKind::Incident),
            "secrets" => field.is_some_and(|name| self.catalog.has_secret(name)),
            "consts" => field.is_some_and(|name| {
                self.definition.properties.consts.contains_key(name)
            }),
            "providers" => field.is_some_and(|name| self.catalog.installed(name).is_some()),
            "foreach" => self.in_container,
            "vars" => match &self.step.component {
                Component::Task { properties } => {
                    field.is_some_and(|name| properties.vars.contains_key(name))
                }
                _ => false,
            },
            _ => return Resolution::UnknownRoot,
        };
        if resolved {
            Resolution::Resolved
        } else {
            Resolution::Unresolved
        }
    }
}
