//! Common test utilities for building workflow definitions and catalogs.
use flowsmith::definition::{Branches, TaskProperties};
use flowsmith::prelude::*;
use flowsmith::validation::ParamSpec;
use serde_json::{Value, json};

/// Workflow properties with a name and a manual trigger.
#[allow(dead_code)]
pub fn manual_properties(name: &str) -> Properties {
    Properties::new(name).with_trigger(TriggerConfig::default_for(TriggerKind::Manual))
}

/// A query task bound to the installed `prom` provider.
#[allow(dead_code)]
pub fn query_task(id: &str) -> Step {
    let mut properties = TaskProperties {
        config: Some("{{ providers.prom }}".to_string()),
        ..Default::default()
    };
    properties.with.insert("query".to_string(), json!("up"));
    Step::task(id, id, "step-prometheus", properties)
}

/// A notification task bound to the installed `slack-prod` provider.
#[allow(dead_code)]
pub fn notify_task(id: &str, message: &str) -> Step {
    let mut properties = TaskProperties {
        config: Some("{{ providers.slack-prod }}".to_string()),
        ..Default::default()
    };
    properties.with.insert("message".to_string(), json!(message));
    Step::task(id, id, "action-slack", properties)
}

#[allow(dead_code)]
pub fn assert_switch(id: &str, false_branch: Vec<Step>, true_branch: Vec<Step>) -> Step {
    Step::switch(
        id,
        id,
        Condition::Assert {
            assert: "{{ steps.a.results }} == 1".to_string(),
        },
        Branches {
            false_branch,
            true_branch,
        },
    )
}

/// Manual trigger, then `a` and `b` in sequence.
#[allow(dead_code)]
pub fn linear_definition() -> Definition {
    Definition::new(
        manual_properties("linear"),
        vec![query_task("a"), notify_task("b", "done")],
    )
}

/// `a`, then a switch `check` with `x` on false and `y` on true, then `z`.
#[allow(dead_code)]
pub fn switch_definition() -> Definition {
    Definition::new(
        manual_properties("branching"),
        vec![
            query_task("a"),
            assert_switch("check", vec![notify_task("x", "no")], vec![notify_task("y", "yes")]),
            notify_task("z", "done"),
        ],
    )
}

/// A foreach `loop` over `a`'s results with `t` in its body, then `z`.
#[allow(dead_code)]
pub fn foreach_definition() -> Definition {
    Definition::new(
        manual_properties("looping"),
        vec![
            query_task("a"),
            Step::foreach(
                "loop",
                "loop",
                "{{ steps.a.results }}",
                vec![notify_task("t", "{{ foreach.value }}")],
            ),
            notify_task("z", "done"),
        ],
    )
}

/// Providers `prometheus` (query) and `slack` (notify), one installed instance
/// of each, and one secret.
#[allow(dead_code)]
pub fn sample_catalog() -> ProviderCatalog {
    ProviderCatalog::new()
        .with_provider(ProviderSpec::new("prometheus").with_query(vec![
            ParamSpec::required("query"),
            ParamSpec::optional("step"),
        ]))
        .with_provider(
            ProviderSpec::new("slack").with_notify(vec![
                ParamSpec::required("message"),
                ParamSpec::optional("channel"),
            ]),
        )
        .with_installed("prom", "prometheus")
        .with_installed("slack-prod", "slack")
        .with_secret("api-key")
}

#[allow(dead_code)]
pub fn task_payload(step_type: &str, name: &str) -> Value {
    json!({ "componentType": "task", "type": step_type, "name": name })
}

#[allow(dead_code)]
pub fn trigger_payload(kind: &str) -> Value {
    json!({ "componentType": "trigger", "type": kind })
}

#[allow(dead_code)]
pub fn switch_payload(name: &str) -> Value {
    json!({
        "componentType": "switch",
        "type": "condition-assert",
        "name": name,
        "properties": { "assert": "1 == 1" }
    })
}

#[allow(dead_code)]
pub fn foreach_payload(name: &str) -> Value {
    json!({
        "componentType": "container",
        "type": "foreach",
        "name": name,
        "properties": { "value": "{{ alert.items }}" }
    })
}

#[allow(dead_code)]
pub fn node_ids(graph: &Graph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

#[allow(dead_code)]
pub fn edge_ids(graph: &Graph) -> Vec<&str> {
    graph.edges.iter().map(|e| e.id.as_str()).collect()
}

/// An editor over an empty workflow (no triggers, no steps).
#[allow(dead_code)]
pub fn empty_editor() -> Editor {
    Editor::builder(Definition::new(Properties::new("scratch"), vec![])).build()
}
