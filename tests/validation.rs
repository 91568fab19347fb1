//! Tests for semantic validation of definitions.
mod common;
use common::*;
use flowsmith::definition::{AlertTrigger, IncidentEvent, IncidentTrigger, IntervalTrigger, TaskProperties};
use flowsmith::prelude::*;
use serde_json::json;

fn messages<'a>(findings: impl Iterator<Item = &'a Finding>) -> Vec<&'a str> {
    findings.map(|f| f.message.as_str()).collect()
}

#[test]
fn test_sample_definitions_are_clean() {
    let catalog = sample_catalog();
    for definition in [linear_definition(), switch_definition(), foreach_definition()] {
        let report = validate(&definition, &catalog);
        assert!(report.is_clean(), "unexpected findings:\n{}", report);
        assert!(report.is_deployable());
    }
}

#[test]
fn test_workflow_level_findings() {
    let definition = Definition::new(Properties::new("  "), vec![]);
    let report = validate(&definition, &sample_catalog());

    assert!(!report.is_deployable());
    assert_eq!(
        messages(report.for_workflow()),
        vec![
            "Workflow name is required",
            "Workflow needs at least one trigger",
            "Workflow has no steps",
        ]
    );
    assert_eq!(report.errors().count(), 2);
    assert_eq!(report.warnings().count(), 1);
}

#[test]
fn test_warnings_do_not_block_deployment() {
    let definition = Definition::new(manual_properties("quiet"), vec![]);
    let report = validate(&definition, &sample_catalog());

    assert!(!report.is_clean());
    assert!(report.is_deployable());
    assert_eq!(messages(report.warnings()), vec!["Workflow has no steps"]);
}

#[test]
fn test_trigger_configuration_findings() {
    let properties = manual_properties("triggers")
        .with_trigger(TriggerConfig::Interval(IntervalTrigger { interval: 0 }))
        .with_trigger(TriggerConfig::Alert(AlertTrigger::default()))
        .with_trigger(TriggerConfig::Incident(IncidentTrigger::default()));
    let definition = Definition::new(properties, vec![query_task("a")]);
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_trigger(TriggerKind::Interval)),
        vec!["Interval must be greater than 0 seconds"]
    );
    assert_eq!(
        messages(report.for_trigger(TriggerKind::Alert)),
        vec!["Alert trigger needs at least one filter or a CEL expression"]
    );
    assert_eq!(
        messages(report.for_trigger(TriggerKind::Incident)),
        vec!["Incident trigger needs at least one event"]
    );
    assert_eq!(report.for_trigger(TriggerKind::Manual).count(), 0);
}

#[test]
fn test_configured_triggers_pass() {
    let mut alert = AlertTrigger::default();
    alert.filters.insert("source".to_string(), "prometheus".to_string());
    let properties = Properties::new("triggers")
        .with_trigger(TriggerConfig::Interval(IntervalTrigger { interval: 60 }))
        .with_trigger(TriggerConfig::Alert(alert))
        .with_trigger(TriggerConfig::Incident(IncidentTrigger {
            events: vec![IncidentEvent::Created],
        }));
    let definition = Definition::new(properties, vec![query_task("a")]);

    let report = validate(&definition, &sample_catalog());
    assert!(report.is_clean(), "unexpected findings:\n{}", report);

    let cel_only = Properties::new("cel").with_trigger(TriggerConfig::Alert(AlertTrigger {
        cel: Some("severity == 'critical'".to_string()),
        ..Default::default()
    }));
    let report = validate(&Definition::new(cel_only, vec![query_task("a")]), &sample_catalog());
    assert!(report.is_deployable());
}

#[test]
fn test_placeholder_steps_block_deployment() {
    let definition = Definition::new(
        manual_properties("gaps"),
        vec![query_task("a"), Step::empty("a__empty")],
    );
    let report = validate(&definition, &sample_catalog());

    assert!(!report.is_deployable());
    assert_eq!(messages(report.for_step("a__empty")), vec!["Step is incomplete"]);
}

#[test]
fn test_unknown_provider_type() {
    let step = Step::task("a", "fetch", "step-datadog", TaskProperties::default());
    let definition = Definition::new(manual_properties("unknown"), vec![step]);
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("fetch")),
        vec!["Unknown provider type 'datadog'", "No provider selected"]
    );
}

#[test]
fn test_unknown_task_type() {
    let step = Step::task("a", "odd", "run-script", TaskProperties::default());
    let definition = Definition::new(manual_properties("odd"), vec![step]);
    let report = validate(&definition, &sample_catalog());

    assert_eq!(messages(report.for_step("odd")), vec!["Unknown task type 'run-script'"]);
}

#[test]
fn test_provider_capabilities() {
    let mut properties = TaskProperties {
        config: Some("{{ providers.prom }}".to_string()),
        ..Default::default()
    };
    properties.with.insert("message".to_string(), json!("hi"));
    let notify_via_prometheus = Step::task("a", "page", "action-prometheus", properties);

    let query_slack = Step::task(
        "b",
        "read",
        "step-slack",
        TaskProperties {
            config: Some("{{ providers.slack-prod }}".to_string()),
            ..Default::default()
        },
    );

    let definition = Definition::new(
        manual_properties("capabilities"),
        vec![notify_via_prometheus, query_slack],
    );
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("page")),
        vec!["Provider 'prometheus' cannot send notifications"]
    );
    assert_eq!(
        messages(report.for_step("read")),
        vec!["Provider 'slack' cannot be queried"]
    );
}

#[test]
fn test_provider_instance_findings() {
    let not_installed = TaskProperties {
        config: Some("{{ providers.slack-dev }}".to_string()),
        with: json!({ "message": "x" }).as_object().cloned().unwrap_or_default(),
        ..Default::default()
    };
    let wrong_type = TaskProperties {
        config: Some("prom".to_string()),
        with: json!({ "message": "x" }).as_object().cloned().unwrap_or_default(),
        ..Default::default()
    };
    let definition = Definition::new(
        manual_properties("instances"),
        vec![
            Step::task("a", "first", "action-slack", not_installed),
            Step::task("b", "second", "action-slack", wrong_type),
        ],
    );
    let report = validate(&definition, &sample_catalog());

    assert!(report.is_deployable());
    assert_eq!(
        messages(report.for_step("first")),
        vec!["Provider 'slack-dev' is not installed"]
    );
    assert_eq!(
        messages(report.for_step("second")),
        vec!["Provider 'prom' is a prometheus provider, not slack"]
    );
    assert!(report.for_step("second").all(|f| f.severity == Severity::Warning));
}

#[test]
fn test_missing_required_parameters() {
    let properties = TaskProperties {
        config: Some("{{ providers.prom }}".to_string()),
        with: json!({ "query": "  ", "step": "1m" }).as_object().cloned().unwrap_or_default(),
        ..Default::default()
    };
    let definition = Definition::new(
        manual_properties("params"),
        vec![Step::task("a", "fetch", "step-prometheus", properties)],
    );
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("fetch")),
        vec!["Missing required parameters: query"]
    );
}

#[test]
fn test_switch_and_foreach_findings() {
    let switch = Step::switch(
        "check",
        "check",
        Condition::Threshold {
            value: "{{ steps.a.results }}".to_string(),
            compare_to: String::new(),
        },
        Default::default(),
    );
    let foreach = Step::foreach("loop", "loop", "", vec![]);
    let definition = Definition::new(
        manual_properties("shapes"),
        vec![query_task("a"), switch, foreach],
    );
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("check")),
        vec![
            "Threshold condition needs both 'value' and 'compare_to'",
            "The 'true' branch has no steps",
        ]
    );
    assert_eq!(
        messages(report.for_step("loop")),
        vec!["Foreach needs a value to iterate over", "Foreach body has no steps"]
    );
}

#[test]
fn test_empty_assert_condition() {
    let mut definition = Definition::new(
        manual_properties("assert"),
        vec![assert_switch("check", vec![], vec![notify_task("y", "yes")])],
    );
    if let Component::Switch { properties, .. } = &mut definition.sequence[0].component {
        *properties = Condition::Assert {
            assert: " ".to_string(),
        };
    }
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("check")),
        vec!["Assert condition needs an expression"]
    );
}

#[test]
fn test_duplicate_step_names() {
    let mut second = notify_task("b", "done");
    second.name = "a".to_string();
    let definition = Definition::new(manual_properties("dupes"), vec![query_task("a"), second]);
    let report = validate(&definition, &sample_catalog());

    assert!(!report.is_deployable());
    assert!(report
        .for_step("a")
        .any(|f| f.message == "Step name 'a' is used more than once"));
}

#[test]
fn test_step_references_must_point_backwards() {
    let forward = notify_task("a", "{{ steps.b.results }}");
    let definition = Definition::new(
        manual_properties("forward"),
        vec![forward, query_task("b")],
    );
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("a")),
        vec!["Reference '{{ steps.b.results }}' cannot be resolved"]
    );
}

#[test]
fn test_switch_branches_do_not_see_each_other() {
    let definition = Definition::new(
        manual_properties("sibling"),
        vec![
            query_task("a"),
            assert_switch(
                "check",
                vec![notify_task("x", "no")],
                vec![notify_task("y", "{{ steps.x.results }}")],
            ),
            notify_task("z", "{{ steps.x.results }}"),
        ],
    );
    let report = validate(&definition, &sample_catalog());

    assert_eq!(
        messages(report.for_step("y")),
        vec!["Reference '{{ steps.x.results }}' cannot be resolved"]
    );
    assert!(report.for_step("z").next().is_none(), "unexpected findings:\n{}", report);
}

#[test]
fn test_reference_roots() {
    let mut properties = manual_properties("roots");
    properties.consts.insert("threshold".to_string(), "5".to_string());
    let text = "{{ secrets.api-key }} {{ consts.threshold }} {{ providers.prom }}";
    let definition = Definition::new(properties, vec![notify_task("a", text)]);

    let report = validate(&definition, &sample_catalog());
    assert!(report.is_clean(), "unexpected findings:\n{}", report);

    let missing = "{{ secrets.nope }} {{ consts.nope }}";
    let definition = Definition::new(manual_properties("roots"), vec![notify_task("a", missing)]);
    let report = validate(&definition, &sample_catalog());
    assert_eq!(
        messages(report.for_step("a")),
        vec!["Reference '{{ secrets.nope }}' cannot be resolved"]
    );
}

#[test]
fn test_trigger_scoped_references() {
    let definition = Definition::new(
        manual_properties("alerts"),
        vec![notify_task("a", "{{ alert.name }}")],
    );
    let report = validate(&definition, &sample_catalog());
    assert_eq!(
        messages(report.for_step("a")),
        vec!["Reference '{{ alert.name }}' cannot be resolved"]
    );

    let properties = manual_properties("alerts").with_trigger(TriggerConfig::Alert(AlertTrigger {
        cel: Some("true".to_string()),
        ..Default::default()
    }));
    let definition = Definition::new(properties, vec![notify_task("a", "{{ alert.name }}")]);
    assert!(validate(&definition, &sample_catalog()).is_clean());
}

#[test]
fn test_foreach_reference_outside_container() {
    let definition = Definition::new(
        manual_properties("outside"),
        vec![notify_task("a", "{{ foreach.value }}")],
    );
    let report = validate(&definition, &sample_catalog());
    assert_eq!(
        messages(report.for_step("a")),
        vec!["Reference '{{ foreach.value }}' cannot be resolved"]
    );
}

#[test]
fn test_unknown_reference_root_is_a_warning() {
    let definition = Definition::new(
        manual_properties("unknown-root"),
        vec![notify_task("a", "{{ weather.today }} and {{ env.HOME }}")],
    );
    let report = validate(&definition, &sample_catalog());

    assert!(report.is_deployable());
    assert_eq!(
        messages(report.for_step("a")),
        vec!["Reference '{{ weather.today }}' has an unknown root"]
    );
}

#[test]
fn test_task_vars_are_in_scope() {
    let mut step = notify_task("a", "{{ vars.target }}");
    if let Component::Task { properties } = &mut step.component {
        properties.vars.insert("target".to_string(), "ops".to_string());
    }
    let definition = Definition::new(manual_properties("vars"), vec![step]);
    assert!(validate(&definition, &sample_catalog()).is_clean());
}

#[test]
fn test_validator_catalog_swap() {
    let definition = linear_definition();
    let mut validator = Validator::new(ProviderCatalog::default());
    let report = validator.validate(&definition);
    assert!(!report.is_deployable());
    assert!(report
        .for_step("a")
        .any(|f| f.message == "Unknown provider type 'prometheus'"));

    validator.set_catalog(sample_catalog());
    assert!(validator.validate(&definition).is_clean());
}

#[test]
fn test_catalog_from_json() {
    let json = r#"{
        "providers": [
            { "type": "prometheus", "can_query": true, "query_params": [{ "name": "query", "required": true }] }
        ],
        "installed": [{ "name": "prom", "type": "prometheus" }],
        "secrets": ["api-key"]
    }"#;
    let catalog = ProviderCatalog::from_json(json).expect("Failed to parse catalog");

    let spec = catalog.provider("prometheus").expect("prometheus is known");
    assert!(spec.can_query);
    assert!(!spec.can_notify);
    assert_eq!(catalog.installed("prom").map(|p| p.provider_type.as_str()), Some("prometheus"));
    assert!(catalog.has_secret("api-key"));

    match ProviderCatalog::from_json("[") {
        Err(SchemaError::JsonParseError(_)) => {}
        other => panic!("Expected JsonParseError, got {:?}", other),
    }
}

#[test]
fn test_findings_nested_in_branches() {
    let report = validate(
        &Definition::new(
            manual_properties("nested"),
            vec![
                query_task("a"),
                assert_switch("check", vec![Step::empty("check__empty_false")], vec![notify_task("y", "yes")]),
            ],
        ),
        &sample_catalog(),
    );
    assert_eq!(messages(report.for_step("check__empty_false")), vec!["Step is incomplete"]);
    assert_eq!(report.errors().count(), 1);
}
