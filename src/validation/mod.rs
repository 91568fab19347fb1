//! Semantic validation of a definition.
//!
//! Validation is pure and never fails: it returns a [`ValidationReport`]
//! listing every finding with its severity. A definition is deployable when
//! the report holds no errors; warnings are advisory.

mod catalog;
mod global;
mod references;
mod step;

pub use catalog::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::definition::{Definition, TriggerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "lowercase")]
pub enum FindingTarget {
    Workflow,
    Trigger { kind: TriggerKind },
    /// A step, addressed by its name (or its id when unnamed).
    Step { key: String },
}

impl fmt::Display for FindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingTarget::Workflow => write!(f, "workflow"),
            FindingTarget::Trigger { kind } => write!(f, "trigger '{}'", kind),
            FindingTarget::Step { key } => write!(f, "step '{}'", key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(flatten)]
    pub target: FindingTarget,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub(crate) fn error(target: FindingTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub(crate) fn warning(target: FindingTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.target, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_deployable(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// Findings addressed to the step named (or, if unnamed, identified by) `key`.
    pub fn for_step<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |f| matches!(&f.target, FindingTarget::Step { key: k } if k == key))
    }

    pub fn for_trigger(&self, kind: TriggerKind) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |f| f.target == FindingTarget::Trigger { kind })
    }

    pub fn for_workflow(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.target == FindingTarget::Workflow)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            return writeln!(f, "no findings");
        }
        for finding in &self.findings {
            writeln!(f, "{}", finding)?;
        }
        Ok(())
    }
}

/// Runs the workflow-level and per-step checks against a provider catalog.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    catalog: ProviderCatalog,
}

impl Validator {
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    pub fn set_catalog(&mut self, catalog: ProviderCatalog) {
        self.catalog = catalog;
    }

    pub fn validate(&self, definition: &Definition) -> ValidationReport {
        let mut findings = global::check_workflow(definition);
        findings.extend(step::check_steps(definition, &self.catalog));

        let report = ValidationReport { findings };
        tracing::debug!(
            errors = report.errors().count(),
            warnings = report.warnings().count(),
            "validated definition"
        );
        report
    }
}

pub fn validate(definition: &Definition, catalog: &ProviderCatalog) -> ValidationReport {
    Validator::new(catalog.clone()).validate(definition)
}
