use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// The closed set of trigger kinds a workflow can be started by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Manual,
    Interval,
    Alert,
    Incident,
}

impl TriggerKind {
    /// Canonical order used when expanding triggers into the graph.
    pub const ALL: [TriggerKind; 4] = [
        TriggerKind::Manual,
        TriggerKind::Interval,
        TriggerKind::Alert,
        TriggerKind::Incident,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Manual => "manual",
            TriggerKind::Interval => "interval",
            TriggerKind::Alert => "alert",
            TriggerKind::Incident => "incident",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TriggerKind::Manual => "Manual",
            TriggerKind::Interval => "Interval",
            TriggerKind::Alert => "Alert",
            TriggerKind::Incident => "Incident",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriggerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownTriggerKind(s.to_string()))
    }
}

/// Manual triggers carry no configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTrigger {}

/// Runs the workflow every `interval` seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalTrigger {
    #[serde(default, deserialize_with = "seconds_from_number_or_string")]
    pub interval: u64,
}

/// Runs the workflow for alerts matching every filter (and the CEL expression, if any).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cel: Option<String>,
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentEvent {
    Created,
    Updated,
    Deleted,
}

/// Runs the workflow when an incident goes through one of `events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentTrigger {
    #[serde(default)]
    pub events: Vec<IncidentEvent>,
}

/// A typed trigger configuration, one variant per `TriggerKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerConfig {
    Manual(ManualTrigger),
    Interval(IntervalTrigger),
    Alert(AlertTrigger),
    Incident(IncidentTrigger),
}

impl TriggerConfig {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerConfig::Manual(_) => TriggerKind::Manual,
            TriggerConfig::Interval(_) => TriggerKind::Interval,
            TriggerConfig::Alert(_) => TriggerKind::Alert,
            TriggerConfig::Incident(_) => TriggerKind::Incident,
        }
    }

    /// The empty configuration a freshly added trigger of `kind` starts with.
    pub fn default_for(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Manual => TriggerConfig::Manual(ManualTrigger::default()),
            TriggerKind::Interval => TriggerConfig::Interval(IntervalTrigger::default()),
            TriggerKind::Alert => TriggerConfig::Alert(AlertTrigger::default()),
            TriggerKind::Incident => TriggerConfig::Incident(IncidentTrigger::default()),
        }
    }

    /// Parses the `properties` object of a trigger payload against the schema for `kind`.
    pub fn from_properties(
        kind: TriggerKind,
        properties: serde_json::Value,
    ) -> Result<Self, SchemaError> {
        let invalid = |e: serde_json::Error| SchemaError::InvalidProperties {
            step_type: kind.to_string(),
            message: e.to_string(),
        };
        let config = match kind {
            TriggerKind::Manual => {
                TriggerConfig::Manual(serde_json::from_value(properties).map_err(invalid)?)
            }
            TriggerKind::Interval => {
                TriggerConfig::Interval(serde_json::from_value(properties).map_err(invalid)?)
            }
            TriggerKind::Alert => {
                TriggerConfig::Alert(serde_json::from_value(properties).map_err(invalid)?)
            }
            TriggerKind::Incident => {
                TriggerConfig::Incident(serde_json::from_value(properties).map_err(invalid)?)
            }
        };
        Ok(config)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// Interval payloads arrive either as numbers or as numeric strings ("300").
fn seconds_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) if s.trim().is_empty() => Ok(0),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number of seconds", s))),
    }
}
