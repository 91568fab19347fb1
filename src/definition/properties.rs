use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trigger::{
    AlertTrigger, IncidentTrigger, IntervalTrigger, ManualTrigger, TriggerConfig, TriggerKind,
};

/// One optional slot per trigger kind, so a kind can never be configured twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual: Option<ManualTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident: Option<IncidentTrigger>,
}

impl TriggerSet {
    pub fn get(&self, kind: TriggerKind) -> Option<TriggerConfig> {
        match kind {
            TriggerKind::Manual => self.manual.clone().map(TriggerConfig::Manual),
            TriggerKind::Interval => self.interval.clone().map(TriggerConfig::Interval),
            TriggerKind::Alert => self.alert.clone().map(TriggerConfig::Alert),
            TriggerKind::Incident => self.incident.clone().map(TriggerConfig::Incident),
        }
    }

    pub fn contains(&self, kind: TriggerKind) -> bool {
        match kind {
            TriggerKind::Manual => self.manual.is_some(),
            TriggerKind::Interval => self.interval.is_some(),
            TriggerKind::Alert => self.alert.is_some(),
            TriggerKind::Incident => self.incident.is_some(),
        }
    }

    /// Stores `config` in its slot and returns whatever occupied it before.
    pub fn insert(&mut self, config: TriggerConfig) -> Option<TriggerConfig> {
        let previous = self.remove(config.kind());
        match config {
            TriggerConfig::Manual(c) => self.manual = Some(c),
            TriggerConfig::Interval(c) => self.interval = Some(c),
            TriggerConfig::Alert(c) => self.alert = Some(c),
            TriggerConfig::Incident(c) => self.incident = Some(c),
        }
        previous
    }

    pub fn remove(&mut self, kind: TriggerKind) -> Option<TriggerConfig> {
        match kind {
            TriggerKind::Manual => self.manual.take().map(TriggerConfig::Manual),
            TriggerKind::Interval => self.interval.take().map(TriggerConfig::Interval),
            TriggerKind::Alert => self.alert.take().map(TriggerConfig::Alert),
            TriggerKind::Incident => self.incident.take().map(TriggerConfig::Incident),
        }
    }

    /// Configured triggers in canonical kind order.
    pub fn configs(&self) -> Vec<TriggerConfig> {
        TriggerKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        TriggerKind::ALL
            .into_iter()
            .filter(|kind| self.contains(*kind))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<TriggerConfig> for TriggerSet {
    fn from_iter<I: IntoIterator<Item = TriggerConfig>>(iter: I) -> Self {
        let mut set = TriggerSet::default();
        for config in iter {
            set.insert(config);
        }
        set
    }
}

/// Workflow-level metadata plus the configured triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub consts: BTreeMap<String, String>,
    #[serde(flatten)]
    pub triggers: TriggerSet,
}

impl Properties {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_trigger(mut self, config: TriggerConfig) -> Self {
        self.triggers.insert(config);
        self
    }
}
