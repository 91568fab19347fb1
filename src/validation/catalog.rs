use serde::{Deserialize, Serialize};

use crate::definition::TaskKind;
use crate::error::SchemaError;

/// A parameter a provider accepts in a task's `with` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
        }
    }
}

/// What a provider type can do, and the parameters each capability takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub can_query: bool,
    #[serde(default)]
    pub can_notify: bool,
    #[serde(default)]
    pub query_params: Vec<ParamSpec>,
    #[serde(default)]
    pub notify_params: Vec<ParamSpec>,
}

impl ProviderSpec {
    pub fn new(provider_type: &str) -> Self {
        Self {
            provider_type: provider_type.to_string(),
            can_query: false,
            can_notify: false,
            query_params: Vec::new(),
            notify_params: Vec::new(),
        }
    }

    pub fn with_query(mut self, params: Vec<ParamSpec>) -> Self {
        self.can_query = true;
        self.query_params = params;
        self
    }

    pub fn with_notify(mut self, params: Vec<ParamSpec>) -> Self {
        self.can_notify = true;
        self.notify_params = params;
        self
    }

    pub fn supports(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Step => self.can_query,
            TaskKind::Action => self.can_notify,
        }
    }

    pub fn params(&self, kind: TaskKind) -> &[ParamSpec] {
        match kind {
            TaskKind::Step => &self.query_params,
            TaskKind::Action => &self.notify_params,
        }
    }
}

/// A configured instance of a provider type, referenced by name from task configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledProvider {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
}

/// Everything validation knows about the environment a workflow will run in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCatalog {
    #[serde(default)]
    pub providers: Vec<ProviderSpec>,
    #[serde(default)]
    pub installed: Vec<InstalledProvider>,
    /// Names of the secrets templates may reference.
    #[serde(default)]
    pub secrets: Vec<String>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::JsonParseError(e.to_string()))
    }

    pub fn with_provider(mut self, spec: ProviderSpec) -> Self {
        self.providers.push(spec);
        self
    }

    pub fn with_installed(mut self, name: &str, provider_type: &str) -> Self {
        self.installed.push(InstalledProvider {
            name: name.to_string(),
            provider_type: provider_type.to_string(),
        });
        self
    }

    pub fn with_secret(mut self, name: &str) -> Self {
        self.secrets.push(name.to_string());
        self
    }

    pub fn provider(&self, provider_type: &str) -> Option<&ProviderSpec> {
        self.providers
            .iter()
            .find(|p| p.provider_type == provider_type)
    }

    pub fn installed(&self, name: &str) -> Option<&InstalledProvider> {
        self.installed.iter().find(|p| p.name == name)
    }

    pub fn has_secret(&self, name: &str) -> bool {
        self.secrets.iter().any(|s| s == name)
    }
}
