use super::Definition;
use crate::error::SchemaError;

/// A trait for external workflow formats that can be converted into a `Definition`.
///
/// Loaders for concrete file formats live outside this crate. By implementing
/// this trait on their own parsed structures they hand the editor a typed
/// definition without the core knowing anything about the textual format.
///
/// # Example
///
/// ```rust,no_run
/// use flowsmith::definition::{Definition, IntoDefinition, Properties, Step, TaskProperties};
/// use flowsmith::error::SchemaError;
///
/// struct MyWorkflow { name: String, actions: Vec<(String, String)> }
///
/// impl IntoDefinition for MyWorkflow {
///     fn into_definition(self) -> Result<Definition, SchemaError> {
///         let sequence = self
///             .actions
///             .into_iter()
///             .map(|(id, provider)| {
///                 Step::task(&id, &id, &format!("action-{}", provider), TaskProperties::default())
///             })
///             .collect();
///         Ok(Definition { properties: Properties::new(&self.name), sequence })
///     }
/// }
/// ```
pub trait IntoDefinition {
    /// Consumes the object and converts it into a workflow definition.
    fn into_definition(self) -> Result<Definition, SchemaError>;
}

impl IntoDefinition for Definition {
    fn into_definition(self) -> Result<Definition, SchemaError> {
        Ok(self)
    }
}

impl IntoDefinition for &str {
    /// Reads the JSON rendition of a definition.
    fn into_definition(self) -> Result<Definition, SchemaError> {
        serde_json::from_str(self).map_err(|e| SchemaError::JsonParseError(e.to_string()))
    }
}
