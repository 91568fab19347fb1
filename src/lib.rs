//! # Flowsmith - Workflow Builder Core
//!
//! **Flowsmith** keeps two representations of an automation workflow in sync:
//! the declarative [`Definition`](definition::Definition) (trigger properties
//! plus an ordered, nested step sequence) that is stored and executed
//! elsewhere, and the editable node/edge [`Graph`](graph::Graph) a user works
//! on in a visual builder.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Definition**: Deserialize it from JSON, or implement the `IntoDefinition` trait for your own format.
//! 2.  **Open an Editor**: `Editor::builder(definition)` compiles the definition into a graph and validates it.
//! 3.  **Edit**: `insert_between`, `delete_nodes` and `connect` change the graph structurally. Every committed edit rederives the definition and the validation report; a rejected one leaves everything untouched.
//! 4.  **Lay Out and Check**: `layout()` positions the nodes; `report()` says whether the workflow can be deployed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowsmith::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let definition = Definition::from_json(&std::fs::read_to_string("workflow.json")?)?;
//!     let catalog = ProviderCatalog::from_json(&std::fs::read_to_string("catalog.json")?)?;
//!
//!     let mut editor = Editor::builder(definition)
//!         .with_catalog(catalog)
//!         .with_config(EditorConfig::default().with_direction(Direction::LeftRight))
//!         .with_observer(|event: &EditEvent, document: &Document| {
//!             println!("{:?}: {} nodes", event, document.graph.nodes.len());
//!         })
//!         .build();
//!
//!     // Add a manual trigger, then a notification at the end of the workflow.
//!     editor.insert_between(
//!         &Anchor::node(TRIGGER_END_ID),
//!         &json!({ "componentType": "trigger", "type": "manual" }),
//!     )?;
//!     let notify = editor.insert_between(
//!         &Anchor::node(END_ID),
//!         &json!({
//!             "componentType": "task",
//!             "type": "action-slack",
//!             "name": "notify",
//!             "properties": { "config": "{{ providers.slack-prod }}", "with": { "message": "done" } }
//!         }),
//!     )?;
//!
//!     editor.layout();
//!     for finding in editor.report().for_step("notify") {
//!         println!("{}", finding);
//!     }
//!
//!     editor.delete_nodes(&notify)?;
//!     println!("{}", serde_json::to_string_pretty(editor.definition())?);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod decompiler;
pub mod definition;
pub mod editor;
pub mod error;
pub mod graph;
pub mod layout;
pub mod prelude;
pub mod validation;
