//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowsmith crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowsmith::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition_json = std::fs::read_to_string("path/to/workflow.json")?;
//! let definition = definition_json.as_str().into_definition()?;
//!
//! let graph = compile(&definition.sequence, &definition.properties, Position::default());
//! let round_trip = decompile(&graph, &definition.properties);
//! assert_eq!(round_trip, definition);
//!
//! let report = validate(&definition, &ProviderCatalog::default());
//! println!("deployable: {}", report.is_deployable());
//! # Ok(())
//! # }
//! ```

// Definition model
pub use crate::definition::{
    Branch, Component, ComponentType, Condition, Definition, IntoDefinition, Properties, Step,
    TaskProperties, TriggerConfig, TriggerKind, parse_step,
};

// Graph model and conversions
pub use crate::compiler::{Compiler, compile};
pub use crate::decompiler::decompile;
pub use crate::graph::{
    END_ID, Edge, Graph, Lane, Node, NodeKind, Position, START_ID, Scope, TRIGGER_END_ID,
    TRIGGER_START_ID,
};

// Editing
pub use crate::config::EditorConfig;
pub use crate::editor::{Anchor, Document, EditEvent, EditObserver, Editor};

// Validation and layout
pub use crate::layout::{Direction, LayeredLayout, LayoutEngine, layout};
pub use crate::validation::{
    Finding, FindingTarget, ProviderCatalog, ProviderSpec, Severity, ValidationReport, Validator,
    validate,
};

// Error types
pub use crate::error::{EditError, PlacementRule, SchemaError, StructuralError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
