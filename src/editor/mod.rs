//! The structural mutation engine.
//!
//! An [`Editor`] owns the document (graph, derived definition, validation
//! report) and is the only way to change it. Every command either commits a
//! complete, invariant-respecting result or returns an error and leaves the
//! document exactly as it was: edits are applied to a working copy of the
//! graph, and the copy replaces the document's graph only once every check
//! has passed.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowsmith::prelude::*;
//! use serde_json::json;
//!
//! let definition = Definition::new(
//!     Properties::new("nightly-report").with_trigger(TriggerConfig::default_for(TriggerKind::Manual)),
//!     vec![],
//! );
//! let mut editor = Editor::builder(definition).build();
//!
//! let id = editor
//!     .insert_between(
//!         &Anchor::node(END_ID),
//!         &json!({ "componentType": "task", "type": "action-slack", "name": "notify" }),
//!     )
//!     .expect("insert");
//! editor.layout();
//! println!("{} -> {}", id, editor.definition().sequence.len());
//! ```

mod connect;
mod delete;
mod insert;
mod observer;
mod rules;

pub use observer::*;

use ahash::AHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::compiler::Compiler;
use crate::config::EditorConfig;
use crate::decompiler::decompile;
use crate::definition::{Definition, Properties, parse_step};
use crate::error::{EditError, StructuralError};
use crate::graph::{Graph, NodeKind, Position};
use crate::layout::{LayeredLayout, LayoutEngine, layout};
use crate::validation::{ProviderCatalog, ValidationReport, Validator};

/// Where an insertion goes: onto an edge, or onto the single edge leading into a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Node(String),
    Edge(String),
}

impl Anchor {
    pub fn node(id: &str) -> Self {
        Anchor::Node(id.to_string())
    }

    pub fn edge(id: &str) -> Self {
        Anchor::Edge(id.to_string())
    }
}

/// Everything an editor keeps in sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub graph: Graph,
    /// Always the decompilation of `graph`.
    pub definition: Definition,
    /// Always the validation of `definition`.
    pub report: ValidationReport,
    /// Set by every structural change, cleared by [`Editor::layout`].
    pub layout_stale: bool,
}

enum Source {
    Definition(Definition),
    Graph(Graph, Properties),
}

pub struct EditorBuilder {
    source: Source,
    catalog: ProviderCatalog,
    config: EditorConfig,
    layout_engine: Box<dyn LayoutEngine>,
    observers: Vec<Box<dyn EditObserver>>,
}

impl EditorBuilder {
    fn new(source: Source) -> Self {
        Self {
            source,
            catalog: ProviderCatalog::default(),
            config: EditorConfig::default(),
            layout_engine: Box::new(LayeredLayout::default()),
            observers: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: ProviderCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout_engine(mut self, engine: Box<dyn LayoutEngine>) -> Self {
        self.layout_engine = engine;
        self
    }

    pub fn with_observer(mut self, observer: impl EditObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Like [`build`](Self::build), but refuses a definition whose compiled
    /// graph breaks the graph invariants (duplicate ids, or ids taken by a
    /// sentinel or a trigger kind). A graph source is taken as is, since it
    /// may be mid-edit.
    pub fn try_build(self) -> Result<Editor, EditError> {
        let from_definition = matches!(self.source, Source::Definition(_));
        let editor = self.build();
        if from_definition {
            editor.graph().check_invariants()?;
        }
        Ok(editor)
    }

    pub fn build(self) -> Editor {
        let compiler = Compiler::new(self.config.origin);
        let validator = Validator::new(self.catalog);

        let (graph, definition) = match self.source {
            Source::Definition(definition) => {
                let graph = compiler.compile_definition(&definition);
                let definition = decompile(&graph, &definition.properties);
                (graph, definition)
            }
            Source::Graph(graph, properties) => {
                let definition = decompile(&graph, &properties);
                (graph, definition)
            }
        };
        let report = validator.validate(&definition);

        Editor {
            document: Document {
                graph,
                definition,
                report,
                layout_stale: true,
            },
            config: self.config,
            compiler,
            validator,
            layout_engine: self.layout_engine,
            observers: self.observers,
        }
    }
}

pub struct Editor {
    document: Document,
    config: EditorConfig,
    compiler: Compiler,
    validator: Validator,
    layout_engine: Box<dyn LayoutEngine>,
    observers: Vec<Box<dyn EditObserver>>,
}

impl Editor {
    pub fn builder(definition: Definition) -> EditorBuilder {
        EditorBuilder::new(Source::Definition(definition))
    }

    /// Starts from an existing graph, which may be in the middle of an edit.
    pub fn builder_from_graph(graph: Graph, properties: Properties) -> EditorBuilder {
        EditorBuilder::new(Source::Graph(graph, properties))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn graph(&self) -> &Graph {
        &self.document.graph
    }

    pub fn definition(&self) -> &Definition {
        &self.document.definition
    }

    pub fn report(&self) -> &ValidationReport {
        &self.document.report
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        self.validator.catalog()
    }

    pub fn is_deployable(&self) -> bool {
        self.document.report.is_deployable()
    }

    pub fn is_layout_stale(&self) -> bool {
        self.document.layout_stale
    }

    pub fn add_observer(&mut self, observer: impl EditObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replaces the fields of step `node_id` with those of `payload`.
    ///
    /// The payload goes through the same schema parsing as an insertion. The
    /// step keeps its id, its place in the graph and anything nested in it;
    /// its component type (and, for triggers, its kind) cannot change.
    pub fn update_step(&mut self, node_id: &str, payload: &Value) -> Result<(), EditError> {
        let step = parse_step(payload)?;

        let node = self
            .document
            .graph
            .node(node_id)
            .ok_or_else(|| StructuralError::NodeNotFound(node_id.to_string()))?;
        let existing = match &node.kind {
            NodeKind::Step { step } => step,
            NodeKind::ContainerEnd { owner } => {
                return Err(StructuralError::BoundaryNode {
                    node_id: node_id.to_string(),
                    owner_id: owner.clone(),
                }
                .into());
            }
            _ => return Err(StructuralError::ProtectedNode(node_id.to_string()).into()),
        };
        if existing.component_type() != step.component_type() {
            return Err(StructuralError::ComponentChange {
                node_id: node_id.to_string(),
                from: existing.component_type().to_string(),
                to: step.component_type().to_string(),
            }
            .into());
        }
        if existing.trigger_kind() != step.trigger_kind() {
            return Err(StructuralError::ComponentChange {
                node_id: node_id.to_string(),
                from: existing.step_type.clone(),
                to: step.step_type.clone(),
            }
            .into());
        }

        let mut updated = step.shallow();
        updated.id = existing.id.clone();

        let mut graph = self.document.graph.clone();
        if let Some(slot) = graph.node_mut(node_id).and_then(|n| n.step_mut()) {
            *slot = updated;
        }
        let properties = self.document.definition.properties.clone();
        self.commit(
            graph,
            properties,
            EditEvent::StepUpdated {
                node_id: node_id.to_string(),
            },
        );
        Ok(())
    }

    /// Edits workflow metadata. Trigger configuration is owned by the trigger
    /// nodes, so changes to it made here are overwritten from the graph.
    pub fn update_properties(&mut self, edit: impl FnOnce(&mut Properties)) {
        let mut properties = self.document.definition.properties.clone();
        edit(&mut properties);
        let graph = self.document.graph.clone();
        self.commit(graph, properties, EditEvent::PropertiesUpdated);
    }

    /// Rebuilds the graph from a definition changed outside the editor.
    ///
    /// Nodes keep their position and draggability when a node with the same
    /// id, or failing that a step with the same name, existed before. A
    /// definition that compiles to an unsound graph is rejected and the
    /// document is left as it was.
    pub fn replace_definition(&mut self, definition: Definition) -> Result<(), EditError> {
        let mut graph = self.compiler.compile_definition(&definition);
        graph.check_invariants()?;

        let old = &self.document.graph;
        let by_id: AHashMap<&str, (Position, bool)> = old
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), (n.position, n.draggable)))
            .collect();
        let by_name: AHashMap<&str, (Position, bool)> = old
            .nodes
            .iter()
            .filter_map(|n| {
                let name = n.step()?.name.as_str();
                (!name.trim().is_empty()).then_some((name, (n.position, n.draggable)))
            })
            .collect();

        for node in &mut graph.nodes {
            let carried = by_id.get(node.id.as_str()).or_else(|| {
                node.step()
                    .and_then(|step| by_name.get(step.name.as_str()))
            });
            if let Some((position, draggable)) = carried {
                node.position = *position;
                node.draggable = *draggable;
            }
        }

        self.commit(graph, definition.properties, EditEvent::Reloaded);
        Ok(())
    }

    /// Swaps the provider catalog and revalidates.
    pub fn set_catalog(&mut self, catalog: ProviderCatalog) {
        self.validator.set_catalog(catalog);
        self.document.report = self.validator.validate(&self.document.definition);
        self.notify(&EditEvent::CatalogChanged);
    }

    /// Repositions every node with the configured layout engine.
    pub fn layout(&mut self) {
        self.document.graph = layout(
            &self.document.graph,
            self.config.direction,
            self.layout_engine.as_ref(),
        );
        self.document.layout_stale = false;
        self.notify(&EditEvent::LaidOut);
    }

    /// Installs `graph` as the new document state and rederives everything from it.
    fn commit(&mut self, graph: Graph, properties: Properties, event: EditEvent) {
        self.document.definition = decompile(&graph, &properties);
        self.document.graph = graph;
        self.document.report = self.validator.validate(&self.document.definition);
        self.document.layout_stale = true;

        tracing::info!(
            ?event,
            nodes = self.document.graph.nodes.len(),
            edges = self.document.graph.edges.len(),
            deployable = self.document.report.is_deployable(),
            "committed edit"
        );
        self.notify(&event);
    }

    fn notify(&mut self, event: &EditEvent) {
        for observer in &mut self.observers {
            observer.on_edit(event, &self.document);
        }
    }
}
