//! Definition to graph compilation.
//!
//! The compiler is pure: the same definition always yields the same graph,
//! every node placed at the configured origin and waiting for layout.

use crate::definition::{Definition, Properties, Step};
use crate::graph::{
    Graph, Lane, NodeKind, Position, Scope, END_ID, START_ID, TRIGGER_END_ID, TRIGGER_START_ID,
};

mod builder;

pub use builder::Link;
use builder::GraphBuilder;

pub struct Compiler {
    origin: Position,
}

pub struct CompilerBuilder {
    origin: Position,
}

impl CompilerBuilder {
    pub fn new() -> Self {
        Self {
            origin: Position::default(),
        }
    }

    /// Position every compiled node is placed at before layout.
    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            origin: self.origin,
        }
    }
}

impl Default for CompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        CompilerBuilder::new().build()
    }
}

impl Compiler {
    pub fn builder() -> CompilerBuilder {
        CompilerBuilder::new()
    }

    pub fn new(origin: Position) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    /// Compiles a step sequence and its trigger configuration into a graph.
    ///
    /// Node order is `start, trigger_start, triggers.., trigger_end`, then the
    /// main sequence in expansion order, then `end`.
    pub fn compile(&self, sequence: &[Step], properties: &Properties) -> Graph {
        let mut builder = GraphBuilder::new(self.origin);

        builder.push_node(START_ID, NodeKind::Start, None);
        builder.push_node(TRIGGER_START_ID, NodeKind::TriggerStart, None);
        builder.connect(vec![Link::new(START_ID, Lane::Trigger)], TRIGGER_START_ID);

        // Each trigger's pair of edges stays adjacent, in kind order.
        let configs = properties.triggers.configs();
        for config in &configs {
            let exits = builder.expand_step(
                &Step::trigger(config.clone()),
                vec![Link::new(TRIGGER_START_ID, Lane::Trigger)],
                None,
            );
            builder.connect(exits, TRIGGER_END_ID);
        }
        if configs.is_empty() {
            builder.connect(vec![Link::new(TRIGGER_START_ID, Lane::Trigger)], TRIGGER_END_ID);
        }
        builder.push_node(TRIGGER_END_ID, NodeKind::TriggerEnd, None);

        let open = builder.expand_sequence(
            sequence,
            vec![Link::new(TRIGGER_END_ID, Lane::Main)],
            None,
        );
        builder.push_node(END_ID, NodeKind::End, None);
        builder.connect(open, END_ID);

        let mut graph = Graph::new(builder.nodes, builder.edges);
        graph.order_branch_edges();
        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "compiled definition"
        );
        graph
    }

    pub fn compile_definition(&self, definition: &Definition) -> Graph {
        self.compile(&definition.sequence, &definition.properties)
    }

    /// Compiles a single step into a splice-ready fragment.
    ///
    /// The first edge of the fragment is always `incoming` closed onto the
    /// step itself; every exit of the step is wired to `exit`. Nested nodes get
    /// scopes relative to `scope`.
    pub fn compile_fragment(
        &self,
        step: &Step,
        incoming: Link,
        exit: &str,
        scope: Option<&Scope>,
    ) -> Graph {
        let mut builder = GraphBuilder::new(self.origin);
        let open = builder.expand_step(step, vec![incoming], scope);
        builder.connect(open, exit);

        let mut fragment = Graph::new(builder.nodes, builder.edges);
        fragment.order_branch_edges();
        fragment
    }
}

/// Compiles `sequence` with the default compiler placed at `origin`.
pub fn compile(sequence: &[Step], properties: &Properties, origin: Position) -> Graph {
    Compiler::new(origin).compile(sequence, properties)
}
