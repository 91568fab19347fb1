use clap::{Parser, ValueEnum};
use flowsmith::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionCli {
    Tb,
    Lr,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitCli {
    /// The laid-out node/edge graph as JSON
    Graph,
    /// The definition rederived from the graph as JSON
    Definition,
    /// The validation report as text
    Report,
}

/// Compiles a workflow definition into its editable graph, lays it out and validates it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow definition JSON file
    definition_path: String,

    /// Optional path to the provider catalog JSON file
    #[arg(short, long)]
    catalog: Option<String>,

    /// Optional path to an editor config JSON file
    #[arg(long)]
    config: Option<String>,

    /// Layout direction, overriding the config file
    #[arg(short, long, value_enum)]
    direction: Option<DirectionCli>,

    /// What to print
    #[arg(short, long, value_enum, default_value = "report")]
    emit: EmitCli,

    /// Log every compile, decompile and layout step
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let total_start = Instant::now();

    // --- 1. Loading ---
    let definition_json = fs::read_to_string(&cli.definition_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read definition file '{}': {}",
            &cli.definition_path, e
        ))
    });
    let definition = definition_json
        .as_str()
        .into_definition()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse definition: {}", e)));

    let catalog = match &cli.catalog {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read catalog file '{}': {}", path, e))
            });
            ProviderCatalog::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse catalog: {}", e)))
        }
        None => ProviderCatalog::default(),
    };

    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            EditorConfig::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse config: {}", e)))
        }
        None => EditorConfig::default(),
    };
    if let Some(direction) = cli.direction {
        config.direction = match direction {
            DirectionCli::Tb => Direction::TopBottom,
            DirectionCli::Lr => Direction::LeftRight,
        };
    }

    // --- 2. Compile, validate and lay out ---
    let mut editor = Editor::builder(definition)
        .with_catalog(catalog)
        .with_config(config)
        .try_build()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build the graph: {}", e)));
    editor.layout();

    // --- 3. Output ---
    match cli.emit {
        EmitCli::Graph => print_json(editor.graph()),
        EmitCli::Definition => print_json(editor.definition()),
        EmitCli::Report => {
            let graph = editor.graph();
            println!(
                "Workflow '{}': {} nodes, {} edges",
                editor.definition().properties.name,
                graph.nodes.len(),
                graph.edges.len()
            );
            print!("{}", editor.report());
        }
    }

    tracing::debug!(elapsed = ?total_start.elapsed(), "done");

    if !editor.is_deployable() {
        eprintln!("\nWorkflow is not deployable.");
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize output: {}", e)));
    println!("{}", json);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
