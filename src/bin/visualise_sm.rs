use anyhow::{Context, Result};
use clap::Parser;
use ftsm::graph::StateGraph;
use ftsm::loader::DefinitionLoader;
use std::path::PathBuf;
use tracing::{info, Level};

/// Render a state machine definition as a Graphviz DOT graph
#[derive(Parser, Debug)]
#[command(name = "visualise_sm")]
#[command(about = "Render a state machine definition as a Graphviz DOT graph", long_about = None)]
struct Cli {
    /// Path to a state machine definition file
    #[arg(short = 's', long = "sm-path", visible_alias = "sm_path")]
    sm_path: PathBuf,

    /// Path to a parent state machine definition file
    #[arg(short = 'p', long = "parent-sm-path", visible_alias = "parent_sm_path")]
    parent_sm_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let definition = match &cli.parent_sm_path {
        Some(parent) => DefinitionLoader::load_with_parent(&cli.sm_path, parent).with_context(|| {
            format!(
                "load {} on top of {}",
                cli.sm_path.display(),
                parent.display()
            )
        })?,
        None => DefinitionLoader::load(&cli.sm_path)
            .with_context(|| format!("load {}", cli.sm_path.display()))?,
    };

    let graph = StateGraph::from_definition(&definition);
    info!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        initial = graph.initial(),
        "rendering state graph"
    );
    print!("{}", graph.to_dot());
    Ok(())
}
