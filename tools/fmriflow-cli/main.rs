use clap::{Parser, Subcommand, ValueEnum};
use fmriflow::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// Build a pipeline graph and inspect it from the command line.
#[derive(Parser)]
#[command(name = "fmriflow-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    pipeline: PipelineCmd,

    /// Print the graph as Graphviz DOT text.
    #[arg(long)]
    dot: bool,

    /// Print the graph structure as JSON.
    #[arg(long)]
    json: bool,

    /// Save the wired graph as a binary artifact.
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

#[derive(Subcommand)]
enum PipelineCmd {
    /// Tissue segmentation preprocessing graph.
    Seg,
    /// Seed-based correlation analysis graph.
    Sca {
        /// Where seed time series are extracted.
        #[arg(long, value_enum, default_value_t = SpaceArg::Mni)]
        space: SpaceArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpaceArg {
    Native,
    Mni,
}

impl From<SpaceArg> for ExtractionSpace {
    fn from(arg: SpaceArg) -> Self {
        match arg {
            SpaceArg::Native => ExtractionSpace::Native,
            SpaceArg::Mni => ExtractionSpace::Mni,
        }
    }
}

#[derive(Serialize)]
struct NodeSummary<'a> {
    name: &'a str,
    interface: &'static str,
    command: Option<&'static str>,
    iter_fields: &'a [String],
    sweep: bool,
}

#[derive(Serialize)]
struct EdgeSummary<'a> {
    source: String,
    target: String,
    transform: Option<&'a EdgeTransform>,
}

#[derive(Serialize)]
struct GraphSummary<'a> {
    name: &'a str,
    nodes: Vec<NodeSummary<'a>>,
    edges: Vec<EdgeSummary<'a>>,
}

fn summarize(graph: &Graph) -> GraphSummary<'_> {
    GraphSummary {
        name: graph.name(),
        nodes: graph
            .nodes()
            .iter()
            .map(|node| NodeSummary {
                name: &node.name,
                interface: node.interface.kind(),
                command: node.interface.command(),
                iter_fields: &node.iter_fields,
                sweep: node.sweep,
            })
            .collect(),
        edges: graph
            .edges()
            .iter()
            .map(|edge| EdgeSummary {
                source: format!(
                    "{}.{}",
                    graph.node(edge.source.node).name, edge.source.port
                ),
                target: format!(
                    "{}.{}",
                    graph.node(edge.target.node).name, edge.target.port
                ),
                transform: edge.transform.as_ref(),
            })
            .collect(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let graph = match cli.pipeline {
        PipelineCmd::Seg => create_seg_preproc()?,
        PipelineCmd::Sca { space } => create_sca(space.into())?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summarize(&graph))?);
    } else if cli.dot {
        print!("{}", to_dot(&graph));
    } else {
        println!(
            "{}: {} nodes, {} edges",
            graph.name(),
            graph.nodes().len(),
            graph.edges().len()
        );
        for node in graph.nodes() {
            let map_note = if node.is_map() {
                format!(" [map over {}]", node.iter_fields.join(", "))
            } else if node.sweep {
                " [sweep]".to_string()
            } else {
                String::new()
            };
            println!("  {} ({}){}", node.name, node.interface, map_note);
        }
    }

    if let Some(path) = cli.save {
        graph.save(&path)?;
        eprintln!("saved graph artifact to {}", path.display());
    }

    Ok(())
}
