use crate::cli::BuildArgs;
use crate::config::{Config, DEFAULT_ANALYSIS_FILE};
use anyhow::{Context, Result};
use kgraph_extract::read_analysis;
use kgraph_graph::{
    assemble_analysis, default_output_path, export_graph, render_dot, write_graph, CypherScript,
    GraphFormat, KnowledgeGraph,
};
use std::path::{Path, PathBuf};

pub fn run(args: BuildArgs, config: &Config) -> Result<()> {
    // Phase 1: validate options before touching any file
    let format: GraphFormat = args
        .format
        .as_deref()
        .or(config.graph.format.as_deref())
        .unwrap_or(GraphFormat::Json.as_str())
        .parse()?;
    let analysis_path = args
        .analysis
        .or_else(|| config.graph.analysis.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYSIS_FILE));
    let output = args
        .output
        .or_else(|| config.graph.output.clone())
        .unwrap_or_else(|| default_output_path(&analysis_path, format));

    // Phase 2: assemble and write
    let analysis = read_analysis(&analysis_path)
        .with_context(|| format!("failed to read analysis {}", analysis_path.display()))?;
    let graph = assemble_analysis(&analysis);
    write_graph(&graph, &output, format)
        .with_context(|| format!("failed to write graph to {}", output.display()))?;

    let stats = graph.stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Graph written to {}: {stats}", output.display());
    }

    // Phase 3: optional outputs
    if let Some(cypher) = args.cypher.or_else(|| config.export.cypher.clone()) {
        export_cypher(&graph, &cypher, args.clear || config.export.clear);
    } else if args.clear || config.export.clear {
        log::warn!("--clear has no effect without a Cypher export path");
    }

    if let Some(render) = args.render.or_else(|| config.render.output.clone()) {
        if render_dot(&graph, &render)
            .with_context(|| format!("failed to render graph to {}", render.display()))?
        {
            log::info!("Render plan written to {}", render.display());
        }
    }
    Ok(())
}

/// Export failures are reported and never undo the graph file already written.
fn export_cypher(graph: &KnowledgeGraph, path: &Path, clear: bool) {
    let mut script = CypherScript::new();
    let result = export_graph(graph, &mut script, clear).and_then(|_| script.write_to(path));
    if let Err(err) = result {
        log::error!("Graph export failed: {err}");
    }
}
