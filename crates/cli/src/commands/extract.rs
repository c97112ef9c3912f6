use crate::cli::ExtractArgs;
use crate::config::{ExtractConfig, ScopeMode, DEFAULT_ANALYSIS_FILE};
use anyhow::{bail, Context, Result};
use kgraph_extract::{
    absolute_path, extract_units, load_dumps, render_summary, write_analysis, Analysis, Scope,
};
use std::path::PathBuf;

pub fn run(args: ExtractArgs, config: &ExtractConfig) -> Result<()> {
    let inputs = if args.inputs.is_empty() {
        config.inputs.clone()
    } else {
        args.inputs
    };
    if inputs.is_empty() {
        bail!("no inputs: pass AST dump files or directories, or set [extract] inputs");
    }
    let project_root = match args.project_root.or_else(|| config.project_root.clone()) {
        Some(root) => absolute_path(&root),
        None => std::env::current_dir().context("failed to resolve the working directory")?,
    };
    let output = args
        .output
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ANALYSIS_FILE));
    let mode = args.scope.or(config.scope).unwrap_or_default();

    // Phase 1: load dumps
    let dumps = load_dumps(&inputs).context("failed to load AST dumps")?;

    // Phase 2: extract and merge
    let scope = match mode {
        ScopeMode::Units => Scope::files(dumps.iter().map(|dump| dump.unit.as_path())),
        ScopeMode::Project => Scope::directory(&project_root),
    };
    let extraction = extract_units(&dumps, &project_root, &scope);
    let analysis = Analysis::from_extraction(project_root.display().to_string(), &extraction);

    // Phase 3: write
    write_analysis(&output, &analysis)
        .with_context(|| format!("failed to write analysis to {}", output.display()))?;
    if analysis.best_effort {
        log::warn!("Some units reported parse errors; the analysis is best-effort");
    }

    if args.summary || config.summary {
        print!("{}", render_summary(&analysis));
    }
    println!(
        "Analysis written to {} ({} classes, {} functions from {} units)",
        output.display(),
        analysis.classes.len(),
        analysis.function_count(),
        dumps.len()
    );
    Ok(())
}
