use crate::cli::SummaryArgs;
use anyhow::{Context, Result};
use kgraph_extract::{read_analysis, render_summary};

pub fn run(args: &SummaryArgs) -> Result<()> {
    let analysis = read_analysis(&args.analysis)
        .with_context(|| format!("failed to read analysis {}", args.analysis.display()))?;
    print!("{}", render_summary(&analysis));
    Ok(())
}
