//! CLI argument parsing with clap derive

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ScopeMode;

/// Build knowledge graphs of C++ code from per-unit AST dumps
#[derive(Parser)]
#[command(name = "kgraph", version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML file with defaults for every subcommand
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract classes, functions and calls into an analysis file
    Extract(ExtractArgs),

    /// Assemble the knowledge graph from an analysis file and export it
    Build(BuildArgs),

    /// Print the human-readable listing of an analysis file
    Summary(SummaryArgs),
}

#[derive(Args)]
pub struct ExtractArgs {
    /// AST dump files, or directories scanned for `*.ast.json`
    pub inputs: Vec<PathBuf>,

    /// Root that recorded file paths are made relative to
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Which declarations count as part of the project
    #[arg(long, value_enum)]
    pub scope: Option<ScopeMode>,

    /// Analysis file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also print the listing to stdout
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Analysis file written by `kgraph extract`
    pub analysis: Option<PathBuf>,

    /// Output format: json, graphml, gexf or dot
    #[arg(short, long)]
    pub format: Option<String>,

    /// Graph file to write (default: `<analysis stem>_graph.<ext>`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write a Cypher script for a property-graph database
    #[arg(long, value_name = "FILE")]
    pub cypher: Option<PathBuf>,

    /// Start the Cypher script by deleting the existing graph
    #[arg(long)]
    pub clear: bool,

    /// Also write a styled Graphviz render plan
    #[arg(long, value_name = "FILE")]
    pub render: Option<PathBuf>,

    /// Print graph statistics as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Analysis file written by `kgraph extract`
    pub analysis: PathBuf,
}
