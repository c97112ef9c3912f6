//! kgraph
//!
//! Turns per-unit AST dumps of a C++ project into a knowledge graph of
//! classes, methods, functions and their calls.
//!
//! ## Usage
//!
//! ```text
//! kgraph extract build/dumps --project-root . -o analysis.json
//! kgraph build analysis.json --format graphml --cypher graph.cypher --render graph.dot
//! kgraph summary analysis.json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;

use cli::Cli;
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::resolve(cli.config.as_deref())?;
    commands::execute(cli.command, &config)
}
