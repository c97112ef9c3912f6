mod build;
mod extract;
mod summary;

use crate::cli::Command;
use crate::config::Config;
use anyhow::Result;

pub fn execute(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Extract(args) => extract::run(args, &config.extract),
        Command::Build(args) => build::run(args, config),
        Command::Summary(args) => summary::run(&args),
    }
}
