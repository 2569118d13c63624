//! Gluer CLI: the `gluer` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Vector { case, config, json } => commands::vector::run(case, config, json),

        Commands::Config { config, json } => commands::config::run(config, json),
    }
}
