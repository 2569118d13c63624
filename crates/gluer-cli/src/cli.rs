use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gluer",
    about = "Gluer: runtime trait and implementation-factory contract checks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one conformance vector and print its outcome
    Vector {
        /// Path to the vector case JSON
        case: String,

        /// Gluer config TOML; overrides the case's own config
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved gluer config
    Config {
        /// Gluer config TOML (defaults apply when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
