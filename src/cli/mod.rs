//! CLI commands for alfred-workflow.
//!
//! Authoring tooling only; script filters use [`crate::Runner`] directly.

pub mod pack;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "alfred-workflow")]
#[command(about = "Authoring tools for Alfred workflows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Package snippets from a TOML file into an .alfredsnippets archive
    Pack {
        /// TOML file with [[snippet]] tables
        source: PathBuf,

        /// Archive name (defaults to the source file stem)
        #[arg(long)]
        name: Option<String>,

        /// Output directory (default: current directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Text the host puts before every keyword
        #[arg(long, default_value = "")]
        prefix: String,

        /// Text the host puts after every keyword
        #[arg(long, default_value = "")]
        suffix: String,

        /// PNG icon for the pack
        #[arg(long)]
        icon: Option<PathBuf>,
    },
}

/// Parse the process arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Pack {
            source,
            name,
            out,
            prefix,
            suffix,
            icon,
        } => {
            pack::run_pack(&pack::PackOptions {
                source,
                name,
                out,
                prefix,
                suffix,
                icon,
            })?;
        }
    }
    Ok(())
}
