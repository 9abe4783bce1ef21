//! Command-line interface for loading Open Library dumps into a catalogue.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod ingest;

pub use error::CliError;

use ingest::IngestArgs;

pub(crate) const ARG_AUTHORS_DUMP: &str = "authors-dump";
pub(crate) const ARG_WORKS_DUMP: &str = "works-dump";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ENV_AUTHORS_DUMP: &str = "SHELFLOAD_CMDS_INGEST_AUTHORS_DUMP";
pub(crate) const ENV_WORKS_DUMP: &str = "SHELFLOAD_CMDS_INGEST_WORKS_DUMP";
pub(crate) const ENV_DATABASE: &str = "SHELFLOAD_CMDS_INGEST_DATABASE";

/// Run the shelfload CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => {
            let mut stdout = std::io::stdout().lock();
            ingest::run_ingest(args, &mut stdout)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "shelfload",
    about = "Load Open Library author and work dumps into a local catalogue",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the authors dump, then the works dump, into the catalogue.
    Ingest(IngestArgs),
}

#[cfg(test)]
mod tests;
