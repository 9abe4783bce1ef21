//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use shelfload_cli::{CliError, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("shelfload: {err}");
            std::process::exit(1);
        }
    }
}
