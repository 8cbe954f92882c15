//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use env_logger::Env;
use osmtidy_cli::CliError;

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match osmtidy_cli::run() {
        Ok(()) => Ok(()),
        // Help and version requests surface as clap errors; let clap print them.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => Err(err.into()),
    }
}
