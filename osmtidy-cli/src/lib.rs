//! Command-line interface for auditing and cleaning OSM XML extracts.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use osmtidy_core::CleaningConfig;
use osmtidy_data::{curitiba_overrides, fs::file_is_file, load_override_tables};

mod audit;
mod clean;
mod error;

use audit::{AuditArgs, run_audit};
use clean::{CleanArgs, run_clean};
pub use error::CliError;

pub(crate) const ARG_OSM_XML: &str = "osm-xml";
pub(crate) const ARG_OVERRIDES: &str = "overrides";
pub(crate) const ARG_HIGHLIGHT_UNCHANGED: &str = "highlight-unchanged";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_VALIDATE: &str = "validate";
pub(crate) const ENV_AUDIT_OSM_XML: &str = "OSMTIDY_CMDS_AUDIT_OSM_XML";
pub(crate) const ENV_CLEAN_OSM_XML: &str = "OSMTIDY_CMDS_CLEAN_OSM_XML";
pub(crate) const DEFAULT_DATABASE: &str = "osm.db";

/// Run the osmtidy CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Audit(args) => run_audit(args, &mut stdout),
        Command::Clean(args) => run_clean(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "osmtidy",
    about = "Audit and clean OpenStreetMap XML extracts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the street name and postal code corrections for a document.
    Audit(AuditArgs),
    /// Load a cleaned document into a SQLite database.
    Clean(CleanArgs),
}

/// Cleaning rules for a run.
///
/// An override file replaces the compiled-in Curitiba tables rather than
/// extending them.
pub(crate) fn cleaning_config(
    overrides: Option<&Utf8Path>,
    validate_schema: bool,
) -> Result<CleaningConfig, CliError> {
    let tables = match overrides {
        Some(path) => load_override_tables(path)?,
        None => curitiba_overrides().map_err(CliError::BuiltInOverrides)?,
    };
    let mut config = CleaningConfig::with_overrides(tables);
    config.validate_schema = validate_schema;
    Ok(config)
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
