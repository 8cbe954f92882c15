//! Error types emitted by the osmtidy CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use osmtidy_data::{CleanError, OverridesError, SourceError};
use thiserror::Error;

/// Errors emitted by the osmtidy CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The override file could not be loaded.
    #[error(transparent)]
    LoadOverrides(#[from] OverridesError),
    /// The compiled-in override tables failed to parse.
    #[error("failed to parse the built-in override tables: {0}")]
    BuiltInOverrides(#[source] serde_json::Error),
    /// Auditing the document failed.
    #[error("failed to audit document: {0}")]
    Audit(#[from] SourceError),
    /// The cleaning run failed; nothing was committed.
    #[error("failed to clean document: {0}")]
    Clean(#[from] CleanError),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
