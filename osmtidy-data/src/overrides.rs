//! Manual correction tables stored as JSON.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use osmtidy_core::OverrideTables;
use thiserror::Error;

use crate::fs::open_utf8_file;

/// Override tables compiled in for the Curitiba extract.
pub const CURITIBA_OVERRIDES: &str = include_str!("../overrides/curitiba.json");

/// Errors raised while loading an override file.
#[derive(Debug, Error)]
pub enum OverridesError {
    /// The file could not be read.
    #[error("failed to read override file {path}")]
    Read {
        /// Override file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid override document.
    #[error("invalid override document {path}")]
    Parse {
        /// Override file path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

/// Load override tables from a JSON document on disk.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use osmtidy_core::CleaningConfig;
/// use osmtidy_data::load_override_tables;
///
/// # fn main() -> Result<(), osmtidy_data::OverridesError> {
/// let tables = load_override_tables(Utf8Path::new("overrides/curitiba.json"))?;
/// let config = CleaningConfig::with_overrides(tables);
/// assert!(!config.street.overrides.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn load_override_tables(path: &Utf8Path) -> Result<OverrideTables, OverridesError> {
    let read_error = |source| OverridesError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut contents = String::new();
    open_utf8_file(path)
        .map_err(read_error)?
        .read_to_string(&mut contents)
        .map_err(read_error)?;
    serde_json::from_str(&contents).map_err(|source| OverridesError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// The compiled-in Curitiba override tables.
///
/// # Examples
/// ```
/// let tables = osmtidy_data::curitiba_overrides()?;
/// assert_eq!(
///     tables.street.get("Filipinas").map(String::as_str),
///     Some("Rua Filipinas")
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn curitiba_overrides() -> Result<OverrideTables, serde_json::Error> {
    serde_json::from_str(CURITIBA_OVERRIDES)
}
