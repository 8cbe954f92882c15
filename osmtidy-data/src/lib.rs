//! Document access and persistence for osmtidy.
//!
//! Responsibilities:
//! - Stream raw elements out of OSM XML documents, plain or bzip2.
//! - Run the audit passes and the shaping pass over a document on disk.
//! - Persist shaped rows to SQLite.
//! - Load manual override tables.
//!
//! Boundaries:
//! - Audit and shaping rules live in `osmtidy-core`.
//!
//! Invariants:
//! - Memory stays bounded by the largest single element, not the document.
//! - A failed run never leaves partially written tables behind.

mod audit;
pub mod fs;
mod overrides;
mod pipeline;
mod source;
mod sqlite;

pub use audit::{audit_document, audit_postcodes, audit_street_names};
pub use overrides::{CURITIBA_OVERRIDES, OverridesError, curitiba_overrides, load_override_tables};
pub use pipeline::{CleanError, CleanSummary, clean_document, clean_to_sqlite, shape_document};
pub use source::{DocumentReader, ElementStream, SourceError, open_elements};
pub use sqlite::{SqliteSink, SqliteSinkError, open_database};
