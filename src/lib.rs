//! Facade crate for the osmtidy OpenStreetMap cleaner.
//!
//! This crate re-exports the audit and shaping types and exposes the
//! document reader and SQLite sink behind the `store-sqlite` feature.

#![forbid(unsafe_code)]

pub use osmtidy_core::{
    AuditReport, CleaningConfig, Correction, CorrectionMap, Corrections, DocumentAuditor,
    ElementKind, ElementShaper, OverrideTables, PostcodeAuditor, PostcodeRules, RawElement,
    RelationalSink, Shaped, ShapedElement, StreetNameAuditor, StreetRules, Tag,
    TagKeyClassifier,
};

#[cfg(feature = "store-sqlite")]
pub use osmtidy_data::{
    CleanError, CleanSummary, SqliteSink, SqliteSinkError, audit_document, clean_document,
    clean_to_sqlite, curitiba_overrides, load_override_tables,
};
