//! Audit and shaping engine for OpenStreetMap address data.
//!
//! The crate works on [`RawElement`] values produced by a streaming reader.
//! Two audits ([`StreetNameAuditor`] and [`PostcodeAuditor`]) scan the
//! document and build [`CorrectionMap`]s; the [`ElementShaper`] then applies
//! those maps while turning each element into relational rows for a
//! [`RelationalSink`].
//!
//! # Examples
//!
//! ```
//! use osmtidy_core::{CleaningConfig, DocumentAuditor, ElementKind, ElementShaper, RawElement};
//!
//! let config = CleaningConfig::default();
//! let node = RawElement::new(ElementKind::Node)
//!     .with_attribute("id", "1")
//!     .with_tag("addr:street", "Av. Brasil");
//!
//! let mut auditor = DocumentAuditor::new(&config);
//! auditor.observe(&node);
//! let report = auditor.finish();
//!
//! let shaper = ElementShaper::new(&config, &report.corrections);
//! let shaped = shaper.shape(&node)?.expect("nodes are shaped");
//! assert_eq!(shaped.element.tags()[0].value, "Avenida Brasil");
//! # Ok::<(), osmtidy_core::ShapeError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod audit;
mod config;
mod correction;
mod element;
mod key;
pub mod postcode;
pub mod schema;
pub mod shape;
pub mod sink;
pub mod street;
mod tag;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use audit::{AuditReport, Corrections, DocumentAuditor};
pub use config::{
    CleaningConfig, ConfigError, DEFAULT_EXPECTED_STREET_TYPES, DEFAULT_POSTCODE_PATTERN,
    DEFAULT_POSTCODE_RANGE, DEFAULT_STREET_SYNONYMS, OverrideTables, PostcodeRules,
    SpecialOverrides, StreetRules,
};
pub use correction::{Correction, CorrectionMap, INVALID_MARKER};
pub use element::{ElementKind, RawElement, RawTag};
pub use key::{ClassifiedKey, DEFAULT_DISALLOWED_CHARS, DEFAULT_NAMESPACE, TagKeyClassifier};
pub use postcode::{PostcodeAuditor, PostcodeVerdict};
pub use schema::{SchemaProblem, SchemaViolation};
pub use shape::{
    AttributeRow, ElementRef, ElementShaper, NodeRecord, ShapeError, Shaped, ShapedElement,
    WayRecord,
};
pub use sink::RelationalSink;
pub use street::StreetNameAuditor;
pub use tag::{ElementId, Membership, Tag};
