//! Audit passes over a document on disk.
//!
//! [`audit_document`] runs both audits in one pass. The single-audit passes
//! are kept for callers that only need one of the maps.

use camino::Utf8Path;
use log::info;
use osmtidy_core::{
    AuditReport, CleaningConfig, CorrectionMap, DocumentAuditor, ElementKind, PostcodeAuditor,
    PostcodeRules, StreetNameAuditor, StreetRules, street::StreetProblems,
};

use crate::{SourceError, open_elements};

/// Run the street and postal code audits in one pass.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use osmtidy_core::CleaningConfig;
/// use osmtidy_data::audit_document;
///
/// # fn main() -> Result<(), osmtidy_data::SourceError> {
/// let report = audit_document(Utf8Path::new("curitiba.osm"), &CleaningConfig::default())?;
/// for (raw, fixed) in report.corrections.streets.iter() {
///     println!("{raw} => {fixed}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn audit_document(
    path: &Utf8Path,
    config: &CleaningConfig,
) -> Result<AuditReport, SourceError> {
    let mut auditor = DocumentAuditor::new(config);
    for element in open_elements(path, &ElementKind::SHAPED)? {
        auditor.observe(&element?);
    }
    let observed = auditor.observed();
    let report = auditor.finish();
    info!(
        "audited {observed} elements in {path}: {} street and {} postal code corrections",
        report.corrections.streets.len(),
        report.corrections.postcodes.len()
    );
    Ok(report)
}

/// Street audit alone: the bucketed problems and the correction map.
pub fn audit_street_names(
    path: &Utf8Path,
    rules: &StreetRules,
) -> Result<(StreetProblems, CorrectionMap), SourceError> {
    let mut auditor = StreetNameAuditor::new(rules);
    for element in open_elements(path, &ElementKind::SHAPED)? {
        auditor.observe(&element?);
    }
    let problems = auditor.problems().clone();
    let corrections = auditor.into_corrections();
    info!(
        "street audit of {path}: {} unexpected street types, {} corrections",
        problems.len(),
        corrections.len()
    );
    Ok((problems, corrections))
}

/// Postal code audit alone.
pub fn audit_postcodes(
    path: &Utf8Path,
    rules: &PostcodeRules,
) -> Result<CorrectionMap, SourceError> {
    let mut auditor = PostcodeAuditor::new(rules);
    for element in open_elements(path, &ElementKind::SHAPED)? {
        auditor.observe(&element?);
    }
    let corrections = auditor.into_corrections();
    info!(
        "postal code audit of {path}: {} corrections",
        corrections.len()
    );
    Ok(corrections)
}
