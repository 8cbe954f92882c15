//! Combined street and postal code audit over one element stream.

use crate::{
    CleaningConfig, CorrectionMap, PostcodeAuditor, RawElement, StreetNameAuditor,
    street::StreetProblems,
};

/// Correction maps consumed by the shaper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corrections {
    /// Street value corrections.
    pub streets: CorrectionMap,
    /// Postal code corrections.
    pub postcodes: CorrectionMap,
}

/// Everything a completed audit learned about the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Street values bucketed by their unexpected leading token.
    pub street_problems: StreetProblems,
    /// Correction maps for the shaping pass.
    pub corrections: Corrections,
}

/// Runs both audits against the same elements.
///
/// The two audits inspect disjoint keys, so a single pass over the document
/// yields the same maps as two separate ones.
///
/// # Examples
/// ```
/// use osmtidy_core::{CleaningConfig, DocumentAuditor, ElementKind, RawElement};
///
/// let config = CleaningConfig::default();
/// let mut auditor = DocumentAuditor::new(&config);
/// auditor.observe(
///     &RawElement::new(ElementKind::Node)
///         .with_tag("addr:street", "Av. Brasil")
///         .with_tag("addr:postcode", "80000000"),
/// );
/// let report = auditor.finish();
/// assert_eq!(report.corrections.streets.len(), 1);
/// assert_eq!(report.corrections.postcodes.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentAuditor<'a> {
    streets: StreetNameAuditor<'a>,
    postcodes: PostcodeAuditor<'a>,
    observed: u64,
}

impl<'a> DocumentAuditor<'a> {
    /// Start both audits.
    #[must_use]
    pub const fn new(config: &'a CleaningConfig) -> Self {
        Self {
            streets: StreetNameAuditor::new(&config.street),
            postcodes: PostcodeAuditor::new(&config.postcode),
            observed: 0,
        }
    }

    /// Feed one element to both audits.
    pub fn observe(&mut self, element: &RawElement) {
        self.observed += 1;
        self.streets.observe(element);
        self.postcodes.observe(element);
    }

    /// Number of elements observed so far.
    #[must_use]
    pub const fn observed(&self) -> u64 {
        self.observed
    }

    /// Finish both audits.
    #[must_use]
    pub fn finish(self) -> AuditReport {
        let street_problems = self.streets.problems().clone();
        AuditReport {
            street_problems,
            corrections: Corrections {
                streets: self.streets.into_corrections(),
                postcodes: self.postcodes.into_corrections(),
            },
        }
    }
}
