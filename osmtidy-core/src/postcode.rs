//! Postal code audit.
//!
//! Brazilian CEPs are written `DDDDD-DDD`. Values off that layout get a
//! single repair attempt (a missing hyphen, or stray periods); anything that
//! still falls outside the configured range is marked invalid so the shaper
//! drops it.

use crate::{Correction, CorrectionMap, PostcodeRules, RawElement};

/// Raw keys carrying postal codes.
pub const POSTCODE_KEYS: [&str; 2] = ["addr:postcode", "postal_code"];

/// Result of checking one raw postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostcodeVerdict {
    /// Canonical and in range; no correction needed.
    Valid,
    /// Repaired into the contained value.
    Repaired(String),
    /// Cannot be repaired.
    Invalid,
}

impl PostcodeVerdict {
    /// Correction to record, or `None` for valid values.
    #[must_use]
    pub fn into_correction(self) -> Option<Correction> {
        match self {
            Self::Valid => None,
            Self::Repaired(value) => Some(Correction::Replace(value)),
            Self::Invalid => Some(Correction::Invalid),
        }
    }
}

/// Check a raw postal code and attempt a repair.
///
/// # Examples
/// ```
/// use osmtidy_core::{PostcodeRules, postcode::{PostcodeVerdict, assess}};
///
/// let rules = PostcodeRules::default();
/// assert_eq!(assess(&rules, "80020-000"), PostcodeVerdict::Valid);
/// assert_eq!(
///     assess(&rules, "80020000"),
///     PostcodeVerdict::Repaired("80020-000".into())
/// );
/// assert_eq!(assess(&rules, "80000-000"), PostcodeVerdict::Invalid);
/// ```
#[must_use]
pub fn assess(rules: &PostcodeRules, value: &str) -> PostcodeVerdict {
    if rules.matches_format(value) {
        return if rules.in_range(value) {
            PostcodeVerdict::Valid
        } else {
            PostcodeVerdict::Invalid
        };
    }

    let candidate = if value.chars().count() == 8 && !value.contains('-') {
        insert_hyphen(value)
    } else if value.contains('.') {
        value.replace('.', "")
    } else {
        return PostcodeVerdict::Invalid;
    };

    if rules.in_range(&candidate) {
        PostcodeVerdict::Repaired(candidate)
    } else {
        PostcodeVerdict::Invalid
    }
}

fn insert_hyphen(value: &str) -> String {
    let mut repaired = String::with_capacity(value.len() + 1);
    for (index, ch) in value.chars().enumerate() {
        if index == 5 {
            repaired.push('-');
        }
        repaired.push(ch);
    }
    repaired
}

/// Collects corrections for malformed postal codes.
#[derive(Debug, Clone)]
pub struct PostcodeAuditor<'a> {
    rules: &'a PostcodeRules,
    corrections: CorrectionMap,
}

impl<'a> PostcodeAuditor<'a> {
    /// Start an audit against the given rules.
    #[must_use]
    pub const fn new(rules: &'a PostcodeRules) -> Self {
        Self {
            rules,
            corrections: CorrectionMap::new(),
        }
    }

    /// Inspect the postal code tags of one element.
    pub fn observe(&mut self, element: &RawElement) {
        for tag in element
            .tags
            .iter()
            .filter(|tag| POSTCODE_KEYS.contains(&tag.key.as_str()))
        {
            self.observe_value(&tag.value);
        }
    }

    /// Inspect one raw postal code.
    pub fn observe_value(&mut self, value: &str) {
        if self.corrections.contains(value) {
            return;
        }
        if let Some(correction) = assess(self.rules, value).into_correction() {
            self.corrections.insert(value, correction);
        }
    }

    /// Finish the audit, producing the correction map.
    #[must_use]
    pub fn into_corrections(self) -> CorrectionMap {
        self.corrections
    }
}
