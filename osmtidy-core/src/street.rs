//! Street name audit.
//!
//! Brazilian street names open with their street type (`Rua`, `Avenida`,
//! ...). The auditor buckets every `addr:street` value whose leading token is
//! not an expected street type, then derives a correction for each bucketed
//! value: a manual override when one exists, otherwise the leading token run
//! through the synonym table.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Correction, CorrectionMap, RawElement, StreetRules};

/// Raw key carrying street names.
pub const STREET_KEY: &str = "addr:street";

/// Unexpected leading token to the distinct values observed with it.
pub type StreetProblems = BTreeMap<String, BTreeSet<String>>;

/// Leading whitespace-delimited token, if the value starts with one.
///
/// # Examples
/// ```
/// use osmtidy_core::street::leading_token;
///
/// assert_eq!(leading_token("Av. Brasil"), Some("Av."));
/// assert_eq!(leading_token(" Rua"), None);
/// assert_eq!(leading_token(""), None);
/// ```
#[must_use]
pub fn leading_token(value: &str) -> Option<&str> {
    value
        .split(char::is_whitespace)
        .next()
        .filter(|token| !token.is_empty())
}

/// Collects unexpected street names and derives their corrections.
#[derive(Debug, Clone)]
pub struct StreetNameAuditor<'a> {
    rules: &'a StreetRules,
    problems: StreetProblems,
}

impl<'a> StreetNameAuditor<'a> {
    /// Start an audit against the given tables.
    #[must_use]
    pub const fn new(rules: &'a StreetRules) -> Self {
        Self {
            rules,
            problems: StreetProblems::new(),
        }
    }

    /// Inspect the street tags of one element.
    pub fn observe(&mut self, element: &RawElement) {
        for tag in element.tags.iter().filter(|tag| tag.key == STREET_KEY) {
            self.observe_value(&tag.value);
        }
    }

    /// Inspect one street value, bucketing it when its type is unexpected.
    pub fn observe_value(&mut self, value: &str) {
        let Some(token) = leading_token(value) else {
            return;
        };
        if self.rules.expected.contains(token) {
            return;
        }
        self.problems
            .entry(token.to_owned())
            .or_default()
            .insert(value.to_owned());
    }

    /// Values bucketed so far, keyed by their unexpected leading token.
    #[must_use]
    pub const fn problems(&self) -> &StreetProblems {
        &self.problems
    }

    /// Replace the leading token through the synonym table.
    ///
    /// The token is the text before the first space; the rest of the value is
    /// kept verbatim. Values whose token has no synonym come back unchanged.
    ///
    /// # Examples
    /// ```
    /// use osmtidy_core::{StreetNameAuditor, StreetRules};
    ///
    /// let rules = StreetRules::default();
    /// let auditor = StreetNameAuditor::new(&rules);
    /// assert_eq!(auditor.normalise("Av. Brasil"), "Avenida Brasil");
    /// assert_eq!(auditor.normalise("Brasil"), "Brasil");
    /// ```
    #[must_use]
    pub fn normalise(&self, value: &str) -> String {
        let (token, rest) = match value.split_once(' ') {
            Some((token, rest)) => (token, Some(rest)),
            None => (value, None),
        };
        let Some(canonical) = self.rules.synonyms.get(token) else {
            return value.to_owned();
        };
        match rest {
            Some(rest) => format!("{canonical} {rest}"),
            None => canonical.clone(),
        }
    }

    /// Correction for one bucketed value: manual override, then synonyms.
    #[must_use]
    pub fn correct(&self, value: &str) -> String {
        self.rules
            .overrides
            .get(value)
            .cloned()
            .unwrap_or_else(|| self.normalise(value))
    }

    /// Finish the audit, producing the correction map.
    ///
    /// Values handled by the special override table are left out; the shaper
    /// splices those in directly.
    #[must_use]
    pub fn into_corrections(self) -> CorrectionMap {
        self.problems
            .values()
            .flatten()
            .filter(|value| !self.rules.special.contains_key(value.as_str()))
            .map(|value| (value.clone(), Correction::Replace(self.correct(value))))
            .collect()
    }
}
