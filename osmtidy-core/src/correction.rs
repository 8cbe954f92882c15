//! Correction maps produced by the audits and consumed by the shaper.

use std::{collections::BTreeMap, fmt};

/// Marker printed for values that cannot be repaired.
pub const INVALID_MARKER: &str = "Invalid";

/// Outcome recorded for a flagged raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// Substitute this value for the raw one.
    Replace(String),
    /// The raw value is known bad and its tag must be dropped.
    Invalid,
}

impl Correction {
    /// Replacement value, or `None` for [`Correction::Invalid`].
    #[must_use]
    pub fn replacement(&self) -> Option<&str> {
        match self {
            Self::Replace(value) => Some(value),
            Self::Invalid => None,
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.write_str(value),
            Self::Invalid => f.write_str(INVALID_MARKER),
        }
    }
}

/// Raw value to correction lookup.
///
/// Absence from the map means the raw value needs no change. Iteration is
/// ordered by raw value.
///
/// # Examples
/// ```
/// use osmtidy_core::{Correction, CorrectionMap};
///
/// let mut map = CorrectionMap::new();
/// map.insert("Av. Brasil", Correction::Replace("Avenida Brasil".into()));
/// assert_eq!(
///     map.get("Av. Brasil").and_then(Correction::replacement),
///     Some("Avenida Brasil")
/// );
/// assert!(map.get("Rua XV").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionMap {
    entries: BTreeMap<String, Correction>,
}

impl CorrectionMap {
    /// Create an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record a correction, replacing any earlier one for the same value.
    pub fn insert(&mut self, raw: impl Into<String>, correction: Correction) {
        self.entries.insert(raw.into(), correction);
    }

    /// Look up the correction for a raw value.
    #[must_use]
    pub fn get(&self, raw: &str) -> Option<&Correction> {
        self.entries.get(raw)
    }

    /// Report whether the raw value was flagged.
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    /// Number of flagged values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether nothing was flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(raw, correction)` pairs in raw-value order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Correction)> {
        self.entries.iter().map(|(raw, fix)| (raw.as_str(), fix))
    }
}

impl FromIterator<(String, Correction)> for CorrectionMap {
    fn from_iter<I: IntoIterator<Item = (String, Correction)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
