//! Immutable configuration for the audits and the shaper.
//!
//! Every region-specific table lives here and is handed to the components at
//! construction. [`CleaningConfig::default`] carries the Curitiba
//! metropolitan region conventions; manual override tables start empty and
//! are merged in from an [`OverrideTables`] document.

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::RangeInclusive,
    sync::LazyLock,
};

use regex::Regex;
#[cfg(feature = "serde")]
use serde::Deserialize;
use thiserror::Error;

use crate::{Tag, TagKeyClassifier};

/// Street-type words expected at the start of a street name.
pub const DEFAULT_EXPECTED_STREET_TYPES: [&str; 10] = [
    "Rua", "Avenida", "Travessa", "Praça", "Rodovia", "Alameda", "Estrada", "Linha", "Largo",
    "Marginal",
];

/// Leading-token synonyms mapped to their canonical street type.
pub const DEFAULT_STREET_SYNONYMS: [(&str, &str); 5] = [
    ("Av", "Avenida"),
    ("Av.", "Avenida"),
    ("R.", "Rua"),
    ("rua", "Rua"),
    ("RUA", "Rua"),
];

/// Canonical postal code layout (`DDDDD-DDD`).
pub const DEFAULT_POSTCODE_PATTERN: &str = r"^[0-9]{5}-[0-9]{3}$";

/// Postal codes assigned to the Curitiba metropolitan region.
pub const DEFAULT_POSTCODE_RANGE: RangeInclusive<u32> = 80_000_001..=83_800_999;

#[expect(
    clippy::expect_used,
    reason = "the default pattern is a compile-time constant"
)]
static DEFAULT_POSTCODE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_POSTCODE_PATTERN).expect("valid postcode pattern"));

/// Errors raised while building configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The postal code pattern is not a valid regular expression.
    #[error("invalid postal code pattern {pattern:?}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Source error from `regex`.
        #[source]
        source: regex::Error,
    },
    /// The postal code range contains no values.
    #[error("postal code range {start}..={end} is empty")]
    EmptyRange {
        /// Lower bound.
        start: u32,
        /// Upper bound.
        end: u32,
    },
}

/// Raw street values replaced by an explicit list of tags.
pub type SpecialOverrides = BTreeMap<String, Vec<Tag>>;

/// Street-name audit tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRules {
    /// Leading tokens that need no correction.
    pub expected: BTreeSet<String>,
    /// Leading-token replacements.
    pub synonyms: BTreeMap<String, String>,
    /// Exact-value manual corrections; these beat the synonym table.
    pub overrides: BTreeMap<String, String>,
    /// Exact values spliced into several tags by the shaper.
    pub special: SpecialOverrides,
}

impl StreetRules {
    /// Merge manual override tables, replacing entries with the same key.
    pub fn apply_overrides(&mut self, tables: OverrideTables) {
        self.overrides.extend(tables.street);
        self.special.extend(tables.special);
    }
}

impl Default for StreetRules {
    fn default() -> Self {
        Self {
            expected: DEFAULT_EXPECTED_STREET_TYPES
                .iter()
                .map(|token| (*token).to_owned())
                .collect(),
            synonyms: DEFAULT_STREET_SYNONYMS
                .iter()
                .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
                .collect(),
            overrides: BTreeMap::new(),
            special: SpecialOverrides::new(),
        }
    }
}

/// Postal code audit rules.
#[derive(Debug, Clone)]
pub struct PostcodeRules {
    format: Regex,
    range: RangeInclusive<u32>,
}

impl PostcodeRules {
    /// Build rules from a format pattern and an accepted numeric range.
    ///
    /// # Examples
    /// ```
    /// use osmtidy_core::PostcodeRules;
    ///
    /// let rules = PostcodeRules::new(r"^[0-9]{5}-[0-9]{3}$", 1..=99_999_999)?;
    /// assert!(rules.matches_format("01310-100"));
    /// # Ok::<(), osmtidy_core::ConfigError>(())
    /// ```
    pub fn new(pattern: &str, range: RangeInclusive<u32>) -> Result<Self, ConfigError> {
        if range.is_empty() {
            return Err(ConfigError::EmptyRange {
                start: *range.start(),
                end: *range.end(),
            });
        }
        let format = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self { format, range })
    }

    /// Report whether the value has the canonical layout.
    #[must_use]
    pub fn matches_format(&self, value: &str) -> bool {
        self.format.is_match(value)
    }

    /// Report whether the value, with hyphens removed, is an integer in range.
    #[must_use]
    pub fn in_range(&self, value: &str) -> bool {
        value
            .replace('-', "")
            .parse::<u32>()
            .is_ok_and(|code| self.range.contains(&code))
    }

    /// Accepted numeric range.
    #[must_use]
    pub const fn range(&self) -> &RangeInclusive<u32> {
        &self.range
    }
}

impl Default for PostcodeRules {
    fn default() -> Self {
        Self {
            format: DEFAULT_POSTCODE_FORMAT.clone(),
            range: DEFAULT_POSTCODE_RANGE,
        }
    }
}

/// Everything the audits and the shaper need for one run.
#[derive(Debug, Clone, Default)]
pub struct CleaningConfig {
    /// Key decomposition rules.
    pub classifier: TagKeyClassifier,
    /// Street-name tables.
    pub street: StreetRules,
    /// Postal code rules.
    pub postcode: PostcodeRules,
    /// Check every shaped record against the table schema before writing.
    pub validate_schema: bool,
}

impl CleaningConfig {
    /// Default configuration with manual override tables merged in.
    #[must_use]
    pub fn with_overrides(tables: OverrideTables) -> Self {
        let mut config = Self::default();
        config.street.apply_overrides(tables);
        config
    }
}

/// Manual correction tables, usually loaded from a JSON document.
///
/// # Examples
/// ```
/// use osmtidy_core::OverrideTables;
///
/// let tables: OverrideTables = serde_json::from_str(
///     r#"{"street": {"Filipinas": "Rua Filipinas"}}"#,
/// )?;
/// assert_eq!(tables.street.get("Filipinas").map(String::as_str), Some("Rua Filipinas"));
/// assert!(tables.special.is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct OverrideTables {
    /// Exact street value to corrected street value.
    pub street: BTreeMap<String, String>,
    /// Exact street value to replacement tags.
    pub special: SpecialOverrides,
}
