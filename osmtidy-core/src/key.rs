//! Tag key decomposition.
//!
//! OSM keys use `:` to namespace related fields (`addr:street`,
//! `addr:postcode`). The classifier splits a raw key into a namespace and a
//! field, falling back to a default namespace for bare keys, and rejects keys
//! that carry characters the relational layout cannot represent cleanly.

use std::collections::BTreeSet;

/// Separator between namespace and field.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Namespace applied to keys without a prefix.
pub const DEFAULT_NAMESPACE: &str = "regular";

/// Characters that disqualify a key.
pub const DEFAULT_DISALLOWED_CHARS: &str = "=+/&<>;'\"?%#$@,. \t\r\n";

/// A key split into namespace and field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedKey {
    /// Namespace, stored in the `type` column.
    pub namespace: String,
    /// Field name, stored in the `key` column.
    pub field: String,
}

/// Splits raw keys into `(namespace, field)` pairs.
///
/// # Examples
/// ```
/// use osmtidy_core::TagKeyClassifier;
///
/// let classifier = TagKeyClassifier::default();
/// let key = classifier.classify("addr:street").expect("key is clean");
/// assert_eq!((key.namespace.as_str(), key.field.as_str()), ("addr", "street"));
///
/// let nested = classifier.classify("name:pt:old").expect("key is clean");
/// assert_eq!(nested.field, "pt:old");
///
/// assert!(classifier.classify("name=").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKeyClassifier {
    default_namespace: String,
    disallowed: BTreeSet<char>,
}

impl TagKeyClassifier {
    /// Build a classifier with a custom default namespace and disallowed set.
    pub fn new(default_namespace: impl Into<String>, disallowed: &str) -> Self {
        Self {
            default_namespace: default_namespace.into(),
            disallowed: disallowed.chars().collect(),
        }
    }

    /// Namespace used for keys without a separator.
    #[must_use]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Report whether a key contains a disallowed, whitespace or control
    /// character.
    #[must_use]
    pub fn is_rejected(&self, key: &str) -> bool {
        key.chars()
            .any(|ch| ch.is_control() || ch.is_whitespace() || self.disallowed.contains(&ch))
    }

    /// Classify a raw key, returning `None` when the key must be dropped.
    #[must_use]
    pub fn classify(&self, key: &str) -> Option<ClassifiedKey> {
        if self.is_rejected(key) {
            return None;
        }
        let classified = match key.split_once(NAMESPACE_SEPARATOR) {
            Some((namespace, field)) => ClassifiedKey {
                namespace: namespace.to_owned(),
                field: field.to_owned(),
            },
            None => ClassifiedKey {
                namespace: self.default_namespace.clone(),
                field: key.to_owned(),
            },
        };
        Some(classified)
    }
}

impl Default for TagKeyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_DISALLOWED_CHARS)
    }
}
