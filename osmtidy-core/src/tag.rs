//! Normalised tag and membership rows.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// OSM identifier for nodes and ways.
pub type ElementId = i64;

/// A shaped tag row owned by a node or way.
///
/// The namespace serialises as `type`, matching the `*_tags` table column.
///
/// # Examples
/// ```
/// use osmtidy_core::Tag;
///
/// let tag = Tag::new(42, "street", "Rua XV de Novembro", "addr");
/// assert_eq!(tag.namespace, "addr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tag {
    /// Owning element id.
    pub id: ElementId,
    /// Field name with the namespace prefix removed.
    pub key: String,
    /// Tag value after corrections.
    pub value: String,
    /// Namespace taken from the key prefix, or the default namespace.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub namespace: String,
}

impl Tag {
    /// Build a tag row.
    pub fn new(
        id: ElementId,
        key: impl Into<String>,
        value: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            value: value.into(),
            namespace: namespace.into(),
        }
    }
}

/// Ordered reference from a way to one of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    /// Owning way id.
    pub way_id: ElementId,
    /// Referenced node id.
    pub node_id: ElementId,
    /// Zero-based position within the way.
    pub position: usize,
}
