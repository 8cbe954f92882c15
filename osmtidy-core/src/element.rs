//! Raw OSM elements as they come off the document stream.
//!
//! A [`RawElement`] holds exactly what the shaper needs from one top-level
//! feature: its XML attributes, its child `tag` pairs and its child `nd`
//! references. Nothing else from the subtree is retained.

use std::{collections::BTreeMap, fmt};

/// Kinds of top-level OSM features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// A point feature (`<node>`).
    Node,
    /// An ordered chain of nodes (`<way>`).
    Way,
    /// A grouping of other features (`<relation>`). Never shaped.
    Relation,
}

impl ElementKind {
    /// Kinds shaped into relational rows.
    pub const SHAPED: [Self; 2] = [Self::Node, Self::Way];

    /// Resolve a kind from its XML element name.
    ///
    /// # Examples
    /// ```
    /// use osmtidy_core::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_name(b"way"), Some(ElementKind::Way));
    /// assert_eq!(ElementKind::from_name(b"bounds"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"node" => Some(Self::Node),
            b"way" => Some(Self::Way),
            b"relation" => Some(Self::Relation),
            _ => None,
        }
    }

    /// XML element name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child `<tag k=".." v=".."/>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    /// Raw key, including any namespace prefix.
    pub key: String,
    /// Raw value.
    pub value: String,
}

impl RawTag {
    /// Build a tag from a key/value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One top-level feature read from the document.
///
/// # Examples
/// ```
/// use osmtidy_core::{ElementKind, RawElement};
///
/// let way = RawElement::new(ElementKind::Way)
///     .with_attribute("id", "7")
///     .with_node_ref("1")
///     .with_node_ref("2")
///     .with_tag("highway", "residential");
///
/// assert_eq!(way.attribute("id"), Some("7"));
/// assert_eq!(way.node_refs.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Feature kind.
    pub kind: ElementKind,
    /// XML attributes of the element, keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child tags in document order.
    pub tags: Vec<RawTag>,
    /// Child `nd` references in document order (ways only).
    pub node_refs: Vec<String>,
}

impl RawElement {
    /// Create an empty element of the given kind.
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            tags: Vec::new(),
            node_refs: Vec::new(),
        }
    }

    /// Add an attribute, replacing any previous value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(RawTag::new(key, value));
        self
    }

    /// Append a node reference.
    #[must_use]
    pub fn with_node_ref(mut self, node_ref: impl Into<String>) -> Self {
        self.node_refs.push(node_ref.into());
        self
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
