//! Shaping raw elements into relational rows.
//!
//! The shaper is the last step before the sink: it fixes the attribute
//! layout per element kind, renumbers way memberships, classifies tag keys
//! and applies the audit corrections. Tags with rejected keys or known-invalid
//! postal codes are dropped here.

use std::fmt;

use log::debug;
use thiserror::Error;

use crate::{
    CleaningConfig, Correction, Corrections, ElementId, ElementKind, Membership, RawElement,
    SpecialOverrides, Tag, TagKeyClassifier,
};

/// Node attributes after `id`, in table column order.
pub const NODE_ATTRIBUTES: [&str; 7] = [
    "lat",
    "lon",
    "user",
    "uid",
    "version",
    "changeset",
    "timestamp",
];

/// Way attributes after `id`, in table column order.
pub const WAY_ATTRIBUTES: [&str; 5] = ["user", "uid", "version", "changeset", "timestamp"];

const STREET_FIELD: &str = "street";
const ADDRESS_NAMESPACE: &str = "addr";
const POSTCODE_FIELDS: [&str; 2] = ["postal_code", "postcode"];

/// Fatal problems found while shaping an element.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// The element carries no `id` attribute.
    #[error("{kind} element without an id attribute")]
    MissingId {
        /// Kind of the offending element.
        kind: ElementKind,
    },
    /// The `id` attribute is not a 64-bit integer.
    #[error("{kind} id {raw:?} is not an integer")]
    InvalidId {
        /// Kind of the offending element.
        kind: ElementKind,
        /// Raw attribute value.
        raw: String,
    },
    /// A way's `nd ref` is not a 64-bit integer.
    #[error("way {way_id} references node {raw:?}, which is not an integer")]
    InvalidNodeRef {
        /// Owning way.
        way_id: ElementId,
        /// Raw reference value.
        raw: String,
    },
}

/// Kind and id of a shaped element, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    /// Element kind.
    pub kind: ElementKind,
    /// Element id.
    pub id: ElementId,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Raw attribute values in a fixed column order.
///
/// Values stay as text; [`crate::schema`] checks their types when
/// validation is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    fields: Vec<(&'static str, Option<String>)>,
}

impl AttributeRow {
    /// Pick the named attributes from an element, in the given order.
    #[must_use]
    pub fn from_element(element: &RawElement, names: &[&'static str]) -> Self {
        let fields = names
            .iter()
            .map(|name| (*name, element.attribute(name).map(str::to_owned)))
            .collect();
        Self { fields }
    }

    /// Value of a named attribute, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Iterate over `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (*name, value.as_deref()))
    }
}

/// A shaped node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    /// Node id.
    pub id: ElementId,
    /// Attributes in [`NODE_ATTRIBUTES`] order.
    pub attributes: AttributeRow,
    /// Tag rows.
    pub tags: Vec<Tag>,
}

/// A shaped way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayRecord {
    /// Way id.
    pub id: ElementId,
    /// Attributes in [`WAY_ATTRIBUTES`] order.
    pub attributes: AttributeRow,
    /// Member nodes in document order.
    pub members: Vec<Membership>,
    /// Tag rows.
    pub tags: Vec<Tag>,
}

/// A shaped element ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapedElement {
    /// A node with its tags.
    Node(NodeRecord),
    /// A way with its memberships and tags.
    Way(WayRecord),
}

impl ShapedElement {
    /// Kind and id of the element.
    #[must_use]
    pub const fn element_ref(&self) -> ElementRef {
        match self {
            Self::Node(node) => ElementRef {
                kind: ElementKind::Node,
                id: node.id,
            },
            Self::Way(way) => ElementRef {
                kind: ElementKind::Way,
                id: way.id,
            },
        }
    }

    /// Tag rows of the element.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        match self {
            Self::Node(node) => &node.tags,
            Self::Way(way) => &way.tags,
        }
    }
}

/// Shaped element plus the number of tags dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaped {
    /// The shaped element.
    pub element: ShapedElement,
    /// Tags dropped for rejected keys or invalid postal codes.
    pub dropped_tags: usize,
}

/// Applies key classification and audit corrections to raw elements.
///
/// # Examples
/// ```
/// use osmtidy_core::{
///     CleaningConfig, Corrections, ElementKind, ElementShaper, RawElement, ShapedElement,
/// };
///
/// let config = CleaningConfig::default();
/// let corrections = Corrections::default();
/// let shaper = ElementShaper::new(&config, &corrections);
/// let node = RawElement::new(ElementKind::Node)
///     .with_attribute("id", "1")
///     .with_tag("addr:street", "Rua XV de Novembro");
///
/// let shaped = shaper.shape(&node)?.expect("nodes are shaped");
/// let ShapedElement::Node(record) = shaped.element else { unreachable!() };
/// assert_eq!(record.tags[0].namespace, "addr");
/// # Ok::<(), osmtidy_core::ShapeError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ElementShaper<'a> {
    classifier: &'a TagKeyClassifier,
    special: &'a SpecialOverrides,
    corrections: &'a Corrections,
}

impl<'a> ElementShaper<'a> {
    /// Build a shaper over a configuration and the audit's corrections.
    #[must_use]
    pub const fn new(config: &'a CleaningConfig, corrections: &'a Corrections) -> Self {
        Self {
            classifier: &config.classifier,
            special: &config.street.special,
            corrections,
        }
    }

    /// Shape one element. Relations yield `Ok(None)`.
    pub fn shape(&self, element: &RawElement) -> Result<Option<Shaped>, ShapeError> {
        let shaped = match element.kind {
            ElementKind::Node => {
                let id = parse_id(element)?;
                let (tags, dropped_tags) = self.shape_tags(element, id);
                Shaped {
                    element: ShapedElement::Node(NodeRecord {
                        id,
                        attributes: AttributeRow::from_element(element, &NODE_ATTRIBUTES),
                        tags,
                    }),
                    dropped_tags,
                }
            }
            ElementKind::Way => {
                let id = parse_id(element)?;
                let members = memberships(element, id)?;
                let (tags, dropped_tags) = self.shape_tags(element, id);
                Shaped {
                    element: ShapedElement::Way(WayRecord {
                        id,
                        attributes: AttributeRow::from_element(element, &WAY_ATTRIBUTES),
                        members,
                        tags,
                    }),
                    dropped_tags,
                }
            }
            ElementKind::Relation => return Ok(None),
        };
        Ok(Some(shaped))
    }

    /// Shape the tags of an element owned by `id`.
    ///
    /// Returns the tag rows and the number of raw tags dropped.
    #[must_use]
    pub fn shape_tags(&self, element: &RawElement, id: ElementId) -> (Vec<Tag>, usize) {
        let mut tags = Vec::with_capacity(element.tags.len());
        let mut dropped = 0;
        for raw in &element.tags {
            let Some(key) = self.classifier.classify(&raw.key) else {
                debug!("{} {id}: dropped tag with key {:?}", element.kind, raw.key);
                dropped += 1;
                continue;
            };

            if key.field == STREET_FIELD && key.namespace == ADDRESS_NAMESPACE {
                if let Some(replacements) = self.special.get(&raw.value) {
                    tags.extend(replacements.iter().cloned());
                    continue;
                }
                if let Some(fixed) = self
                    .corrections
                    .streets
                    .get(&raw.value)
                    .and_then(Correction::replacement)
                {
                    tags.push(Tag::new(id, key.field, fixed, key.namespace));
                    continue;
                }
            } else if POSTCODE_FIELDS.contains(&key.field.as_str()) {
                match self.corrections.postcodes.get(&raw.value) {
                    Some(Correction::Replace(fixed)) => {
                        tags.push(Tag::new(id, key.field, fixed.as_str(), key.namespace));
                        continue;
                    }
                    Some(Correction::Invalid) => {
                        debug!(
                            "{} {id}: dropped invalid postal code {:?}",
                            element.kind, raw.value
                        );
                        dropped += 1;
                        continue;
                    }
                    None => {}
                }
            }

            tags.push(Tag::new(id, key.field, raw.value.as_str(), key.namespace));
        }
        (tags, dropped)
    }
}

fn parse_id(element: &RawElement) -> Result<ElementId, ShapeError> {
    let raw = element
        .attribute("id")
        .ok_or(ShapeError::MissingId { kind: element.kind })?;
    raw.parse().map_err(|_| ShapeError::InvalidId {
        kind: element.kind,
        raw: raw.to_owned(),
    })
}

fn memberships(element: &RawElement, way_id: ElementId) -> Result<Vec<Membership>, ShapeError> {
    element
        .node_refs
        .iter()
        .enumerate()
        .map(|(position, raw)| {
            let node_id = raw.parse().map_err(|_| ShapeError::InvalidNodeRef {
                way_id,
                raw: raw.clone(),
            })?;
            Ok(Membership {
                way_id,
                node_id,
                position,
            })
        })
        .collect()
}
