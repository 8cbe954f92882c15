//! Optional type checks for shaped records.
//!
//! Shaping keeps attributes as raw text. When validation is switched on,
//! each record is checked against the column types of its table before it is
//! written, and the first violation stops the run.

use std::fmt;

use thiserror::Error;

use crate::{
    Membership, Tag,
    shape::{AttributeRow, ElementRef, NodeRecord, ShapedElement, WayRecord},
};

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    /// A required value is absent.
    Missing,
    /// The value does not parse as a finite float.
    NotAFloat(String),
    /// The value does not parse as an integer.
    NotAnInteger(String),
    /// The value is empty.
    Empty,
    /// A membership belongs to another way.
    ForeignMember {
        /// Way named by the membership row.
        way_id: i64,
    },
    /// Membership positions have a gap or are out of order.
    Position {
        /// Expected position.
        expected: usize,
        /// Position found.
        found: usize,
    },
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("value is missing"),
            Self::NotAFloat(raw) => write!(f, "{raw:?} is not a finite float"),
            Self::NotAnInteger(raw) => write!(f, "{raw:?} is not an integer"),
            Self::Empty => f.write_str("value is empty"),
            Self::ForeignMember { way_id } => write!(f, "row belongs to way {way_id}"),
            Self::Position { expected, found } => {
                write!(f, "expected position {expected}, found {found}")
            }
        }
    }
}

/// A shaped record that does not fit its table.
///
/// # Examples
/// ```
/// use osmtidy_core::{
///     CleaningConfig, Corrections, ElementKind, ElementShaper, RawElement, schema,
/// };
///
/// let config = CleaningConfig::default();
/// let corrections = Corrections::default();
/// let node = RawElement::new(ElementKind::Node)
///     .with_attribute("id", "7")
///     .with_attribute("lat", "north");
/// let shaped = ElementShaper::new(&config, &corrections)
///     .shape(&node)?
///     .expect("nodes are shaped");
///
/// let err = schema::validate(&shaped.element).expect_err("lat is not a float");
/// assert_eq!(err.field, "lat");
/// assert_eq!(err.to_string(), "node 7: field lat: \"north\" is not a finite float");
/// # Ok::<(), osmtidy_core::ShapeError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{element}: field {field}: {problem}")]
pub struct SchemaViolation {
    /// Offending element.
    pub element: ElementRef,
    /// Column or row group at fault.
    pub field: &'static str,
    /// What is wrong.
    pub problem: SchemaProblem,
}

const FLOAT_FIELDS: [&str; 2] = ["lat", "lon"];
const INTEGER_FIELDS: [&str; 2] = ["uid", "changeset"];
const TEXT_FIELDS: [&str; 3] = ["user", "version", "timestamp"];

/// Check one shaped element against its table schema.
///
/// # Errors
/// Returns the first [`SchemaViolation`] found.
pub fn validate(element: &ShapedElement) -> Result<(), SchemaViolation> {
    let owner = element.element_ref();
    match element {
        ShapedElement::Node(NodeRecord {
            attributes, tags, ..
        }) => {
            check_attributes(owner, attributes, true)?;
            check_tags(owner, tags)
        }
        ShapedElement::Way(WayRecord {
            attributes,
            members,
            tags,
            ..
        }) => {
            check_attributes(owner, attributes, false)?;
            check_members(owner, members)?;
            check_tags(owner, tags)
        }
    }
}

fn check_attributes(
    owner: ElementRef,
    row: &AttributeRow,
    with_position: bool,
) -> Result<(), SchemaViolation> {
    let violation = |field: &'static str, problem: SchemaProblem| SchemaViolation {
        element: owner,
        field,
        problem,
    };
    let present = |field: &'static str| {
        row.get(field)
            .ok_or_else(|| violation(field, SchemaProblem::Missing))
    };

    if with_position {
        for field in FLOAT_FIELDS {
            let raw = present(field)?;
            if !raw.parse::<f64>().is_ok_and(f64::is_finite) {
                return Err(violation(field, SchemaProblem::NotAFloat(raw.to_owned())));
            }
        }
    }
    for field in INTEGER_FIELDS {
        let raw = present(field)?;
        if raw.parse::<i64>().is_err() {
            return Err(violation(field, SchemaProblem::NotAnInteger(raw.to_owned())));
        }
    }
    for field in TEXT_FIELDS {
        present(field)?;
    }
    Ok(())
}

fn check_tags(owner: ElementRef, tags: &[Tag]) -> Result<(), SchemaViolation> {
    for tag in tags {
        let field = if tag.key.is_empty() {
            "key"
        } else if tag.namespace.is_empty() {
            "type"
        } else {
            continue;
        };
        return Err(SchemaViolation {
            element: owner,
            field,
            problem: SchemaProblem::Empty,
        });
    }
    Ok(())
}

fn check_members(owner: ElementRef, members: &[Membership]) -> Result<(), SchemaViolation> {
    for (expected, member) in members.iter().enumerate() {
        let problem = if member.way_id != owner.id {
            SchemaProblem::ForeignMember {
                way_id: member.way_id,
            }
        } else if member.position != expected {
            SchemaProblem::Position {
                expected,
                found: member.position,
            }
        } else {
            continue;
        };
        return Err(SchemaViolation {
            element: owner,
            field: "position",
            problem,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CleaningConfig, Corrections, ElementKind, ElementShaper, RawElement};
    use rstest::{fixture, rstest};

    #[fixture]
    fn node() -> RawElement {
        RawElement::new(ElementKind::Node)
            .with_attribute("id", "1")
            .with_attribute("lat", "-25.43")
            .with_attribute("lon", "-49.27")
            .with_attribute("user", "mapper")
            .with_attribute("uid", "42")
            .with_attribute("version", "3")
            .with_attribute("changeset", "1000")
            .with_attribute("timestamp", "2016-03-01T12:00:00Z")
    }

    fn shape(element: &RawElement) -> ShapedElement {
        let config = CleaningConfig::default();
        let corrections = Corrections::default();
        ElementShaper::new(&config, &corrections)
            .shape(element)
            .expect("shape")
            .expect("shaped")
            .element
    }

    #[rstest]
    fn complete_node_passes(node: RawElement) {
        assert_eq!(validate(&shape(&node.with_tag("name", "Batel"))), Ok(()));
    }

    #[rstest]
    #[case("lat", "NaN", SchemaProblem::NotAFloat("NaN".into()))]
    #[case("lon", "inf", SchemaProblem::NotAFloat("inf".into()))]
    #[case("uid", "4.2", SchemaProblem::NotAnInteger("4.2".into()))]
    #[case("changeset", "", SchemaProblem::NotAnInteger(String::new()))]
    fn mistyped_attributes_are_reported(
        node: RawElement,
        #[case] field: &'static str,
        #[case] raw: &str,
        #[case] problem: SchemaProblem,
    ) {
        let err = validate(&shape(&node.with_attribute(field, raw))).expect_err("violation");
        assert_eq!(err.field, field);
        assert_eq!(err.problem, problem);
        assert_eq!(
            err.element,
            ElementRef {
                kind: ElementKind::Node,
                id: 1
            }
        );
    }

    #[rstest]
    fn missing_text_attribute_is_reported(mut node: RawElement) {
        node.attributes.remove("timestamp");
        let err = validate(&shape(&node)).expect_err("violation");
        assert_eq!(err.field, "timestamp");
        assert_eq!(err.problem, SchemaProblem::Missing);
    }

    #[rstest]
    fn ways_need_no_position() {
        let way = RawElement::new(ElementKind::Way)
            .with_attribute("id", "9")
            .with_attribute("user", "mapper")
            .with_attribute("uid", "42")
            .with_attribute("version", "1")
            .with_attribute("changeset", "7")
            .with_attribute("timestamp", "2016-03-01T12:00:00Z")
            .with_node_ref("1")
            .with_node_ref("2");
        assert_eq!(validate(&shape(&way)), Ok(()));
    }

    #[rstest]
    fn special_override_tags_may_break_the_schema(node: RawElement) {
        let mut element = shape(&node);
        if let ShapedElement::Node(record) = &mut element {
            record.tags.push(Tag::new(1, "", "value", "regular"));
        }
        let err = validate(&element).expect_err("violation");
        assert_eq!(err.field, "key");
        assert_eq!(err.problem, SchemaProblem::Empty);
    }

    #[rstest]
    #[case(vec![(9, 0), (9, 2)], SchemaProblem::Position { expected: 1, found: 2 })]
    #[case(vec![(9, 0), (8, 1)], SchemaProblem::ForeignMember { way_id: 8 })]
    fn broken_memberships_are_reported(
        #[case] rows: Vec<(i64, usize)>,
        #[case] problem: SchemaProblem,
    ) {
        let owner = ElementRef {
            kind: ElementKind::Way,
            id: 9,
        };
        let members: Vec<_> = rows
            .into_iter()
            .map(|(way_id, position)| Membership {
                way_id,
                node_id: 1,
                position,
            })
            .collect();
        let err = check_members(owner, &members).expect_err("violation");
        assert_eq!(err.problem, problem);
    }
}
