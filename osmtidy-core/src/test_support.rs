//! In-memory sink used by unit and behaviour tests.

use std::convert::Infallible;

use crate::{
    Membership, RelationalSink, Tag,
    shape::{AttributeRow, NodeRecord, WayRecord},
};

/// Keeps every row it is given, grouped by table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    /// Node rows as `(id, attributes)`.
    pub nodes: Vec<(i64, AttributeRow)>,
    /// Node tag rows.
    pub node_tags: Vec<Tag>,
    /// Way rows as `(id, attributes)`.
    pub ways: Vec<(i64, AttributeRow)>,
    /// Way membership rows.
    pub way_nodes: Vec<Membership>,
    /// Way tag rows.
    pub way_tags: Vec<Tag>,
}

impl RecordingSink {
    /// Tags recorded for the node with the given id.
    #[must_use]
    pub fn tags_of_node(&self, id: i64) -> Vec<&Tag> {
        self.node_tags.iter().filter(|tag| tag.id == id).collect()
    }

    /// Tags recorded for the way with the given id.
    #[must_use]
    pub fn tags_of_way(&self, id: i64) -> Vec<&Tag> {
        self.way_tags.iter().filter(|tag| tag.id == id).collect()
    }

    /// Members recorded for the way with the given id, in position order.
    #[must_use]
    pub fn members_of(&self, way_id: i64) -> Vec<&Membership> {
        self.way_nodes
            .iter()
            .filter(|member| member.way_id == way_id)
            .collect()
    }
}

impl RelationalSink for RecordingSink {
    type Error = Infallible;

    fn write_node(&mut self, node: &NodeRecord) -> Result<(), Self::Error> {
        self.nodes.push((node.id, node.attributes.clone()));
        self.node_tags.extend(node.tags.iter().cloned());
        Ok(())
    }

    fn write_way(&mut self, way: &WayRecord) -> Result<(), Self::Error> {
        self.ways.push((way.id, way.attributes.clone()));
        self.way_nodes.extend(way.members.iter().copied());
        self.way_tags.extend(way.tags.iter().cloned());
        Ok(())
    }
}
