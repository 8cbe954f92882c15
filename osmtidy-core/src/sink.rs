//! Destination for shaped rows.
//!
//! The `RelationalSink` trait receives one ordered batch per element: the
//! feature row first, then its membership rows (ways only), then its tag
//! rows. Implementations decide how those rows are stored.

use crate::shape::{NodeRecord, ShapedElement, WayRecord};

/// Name of the node table.
pub const NODES_TABLE: &str = "nodes";
/// Name of the node tag table.
pub const NODE_TAGS_TABLE: &str = "nodes_tags";
/// Name of the way table.
pub const WAYS_TABLE: &str = "ways";
/// Name of the way tag table.
pub const WAY_TAGS_TABLE: &str = "ways_tags";
/// Name of the way membership table.
pub const WAY_NODES_TABLE: &str = "ways_nodes";

/// Columns of the node table.
pub const NODE_COLUMNS: [&str; 8] = [
    "id",
    "lat",
    "lon",
    "user",
    "uid",
    "version",
    "changeset",
    "timestamp",
];
/// Columns of the way table.
pub const WAY_COLUMNS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];
/// Columns of both tag tables.
pub const TAG_COLUMNS: [&str; 4] = ["id", "key", "value", "type"];
/// Columns of the membership table.
pub const WAY_NODE_COLUMNS: [&str; 3] = ["id", "node_id", "position"];

/// Accepts shaped elements in document order.
///
/// # Examples
///
/// ```
/// use osmtidy_core::{NodeRecord, RelationalSink, WayRecord};
///
/// #[derive(Default)]
/// struct CountingSink {
///     rows: usize,
/// }
///
/// impl RelationalSink for CountingSink {
///     type Error = std::convert::Infallible;
///
///     fn write_node(&mut self, node: &NodeRecord) -> Result<(), Self::Error> {
///         self.rows += 1 + node.tags.len();
///         Ok(())
///     }
///
///     fn write_way(&mut self, way: &WayRecord) -> Result<(), Self::Error> {
///         self.rows += 1 + way.members.len() + way.tags.len();
///         Ok(())
///     }
/// }
///
/// let sink = CountingSink::default();
/// assert_eq!(sink.rows, 0);
/// ```
pub trait RelationalSink {
    /// Error raised when rows cannot be stored.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a node row and its tag rows.
    fn write_node(&mut self, node: &NodeRecord) -> Result<(), Self::Error>;

    /// Store a way row, its membership rows and its tag rows.
    fn write_way(&mut self, way: &WayRecord) -> Result<(), Self::Error>;

    /// Dispatch a shaped element to the matching writer.
    fn write(&mut self, element: &ShapedElement) -> Result<(), Self::Error> {
        match element {
            ShapedElement::Node(node) => self.write_node(node),
            ShapedElement::Way(way) => self.write_way(way),
        }
    }
}

impl<S: RelationalSink + ?Sized> RelationalSink for &mut S {
    type Error = S::Error;

    fn write_node(&mut self, node: &NodeRecord) -> Result<(), Self::Error> {
        (**self).write_node(node)
    }

    fn write_way(&mut self, way: &WayRecord) -> Result<(), Self::Error> {
        (**self).write_way(way)
    }
}
