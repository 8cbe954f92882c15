//! SQLite persistence for shaped rows.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use osmtidy_core::{
    NodeRecord, RelationalSink, Tag, WayRecord,
    shape::AttributeRow,
    sink::{NODE_TAGS_TABLE, NODES_TABLE, WAY_NODES_TABLE, WAY_TAGS_TABLE, WAYS_TABLE},
};
use rusqlite::{Connection, Error as SqliteError, Transaction, params_from_iter, types::Value};
use thiserror::Error;

use crate::fs::ensure_parent_dir;

const SCHEMA: &str = "
    DROP TABLE IF EXISTS nodes_tags;
    DROP TABLE IF EXISTS ways_tags;
    DROP TABLE IF EXISTS ways_nodes;
    DROP TABLE IF EXISTS nodes;
    DROP TABLE IF EXISTS ways;

    CREATE TABLE nodes (
        id INTEGER PRIMARY KEY NOT NULL,
        lat REAL,
        lon REAL,
        user TEXT,
        uid INTEGER,
        version INTEGER,
        changeset INTEGER,
        timestamp TEXT
    );

    CREATE TABLE nodes_tags (
        id INTEGER,
        key TEXT,
        value TEXT,
        type TEXT,
        FOREIGN KEY (id) REFERENCES nodes(id)
    );

    CREATE TABLE ways (
        id INTEGER PRIMARY KEY NOT NULL,
        user TEXT,
        uid INTEGER,
        version TEXT,
        changeset INTEGER,
        timestamp TEXT
    );

    CREATE TABLE ways_tags (
        id INTEGER NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        type TEXT,
        FOREIGN KEY (id) REFERENCES ways(id)
    );

    CREATE TABLE ways_nodes (
        id INTEGER NOT NULL,
        node_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        FOREIGN KEY (id) REFERENCES ways(id),
        FOREIGN KEY (node_id) REFERENCES nodes(id)
    );
";

const INSERT_NODE: &str = "INSERT INTO nodes (id, lat, lon, user, uid, version, changeset, timestamp) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const INSERT_WAY: &str = "INSERT INTO ways (id, user, uid, version, changeset, timestamp) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const INSERT_WAY_NODE: &str = "INSERT INTO ways_nodes (id, node_id, position) VALUES (?1, ?2, ?3)";

/// Errors raised when persisting rows to SQLite.
#[derive(Debug, Error)]
pub enum SqliteSinkError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Switching off foreign key enforcement failed.
    #[error("failed to disable foreign key enforcement")]
    DisableForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin row persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Dropping or creating the tables failed.
    #[error("failed to create the OSM tables")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a row failed.
    #[error("failed to write {table} row for element {id}")]
    Insert {
        /// Table being written.
        table: &'static str,
        /// Owning element id.
        id: i64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit row persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Open (or create) the database at `path`, creating parent directories.
pub fn open_database(path: &Utf8Path) -> Result<Connection, SqliteSinkError> {
    ensure_parent_dir(path).map_err(|source| SqliteSinkError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    Connection::open(path.as_std_path()).map_err(|source| SqliteSinkError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Sink writing rows into the five OSM tables inside one transaction.
///
/// The tables are dropped and re-created when the sink is started. Foreign
/// keys are declared but not enforced, so ways may reference nodes outside
/// the extract and override rows may name ids absent from their table. Rows only
/// become visible once [`SqliteSink::commit`] succeeds; dropping the sink
/// without committing rolls every write back.
///
/// # Examples
/// ```
/// use osmtidy_core::{
///     CleaningConfig, Corrections, ElementKind, ElementShaper, RawElement, RelationalSink,
/// };
/// use osmtidy_data::SqliteSink;
/// use rusqlite::Connection;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut connection = Connection::open_in_memory()?;
/// let config = CleaningConfig::default();
/// let corrections = Corrections::default();
/// let node = RawElement::new(ElementKind::Node)
///     .with_attribute("id", "1")
///     .with_tag("name", "Batel");
/// let shaped = ElementShaper::new(&config, &corrections).shape(&node)?;
///
/// let mut sink = SqliteSink::begin(&mut connection)?;
/// if let Some(shaped) = shaped {
///     sink.write(&shaped.element)?;
/// }
/// sink.commit()?;
///
/// let tags: i64 = connection.query_row("SELECT COUNT(*) FROM nodes_tags", [], |row| row.get(0))?;
/// assert_eq!(tags, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteSink<'conn> {
    transaction: Transaction<'conn>,
}

impl<'conn> SqliteSink<'conn> {
    /// Start a transaction and reset the OSM tables.
    pub fn begin(connection: &'conn mut Connection) -> Result<Self, SqliteSinkError> {
        // The pragma is ignored inside a transaction.
        connection
            .pragma_update(None, "foreign_keys", false)
            .map_err(|source| SqliteSinkError::DisableForeignKeys { source })?;
        let transaction = connection
            .transaction()
            .map_err(|source| SqliteSinkError::BeginTransaction { source })?;
        transaction
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteSinkError::CreateSchema { source })?;
        Ok(Self { transaction })
    }

    /// Commit every row written so far.
    pub fn commit(self) -> Result<(), SqliteSinkError> {
        self.transaction
            .commit()
            .map_err(|source| SqliteSinkError::Commit { source })
    }

    fn insert_feature(
        &self,
        sql: &str,
        table: &'static str,
        id: i64,
        attributes: &AttributeRow,
    ) -> Result<(), SqliteSinkError> {
        let values = std::iter::once(Value::Integer(id)).chain(attributes.iter().map(
            |(_, value)| value.map_or(Value::Null, |text| Value::Text(text.to_owned())),
        ));
        self.transaction
            .prepare_cached(sql)
            .and_then(|mut statement| statement.execute(params_from_iter(values)))
            .map(|_| ())
            .map_err(|source| SqliteSinkError::Insert { table, id, source })
    }

    fn insert_tags(&self, table: &'static str, tags: &[Tag]) -> Result<(), SqliteSinkError> {
        if tags.is_empty() {
            return Ok(());
        }
        let sql = format!("INSERT INTO {table} (id, key, value, type) VALUES (?1, ?2, ?3, ?4)");
        let mut statement = self
            .transaction
            .prepare_cached(&sql)
            .map_err(|source| SqliteSinkError::Insert {
                table,
                id: tags.first().map_or(0, |tag| tag.id),
                source,
            })?;
        for tag in tags {
            statement
                .execute((tag.id, &tag.key, &tag.value, &tag.namespace))
                .map_err(|source| SqliteSinkError::Insert {
                    table,
                    id: tag.id,
                    source,
                })?;
        }
        Ok(())
    }
}

impl RelationalSink for SqliteSink<'_> {
    type Error = SqliteSinkError;

    fn write_node(&mut self, node: &NodeRecord) -> Result<(), Self::Error> {
        self.insert_feature(INSERT_NODE, NODES_TABLE, node.id, &node.attributes)?;
        self.insert_tags(NODE_TAGS_TABLE, &node.tags)
    }

    fn write_way(&mut self, way: &WayRecord) -> Result<(), Self::Error> {
        self.insert_feature(INSERT_WAY, WAYS_TABLE, way.id, &way.attributes)?;
        if !way.members.is_empty() {
            let mut statement = self
                .transaction
                .prepare_cached(INSERT_WAY_NODE)
                .map_err(|source| SqliteSinkError::Insert {
                    table: WAY_NODES_TABLE,
                    id: way.id,
                    source,
                })?;
            for member in &way.members {
                statement
                    .execute((member.way_id, member.node_id, member.position))
                    .map_err(|source| SqliteSinkError::Insert {
                        table: WAY_NODES_TABLE,
                        id: way.id,
                        source,
                    })?;
            }
        }
        self.insert_tags(WAY_TAGS_TABLE, &way.tags)
    }
}
