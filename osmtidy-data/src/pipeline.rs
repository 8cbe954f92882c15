//! End-to-end cleaning runs.
//!
//! A run audits the document, then streams it a second time through the
//! shaper into a sink. The correction maps are fixed before the second pass
//! starts.

use camino::Utf8Path;
use geo::{Coord, Rect};
use log::{info, warn};
use osmtidy_core::{
    AuditReport, CleaningConfig, ElementKind, ElementRef, ElementShaper, RelationalSink,
    SchemaViolation, ShapeError, ShapedElement, schema,
};
use thiserror::Error;

use crate::{
    SourceError, SqliteSink, SqliteSinkError, audit_document, open_database, open_elements,
};

const ALL_KINDS: [ElementKind; 3] = [ElementKind::Node, ElementKind::Way, ElementKind::Relation];

/// Errors raised by a cleaning run.
#[derive(Debug, Error)]
pub enum CleanError {
    /// Reading the document failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// An element could not be shaped.
    #[error("failed to shape element")]
    Shape(#[from] ShapeError),
    /// A shaped record failed schema validation.
    #[error("schema validation failed")]
    Schema(#[from] SchemaViolation),
    /// Opening or committing the SQLite database failed.
    #[error(transparent)]
    Database(#[from] SqliteSinkError),
    /// The sink rejected an element's rows.
    #[error("sink rejected rows for {element}")]
    Sink {
        /// Element being written.
        element: ElementRef,
        /// Source error from the sink.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Counts and extent of a completed run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanSummary {
    /// Nodes written.
    pub nodes: u64,
    /// Ways written.
    pub ways: u64,
    /// Relations read and skipped.
    pub relations: u64,
    /// Node tag rows written.
    pub node_tags: u64,
    /// Way tag rows written.
    pub way_tags: u64,
    /// Membership rows written.
    pub way_nodes: u64,
    /// Tags dropped for rejected keys or invalid postal codes.
    pub dropped_tags: u64,
    /// Street values with a correction.
    pub street_corrections: u64,
    /// Postal codes with a correction or an invalid marker.
    pub postcode_corrections: u64,
    /// Bounding box of node coordinates, if any were valid.
    /// Coordinates are WGS84 with `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
}

impl CleanSummary {
    fn record(&mut self, element: &ShapedElement, dropped: usize) {
        self.dropped_tags += dropped as u64;
        match element {
            ShapedElement::Node(node) => {
                self.nodes += 1;
                self.node_tags += node.tags.len() as u64;
                let coordinate = node
                    .attributes
                    .get("lon")
                    .zip(node.attributes.get("lat"))
                    .and_then(|(lon, lat)| Some((lon.parse().ok()?, lat.parse().ok()?)));
                if let Some((lon, lat)) = coordinate {
                    self.include(lon, lat);
                }
            }
            ShapedElement::Way(way) => {
                self.ways += 1;
                self.way_nodes += way.members.len() as u64;
                self.way_tags += way.tags.len() as u64;
            }
        }
    }

    fn include(&mut self, lon: f64, lat: f64) {
        if !(lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat))
        {
            return;
        }
        let point = Coord { x: lon, y: lat };
        self.bounds = Some(match self.bounds {
            Some(existing) => Rect::new(
                Coord {
                    x: existing.min().x.min(lon),
                    y: existing.min().y.min(lat),
                },
                Coord {
                    x: existing.max().x.max(lon),
                    y: existing.max().y.max(lat),
                },
            ),
            None => Rect::new(point, point),
        });
    }
}

/// Shape every element of a document into `sink` using fixed corrections.
///
/// The sink is not committed; that is the caller's decision.
pub fn shape_document<S: RelationalSink>(
    path: &Utf8Path,
    config: &CleaningConfig,
    report: &AuditReport,
    mut sink: S,
) -> Result<CleanSummary, CleanError> {
    let shaper = ElementShaper::new(config, &report.corrections);
    let mut summary = CleanSummary {
        street_corrections: report.corrections.streets.len() as u64,
        postcode_corrections: report.corrections.postcodes.len() as u64,
        ..CleanSummary::default()
    };

    for element in open_elements(path, &ALL_KINDS)? {
        let element = element?;
        let Some(shaped) = shaper.shape(&element)? else {
            summary.relations += 1;
            continue;
        };
        if config.validate_schema {
            schema::validate(&shaped.element)?;
        }
        sink.write(&shaped.element)
            .map_err(|source| CleanError::Sink {
                element: shaped.element.element_ref(),
                source: Box::new(source),
            })?;
        summary.record(&shaped.element, shaped.dropped_tags);
    }

    if summary.nodes == 0 && summary.ways == 0 {
        warn!("{path} contained no nodes or ways");
    }
    info!(
        "shaped {} nodes and {} ways from {path} ({} tags dropped, {} relations skipped)",
        summary.nodes, summary.ways, summary.dropped_tags, summary.relations
    );
    Ok(summary)
}

/// Audit a document and shape it into `sink`.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use osmtidy_core::{CleaningConfig, test_support::RecordingSink};
/// use osmtidy_data::clean_document;
///
/// # fn main() -> Result<(), osmtidy_data::CleanError> {
/// let mut sink = RecordingSink::default();
/// let config = CleaningConfig::default();
/// let summary = clean_document(Utf8Path::new("curitiba.osm"), &config, &mut sink)?;
/// assert_eq!(summary.node_tags as usize, sink.node_tags.len());
/// # Ok(())
/// # }
/// ```
pub fn clean_document<S: RelationalSink>(
    path: &Utf8Path,
    config: &CleaningConfig,
    sink: S,
) -> Result<CleanSummary, CleanError> {
    let report = audit_document(path, config)?;
    shape_document(path, config, &report, sink)
}

/// Audit a document and load it into the SQLite database at `database`.
///
/// The five tables are replaced atomically: on any error nothing is
/// committed.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use osmtidy_core::CleaningConfig;
/// use osmtidy_data::clean_to_sqlite;
///
/// # fn main() -> Result<(), osmtidy_data::CleanError> {
/// let summary = clean_to_sqlite(
///     Utf8Path::new("curitiba.osm"),
///     Utf8Path::new("curitiba.db"),
///     &CleaningConfig::default(),
/// )?;
/// println!("{} nodes, {} ways", summary.nodes, summary.ways);
/// # Ok(())
/// # }
/// ```
pub fn clean_to_sqlite(
    osm_path: &Utf8Path,
    database: &Utf8Path,
    config: &CleaningConfig,
) -> Result<CleanSummary, CleanError> {
    let report = audit_document(osm_path, config)?;
    let mut connection = open_database(database)?;
    let mut sink = SqliteSink::begin(&mut connection)?;
    let summary = shape_document(osm_path, config, &report, &mut sink)?;
    sink.commit()?;
    info!("committed rows to {database}");
    Ok(summary)
}
