//! Behavioural tests for the `clean_to_sqlite` entry point.

use camino::{Utf8Path, Utf8PathBuf};
use osmtidy_core::{CleaningConfig, ElementKind, ElementRef, SchemaProblem, SchemaViolation};
use osmtidy_data::{CleanError, CleanSummary, SourceError, clean_to_sqlite, curitiba_overrides};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use rusqlite::Connection;
use std::{cell::RefCell, fs, path::PathBuf};
use tempfile::{TempDir, TempPath};

mod support;

use support::{assert_close, compress_fixture, fixture_path, utf8};

enum DocumentTarget {
    Fixture(Utf8PathBuf),
    Compressed(TempPath),
}

impl DocumentTarget {
    fn path(&self) -> Utf8PathBuf {
        match self {
            Self::Fixture(path) => path.clone(),
            Self::Compressed(temp) => utf8(temp),
        }
    }
}

type Outcome = RefCell<Option<Result<CleanSummary, CleanError>>>;

#[fixture]
fn document() -> RefCell<Option<DocumentTarget>> {
    RefCell::new(None)
}

#[fixture]
fn config() -> RefCell<CleaningConfig> {
    RefCell::new(CleaningConfig {
        validate_schema: true,
        ..CleaningConfig::default()
    })
}

#[fixture]
fn workspace() -> TempDir {
    TempDir::new().expect("create temp dir")
}

#[fixture]
fn outcome() -> Outcome {
    RefCell::new(None)
}

fn database_path(workspace: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(workspace.path().join("out/osm.db")).expect("utf-8 path")
}

fn open(workspace: &TempDir) -> Connection {
    Connection::open(database_path(workspace).as_std_path()).expect("open database")
}

fn expect_summary(outcome: &Outcome) -> CleanSummary {
    outcome
        .borrow()
        .as_ref()
        .expect("cleaning was attempted")
        .as_ref()
        .expect("expected a successful run")
        .clone()
}

fn stored_values(connection: &Connection, sql: &str) -> Vec<String> {
    let mut statement = connection.prepare(sql).expect("prepare query");
    statement
        .query_map([], |row| row.get(0))
        .expect("run query")
        .collect::<Result<_, _>>()
        .expect("read rows")
}

#[given("the Curitiba sample document")]
fn sample_document(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Fixture(fixture_path("curitiba_sample.osm")));
}

#[given("the Curitiba override tables")]
fn curitiba_tables(#[from(config)] config: &RefCell<CleaningConfig>) {
    let tables = curitiba_overrides().expect("compiled-in tables parse");
    config.borrow_mut().street.apply_overrides(tables);
}

#[given("the Curitiba sample document compressed with bzip2")]
fn compressed_document(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Compressed(compress_fixture(
        "curitiba_sample.osm",
    )));
}

#[given("a truncated document")]
fn truncated_document(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Fixture(fixture_path("truncated.osm")));
}

#[given("a path to a missing document")]
fn missing_document(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Fixture(fixture_path("missing.osm")));
}

#[given("a document with a non-numeric latitude")]
fn invalid_latitude_document(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Fixture(fixture_path(
        "invalid_latitude.osm",
    )));
}

#[given("a clipped extract whose way references a missing node")]
fn clipped_extract(#[from(document)] target: &RefCell<Option<DocumentTarget>>) {
    *target.borrow_mut() = Some(DocumentTarget::Fixture(fixture_path("clipped_extract.osm")));
}

#[when("the document is cleaned into a SQLite database")]
fn clean(
    #[from(document)] target: &RefCell<Option<DocumentTarget>>,
    #[from(config)] config: &RefCell<CleaningConfig>,
    #[from(workspace)] workspace: &TempDir,
    #[from(outcome)] outcome: &Outcome,
) {
    let result = {
        let guard = target.borrow();
        let document = guard.as_ref().expect("document prepared").path();
        clean_to_sqlite(&document, &database_path(workspace), &config.borrow())
    };
    *outcome.borrow_mut() = Some(result);
}

#[then("the database holds 4 nodes, 1 way and 3 memberships")]
fn row_counts(#[from(workspace)] workspace: &TempDir, #[from(outcome)] outcome: &Outcome) {
    let summary = expect_summary(outcome);
    assert_eq!(summary.nodes, 4, "expected four nodes");
    assert_eq!(summary.ways, 1, "expected one way");
    assert_eq!(summary.relations, 1, "expected the relation to be skipped");
    assert_eq!(summary.way_nodes, 3, "expected three memberships");

    let connection = open(workspace);
    let positions = stored_values(
        &connection,
        "SELECT CAST(node_id AS TEXT) FROM ways_nodes WHERE id = 201 ORDER BY position",
    );
    assert_eq!(positions, ["101", "102", "104"]);
    let nodes: i64 = connection
        .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
        .expect("count nodes");
    assert_eq!(nodes, 4);
}

#[then("abbreviated and shouted street names are corrected")]
fn corrected_streets(#[from(workspace)] workspace: &TempDir) {
    let connection = open(workspace);
    let streets = stored_values(
        &connection,
        "SELECT value FROM nodes_tags WHERE key = 'street' AND id IN (101, 102) ORDER BY id",
    );
    assert_eq!(streets, ["Avenida Brasil", "Rua Vicente de Carvalho"]);
    let way_street = stored_values(
        &connection,
        "SELECT value FROM ways_tags WHERE key = 'street' AND type = 'addr'",
    );
    assert_eq!(way_street, ["Rua XV de Novembro"]);
}

#[then("the postal code below the region range is dropped")]
fn dropped_postcode(#[from(workspace)] workspace: &TempDir, #[from(outcome)] outcome: &Outcome) {
    let connection = open(workspace);
    let postcodes = stored_values(
        &connection,
        "SELECT CAST(id AS TEXT) || '=' || value FROM nodes_tags WHERE key = 'postcode' ORDER BY id",
    );
    assert_eq!(postcodes, ["101=80020-000"]);
    let way_postcodes = stored_values(
        &connection,
        "SELECT value FROM ways_tags WHERE key = 'postal_code' AND type = 'regular'",
    );
    assert_eq!(way_postcodes, ["80020-000"]);
    assert_eq!(
        expect_summary(outcome).dropped_tags,
        2,
        "the invalid postal code and the broken key should both be dropped"
    );
}

#[then("the special override rows replace the Politécnico street")]
fn special_rows(#[from(workspace)] workspace: &TempDir) {
    let connection = open(workspace);
    let rows = stored_values(
        &connection,
        "SELECT type || ':' || key || '=' || value FROM nodes_tags WHERE id = 3794309563",
    );
    assert_eq!(
        rows,
        [
            "regular:name=Centro Politécnico da UFPR, Caixa Postal 19100",
            "addr:street=Avenida Coronel Francisco H. dos Santos",
        ]
    );
}

#[then("the summary bounding box spans the sample coordinates")]
fn summary_bounds(#[from(outcome)] outcome: &Outcome) {
    let summary = expect_summary(outcome);
    let bounds = summary
        .bounds
        .expect("sample data should produce a bounding box");
    assert_close(bounds.min().x, -49.3);
    assert_close(bounds.max().x, -49.23);
    assert_close(bounds.min().y, -25.451);
    assert_close(bounds.max().y, -25.4);
}

#[then("a source error is reported")]
fn source_error(#[from(outcome)] outcome: &Outcome) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref().expect("cleaning was attempted") {
        Ok(_) => panic!("expected the truncated document to fail"),
        Err(CleanError::Source(SourceError::Truncated { path, .. } | SourceError::Xml { path, .. })) => {
            assert!(path.ends_with("truncated.osm"), "unexpected path {path}");
        }
        Err(other) => panic!("expected a source error, got {other:?}"),
    }
}

#[then("no tables are committed")]
fn nothing_committed(#[from(workspace)] workspace: &TempDir) {
    let path = database_path(workspace);
    if !path.exists() {
        return;
    }
    let connection = open(workspace);
    let tables: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .expect("inspect schema");
    assert_eq!(tables, 0, "a failed run must not leave tables behind");
}

#[then("a schema violation names node 2 and its lat field")]
fn schema_violation(#[from(outcome)] outcome: &Outcome) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref().expect("cleaning was attempted") {
        Ok(_) => panic!("expected the invalid latitude to abort the run"),
        Err(CleanError::Schema(violation)) => assert_eq!(
            violation,
            &SchemaViolation {
                element: ElementRef {
                    kind: ElementKind::Node,
                    id: 2,
                },
                field: "lat",
                problem: SchemaProblem::NotAFloat("north".into()),
            }
        ),
        Err(other) => panic!("expected a schema violation, got {other:?}"),
    }
}

#[then("the way keeps its reference to the missing node")]
fn dangling_reference(#[from(workspace)] workspace: &TempDir, #[from(outcome)] outcome: &Outcome) {
    let summary = expect_summary(outcome);
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.way_nodes, 2);
    let connection = open(workspace);
    let members = stored_values(
        &connection,
        "SELECT CAST(node_id AS TEXT) FROM ways_nodes WHERE id = 10 ORDER BY position",
    );
    assert_eq!(members, ["1", "999"]);
}

#[then("an open error is reported")]
fn open_error(#[from(outcome)] outcome: &Outcome) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref().expect("cleaning was attempted") {
        Ok(_) => panic!("expected an error for the missing file"),
        Err(CleanError::Source(SourceError::Open { path, .. })) => {
            assert!(
                Utf8Path::new(path).ends_with("missing.osm"),
                "unexpected path in error: {path}"
            );
        }
        Err(other) => panic!("expected an open error, got {other:?}"),
    }
}

#[scenario(path = "tests/features/clean_document.feature", index = 0)]
fn loading_the_sample(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[scenario(path = "tests/features/clean_document.feature", index = 1)]
fn reading_compressed_documents(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[scenario(path = "tests/features/clean_document.feature", index = 2)]
fn rejecting_truncated_documents(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[scenario(path = "tests/features/clean_document.feature", index = 3)]
fn reporting_missing_documents(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[scenario(path = "tests/features/clean_document.feature", index = 4)]
fn aborting_on_schema_violations(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[scenario(path = "tests/features/clean_document.feature", index = 5)]
fn keeping_ways_that_leave_the_extract(
    document: RefCell<Option<DocumentTarget>>,
    config: RefCell<CleaningConfig>,
    workspace: TempDir,
    outcome: Outcome,
) {
    let _ = (document, config, workspace, outcome);
}

#[test]
fn scenario_indices_follow_feature_order() {
    let feature =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/features/clean_document.feature");
    let contents = fs::read_to_string(&feature).unwrap_or_else(|err| {
        panic!("failed to read feature file {feature:?}: {err}");
    });
    let titles: Vec<&str> = contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .collect();
    assert_eq!(
        titles,
        [
            "loading the Curitiba sample",
            "reading a bzip2 compressed document",
            "rejecting a truncated document",
            "reporting a missing document",
            "aborting on a schema violation",
            "keeping ways that leave the extract",
        ]
    );
}
