//! Test helpers for laying out OSM documents and override files on disk.

use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::Connection;
use std::fs;
use tempfile::TempDir;

/// A small extract: one abbreviated street, one override target, one street
/// type the rules do not know, plus a postal code in and one out of range.
pub(super) const SAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="osmtidy tests">
  <node id="1" lat="-25.4300" lon="-49.2700" version="1" timestamp="2016-01-01T00:00:00Z" changeset="10" uid="5" user="ana">
    <tag k="addr:street" v="Av. Sete de Setembro"/>
    <tag k="addr:postcode" v="80060070"/>
  </node>
  <node id="2" lat="-25.4400" lon="-49.2800" version="2" timestamp="2016-01-02T00:00:00Z" changeset="11" uid="6" user="bruno">
    <tag k="addr:street" v="Servidão Alfa"/>
    <tag k="addr:postcode" v="79999999"/>
  </node>
  <node id="3" lat="-25.4500" lon="-49.2900" version="1" timestamp="2016-01-03T00:00:00Z" changeset="12" uid="5" user="ana">
    <tag k="addr:street" v="Filipinas"/>
  </node>
  <way id="10" version="1" timestamp="2016-01-04T00:00:00Z" changeset="13" uid="6" user="bruno">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="highway" v="residential"/>
  </way>
</osm>
"#;

/// Override file renaming the street the built-in tables leave alone.
pub(super) const ALFA_OVERRIDES: &str = r#"{"street": {"Servidão Alfa": "Rua Alfa"}}"#;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub(super) fn sample_document(&self) -> Utf8PathBuf {
        self.write("sample.osm", SAMPLE_DOCUMENT)
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("out/osm.db")
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace").field("root", &self.root).finish()
    }
}

/// Values of one query column, as text.
pub(super) fn column(database: &Utf8Path, sql: &str) -> Vec<String> {
    let connection = Connection::open(database.as_std_path()).expect("open database");
    let mut statement = connection.prepare(sql).expect("prepare query");
    statement
        .query_map([], |row| row.get(0))
        .expect("run query")
        .collect::<Result<_, _>>()
        .expect("read rows")
}
