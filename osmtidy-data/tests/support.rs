use bzip2::{Compression, write::BzEncoder};
use camino::Utf8PathBuf;
use std::{fs, io::Write, path::PathBuf};
use tempfile::{Builder, TempPath};

/// Epsilon for floating-point coordinate comparisons in tests
const COORDINATE_EPSILON: f64 = 1.0e-7;

/// Directory containing the XML fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// UTF-8 path of a named fixture.
pub fn fixture_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(fixtures_dir().join(name))
        .unwrap_or_else(|path| panic!("fixture path {path:?} is not UTF-8"))
}

/// Compress a fixture into a temporary `.osm.bz2` file.
pub fn compress_fixture(name: &str) -> TempPath {
    let source = fixtures_dir().join(name);
    let contents = fs::read(&source).unwrap_or_else(|err| {
        panic!("failed to read fixture {source:?}: {err}");
    });
    let file = Builder::new()
        .prefix("osmtidy")
        .suffix(".osm.bz2")
        .tempfile()
        .unwrap_or_else(|err| panic!("failed to create temporary archive: {err}"));
    let mut encoder = BzEncoder::new(file, Compression::default());
    encoder.write_all(&contents).unwrap_or_else(|err| {
        panic!("failed to compress fixture {source:?}: {err}");
    });
    let file = encoder
        .finish()
        .unwrap_or_else(|err| panic!("failed to finish archive: {err}"));
    file.into_temp_path()
}

/// UTF-8 view of a temporary path.
pub fn utf8(path: &TempPath) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .unwrap_or_else(|path| panic!("temporary path {path:?} is not UTF-8"))
}

/// Compare floating-point coordinates within a small epsilon.
#[expect(
    clippy::float_arithmetic,
    reason = "test delta computation requires float maths"
)]
pub fn assert_close(actual: f64, expected: f64) {
    let delta = (actual - expected).abs();
    assert!(
        delta <= COORDINATE_EPSILON,
        "expected {expected}, got {actual} (|Δ| = {delta})"
    );
}
