//! Integration tests for the single-audit passes over a document on disk.

use osmtidy_core::{CleaningConfig, Correction, PostcodeRules, StreetRules};
use osmtidy_data::{audit_document, audit_postcodes, audit_street_names, curitiba_overrides};
use rstest::{fixture, rstest};

#[expect(dead_code, reason = "coordinate helpers serve the cleaning scenarios only")]
mod support;

use support::{compress_fixture, fixture_path, utf8};

#[fixture]
fn curitiba_rules() -> StreetRules {
    let mut rules = StreetRules::default();
    rules.apply_overrides(curitiba_overrides().expect("compiled-in tables parse"));
    rules
}

#[rstest]
fn street_pass_buckets_by_leading_token(curitiba_rules: StreetRules) {
    let (problems, corrections) =
        audit_street_names(&fixture_path("curitiba_sample.osm"), &curitiba_rules)
            .expect("audit street names");
    let tokens: Vec<&str> = problems.keys().map(String::as_str).collect();
    assert_eq!(tokens, ["Av.", "Centro", "RUA"]);
    assert_eq!(
        corrections.get("Av. Brasil"),
        Some(&Correction::Replace("Avenida Brasil".into()))
    );
    assert_eq!(
        corrections.get("RUA VICENTE DE CARVALHO"),
        Some(&Correction::Replace("Rua Vicente de Carvalho".into()))
    );
    assert!(
        !corrections.contains("Centro Politécnico da UFPR, Caixa Postal 19100"),
        "special overrides are spliced by the shaper, not mapped"
    );
    assert_eq!(corrections.len(), 2);
}

#[rstest]
fn postcode_pass_repairs_and_rejects() {
    let corrections = audit_postcodes(
        &fixture_path("curitiba_sample.osm"),
        &PostcodeRules::default(),
    )
    .expect("audit postcodes");
    let entries: Vec<(&str, String)> = corrections
        .iter()
        .map(|(raw, correction)| (raw, correction.to_string()))
        .collect();
    assert_eq!(
        entries,
        [
            ("80.020-000", "80020-000".to_owned()),
            ("80000000", "Invalid".to_owned()),
            ("80020000", "80020-000".to_owned()),
        ]
    );
}

#[rstest]
fn combined_audit_matches_the_single_passes(curitiba_rules: StreetRules) {
    let path = fixture_path("curitiba_sample.osm");
    let config = CleaningConfig {
        street: curitiba_rules.clone(),
        ..CleaningConfig::default()
    };
    let report = audit_document(&path, &config).expect("combined audit");
    let (problems, streets) = audit_street_names(&path, &curitiba_rules).expect("street pass");
    let postcodes = audit_postcodes(&path, &config.postcode).expect("postcode pass");
    assert_eq!(report.street_problems, problems);
    assert_eq!(report.corrections.streets, streets);
    assert_eq!(report.corrections.postcodes, postcodes);
}

#[rstest]
fn compressed_documents_audit_identically() {
    let archive = compress_fixture("curitiba_sample.osm");
    let config = CleaningConfig::default();
    let plain = audit_document(&fixture_path("curitiba_sample.osm"), &config)
        .expect("audit plain document");
    let compressed = audit_document(&utf8(&archive), &config).expect("audit compressed document");
    assert_eq!(plain, compressed);
}
