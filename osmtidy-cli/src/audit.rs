//! Audit command implementation for the osmtidy CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osmtidy_core::{AuditReport, Correction, CorrectionMap};
use osmtidy_data::audit_document;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_HIGHLIGHT_UNCHANGED, ARG_OSM_XML, ARG_OVERRIDES, CliError, ENV_AUDIT_OSM_XML,
    cleaning_config, require_existing,
};

/// CLI arguments for the `audit` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Scan an OSM XML document (plain or bzip2) and print every \
                 street name and postal code that the clean command would \
                 rewrite, as `raw => corrected` lines.",
    about = "Print the corrections for a document"
)]
#[ortho_config(prefix = "OSMTIDY")]
pub(crate) struct AuditArgs {
    /// Path to the OSM XML document.
    #[arg(long = ARG_OSM_XML, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_xml: Option<Utf8PathBuf>,
    /// JSON override tables replacing the built-in Curitiba ones.
    #[arg(long = ARG_OVERRIDES, value_name = "path")]
    #[serde(default)]
    pub(crate) overrides: Option<Utf8PathBuf>,
    /// Prefix entries left unchanged or marked invalid with `* `.
    #[arg(long = ARG_HIGHLIGHT_UNCHANGED)]
    #[serde(default)]
    pub(crate) highlight_unchanged: bool,
}

impl AuditArgs {
    pub(crate) fn into_config(self) -> Result<AuditConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AuditConfig::try_from(merged)
    }
}

/// Resolved `audit` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuditConfig {
    pub(crate) osm_xml: Utf8PathBuf,
    pub(crate) overrides: Option<Utf8PathBuf>,
    pub(crate) highlight_unchanged: bool,
}

impl AuditConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.osm_xml, ARG_OSM_XML)?;
        if let Some(overrides) = &self.overrides {
            require_existing(overrides, ARG_OVERRIDES)?;
        }
        Ok(())
    }
}

impl TryFrom<AuditArgs> for AuditConfig {
    type Error = CliError;

    fn try_from(args: AuditArgs) -> Result<Self, Self::Error> {
        let osm_xml = args.osm_xml.ok_or(CliError::MissingArgument {
            field: ARG_OSM_XML,
            env: ENV_AUDIT_OSM_XML,
        })?;
        Ok(Self {
            osm_xml,
            overrides: args.overrides,
            highlight_unchanged: args.highlight_unchanged,
        })
    }
}

pub(crate) fn run_audit(args: AuditArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = execute_audit(&config)?;
    write_report(writer, &report, config.highlight_unchanged)
}

pub(crate) fn execute_audit(config: &AuditConfig) -> Result<AuditReport, CliError> {
    let rules = cleaning_config(config.overrides.as_deref(), false)?;
    Ok(audit_document(&config.osm_xml, &rules)?)
}

/// Street corrections first, then postal codes, each ordered by raw value.
pub(crate) fn write_report(
    writer: &mut dyn Write,
    report: &AuditReport,
    highlight_unchanged: bool,
) -> Result<(), CliError> {
    write_corrections(writer, &report.corrections.streets, highlight_unchanged)?;
    write_corrections(writer, &report.corrections.postcodes, highlight_unchanged)
}

fn write_corrections(
    writer: &mut dyn Write,
    map: &CorrectionMap,
    highlight_unchanged: bool,
) -> Result<(), CliError> {
    for (raw, correction) in map.iter() {
        let marker = if highlight_unchanged && is_unrepaired(raw, correction) {
            "* "
        } else {
            ""
        };
        writeln!(writer, "{marker}{raw} => {correction}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

fn is_unrepaired(raw: &str, correction: &Correction) -> bool {
    correction
        .replacement()
        .is_none_or(|replacement| replacement == raw)
}
