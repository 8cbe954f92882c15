//! Clean command implementation for the osmtidy CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osmtidy_data::{CleanSummary, clean_to_sqlite};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_DATABASE, ARG_OSM_XML, ARG_OVERRIDES, ARG_VALIDATE, CliError, DEFAULT_DATABASE,
    ENV_CLEAN_OSM_XML, cleaning_config, require_existing,
};

/// CLI arguments for the `clean` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Audit an OSM XML document, apply the corrections and load \
                 the nodes, ways, tags and way memberships into a SQLite \
                 database. Existing tables are replaced; a failed run leaves \
                 the database untouched.",
    about = "Load a cleaned document into SQLite"
)]
#[ortho_config(prefix = "OSMTIDY")]
pub(crate) struct CleanArgs {
    /// Path to the OSM XML document.
    #[arg(long = ARG_OSM_XML, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_xml: Option<Utf8PathBuf>,
    /// SQLite database to write (defaults to `osm.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// JSON override tables replacing the built-in Curitiba ones.
    #[arg(long = ARG_OVERRIDES, value_name = "path")]
    #[serde(default)]
    pub(crate) overrides: Option<Utf8PathBuf>,
    /// Check every shaped record against the table schema.
    #[arg(long = ARG_VALIDATE)]
    #[serde(default)]
    pub(crate) validate: bool,
}

impl CleanArgs {
    pub(crate) fn into_config(self) -> Result<CleanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CleanConfig::try_from(merged)
    }
}

/// Resolved `clean` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CleanConfig {
    pub(crate) osm_xml: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
    pub(crate) overrides: Option<Utf8PathBuf>,
    pub(crate) validate: bool,
}

impl CleanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.osm_xml, ARG_OSM_XML)?;
        if let Some(overrides) = &self.overrides {
            require_existing(overrides, ARG_OVERRIDES)?;
        }
        Ok(())
    }
}

impl TryFrom<CleanArgs> for CleanConfig {
    type Error = CliError;

    fn try_from(args: CleanArgs) -> Result<Self, Self::Error> {
        let osm_xml = args.osm_xml.ok_or(CliError::MissingArgument {
            field: ARG_OSM_XML,
            env: ENV_CLEAN_OSM_XML,
        })?;
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        Ok(Self {
            osm_xml,
            database,
            overrides: args.overrides,
            validate: args.validate,
        })
    }
}

pub(crate) fn run_clean(args: CleanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let summary = execute_clean(&config)?;
    write_summary(writer, &config, &summary)
}

pub(crate) fn execute_clean(config: &CleanConfig) -> Result<CleanSummary, CliError> {
    let rules = cleaning_config(config.overrides.as_deref(), config.validate)?;
    let summary = clean_to_sqlite(&config.osm_xml, &config.database, &rules)?;
    info!(
        "cleaned {} into {} ({} nodes, {} ways)",
        config.osm_xml, config.database, summary.nodes, summary.ways
    );
    Ok(summary)
}

pub(crate) fn write_summary(
    writer: &mut dyn Write,
    config: &CleanConfig,
    summary: &CleanSummary,
) -> Result<(), CliError> {
    let lines = [
        format!("database: {}", config.database),
        format!("nodes: {} ({} tags)", summary.nodes, summary.node_tags),
        format!(
            "ways: {} ({} tags, {} memberships)",
            summary.ways, summary.way_tags, summary.way_nodes
        ),
        format!("relations skipped: {}", summary.relations),
        format!("tags dropped: {}", summary.dropped_tags),
        format!("street corrections: {}", summary.street_corrections),
        format!("postal code corrections: {}", summary.postcode_corrections),
    ];
    for line in lines {
        writeln!(writer, "{line}").map_err(CliError::WriteOutput)?;
    }
    if let Some(bounds) = summary.bounds {
        writeln!(
            writer,
            "bounds: {},{} to {},{}",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y
        )
        .map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CleanConfig, CliError> {
    let merged = CleanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CleanConfig::try_from(merged)
}
