//! Ingest command implementation for the shelfload CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use shelfload_core::SqliteCatalogueStore;
use shelfload_data::{IngestionPlan, IngestionReport, LoadReport, run_ingestion};

use crate::{
    ARG_AUTHORS_DUMP, ARG_DATABASE, ARG_WORKS_DUMP, CliError, ENV_AUTHORS_DUMP, ENV_DATABASE,
    ENV_WORKS_DUMP,
};

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the Open Library authors dump and then the works dump \
                 into a SQLite catalogue. Paths can come from CLI flags, \
                 configuration files, or environment variables. Dumps ending \
                 in .gz or .bz2 are decompressed on the fly.",
    about = "Load author and work dumps into the catalogue"
)]
#[ortho_config(prefix = "SHELFLOAD")]
pub(crate) struct IngestArgs {
    /// Path to the authors dump.
    #[arg(long = ARG_AUTHORS_DUMP, value_name = "path")]
    #[serde(default)]
    pub(crate) authors_dump: Option<Utf8PathBuf>,
    /// Path to the works dump.
    #[arg(long = ARG_WORKS_DUMP, value_name = "path")]
    #[serde(default)]
    pub(crate) works_dump: Option<Utf8PathBuf>,
    /// Path to the SQLite catalogue; created when absent.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Print the full report as JSON instead of a summary.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) json: bool,
}

impl IngestArgs {
    pub(crate) fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) authors_dump: Utf8PathBuf,
    pub(crate) works_dump: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
    pub(crate) json: bool,
}

impl IngestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.authors_dump, ARG_AUTHORS_DUMP)?;
        Self::require_existing(&self.works_dump, ARG_WORKS_DUMP)?;
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        let inspected = fs_utf8::File::open_ambient(path, ambient_authority())
            .and_then(|file| file.metadata());
        match inspected {
            Ok(metadata) if metadata.is_file() => Ok(()),
            Ok(_) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub(crate) fn plan(&self) -> IngestionPlan {
        IngestionPlan::new(self.authors_dump.clone(), self.works_dump.clone())
    }
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let authors_dump = args.authors_dump.ok_or(CliError::MissingArgument {
            field: ARG_AUTHORS_DUMP,
            env: ENV_AUTHORS_DUMP,
        })?;
        let works_dump = args.works_dump.ok_or(CliError::MissingArgument {
            field: ARG_WORKS_DUMP,
            env: ENV_WORKS_DUMP,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        Ok(Self {
            authors_dump,
            works_dump,
            database,
            json: args.json,
        })
    }
}

/// Result of a completed ingest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestOutcome {
    pub(crate) database: Utf8PathBuf,
    pub(crate) report: IngestionReport,
}

pub(crate) fn run_ingest(
    args: IngestArgs,
    writer: &mut dyn Write,
) -> Result<IngestOutcome, CliError> {
    let config = resolve_ingest_config(args)?;
    let outcome = execute_ingest(&config)?;
    if config.json {
        write_json_report(writer, &outcome.report)?;
    } else {
        write_summary(writer, &outcome)?;
    }
    Ok(outcome)
}

pub(crate) fn resolve_ingest_config(args: IngestArgs) -> Result<IngestConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_ingest(config: &IngestConfig) -> Result<IngestOutcome, CliError> {
    info!("opening catalogue at {}", config.database);
    let store =
        SqliteCatalogueStore::open(&config.database).map_err(|source| CliError::OpenCatalogue {
            path: config.database.clone(),
            source: Box::new(source),
        })?;
    let report = run_ingestion(&config.plan(), &store, &store)?;
    Ok(IngestOutcome {
        database: config.database.clone(),
        report,
    })
}

fn write_json_report(writer: &mut dyn Write, report: &IngestionReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSummary)?;
    writer.write_all(b"\n").map_err(CliError::WriteSummary)?;
    Ok(())
}

fn write_summary(writer: &mut dyn Write, outcome: &IngestOutcome) -> Result<(), CliError> {
    write_phase(writer, "authors", &outcome.report.authors)?;
    write_phase(writer, "books", &outcome.report.books)?;
    writeln!(writer, "catalogue: {}", outcome.database).map_err(CliError::WriteSummary)
}

fn write_phase(writer: &mut dyn Write, label: &str, report: &LoadReport) -> Result<(), CliError> {
    writeln!(
        writer,
        "{label}: {} written, {} skipped, {} failed ({} lines)",
        report.records_written, report.skipped, report.failed, report.lines_read
    )
    .map_err(CliError::WriteSummary)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<IngestConfig, CliError> {
    let merged = IngestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    IngestConfig::try_from(merged)
}
