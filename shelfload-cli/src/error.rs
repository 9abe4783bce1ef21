//! Error types emitted by the shelfload CLI.
//!
//! Keep this error type reasonably small, as CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use shelfload_core::SqliteCatalogueStoreError;
use shelfload_data::IngestionError;
use thiserror::Error;

/// Errors emitted by the shelfload CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Opening or initialising the catalogue database failed.
    #[error("failed to open catalogue at {path:?}: {source}")]
    OpenCatalogue {
        /// Database location.
        path: Utf8PathBuf,
        /// Store error.
        #[source]
        source: Box<SqliteCatalogueStoreError>,
    },
    /// A dump could not be read to completion.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    /// Serialising the ingestion report failed.
    #[error("failed to serialise ingestion report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the ingestion summary failed.
    #[error("failed to write ingestion summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
