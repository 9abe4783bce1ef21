//! Orchestrates a full ingestion: the author phase, then the book phase.
//!
//! The book phase resolves author names against whatever the author phase
//! left in the store, so the two phases always run in that order and a fatal
//! author error stops the run before any book is read.

use camino::Utf8PathBuf;
use log::info;
use serde::Serialize;
use shelfload_core::{AuthorStore, BookStore};
use thiserror::Error;

use crate::load::{AuthorLoader, BookLoader, LoadError, LoadReport};

/// Locations of the two dumps consumed by [`run_ingestion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionPlan {
    /// Authors dump (plain, `.gz` or `.bz2`).
    pub authors_dump: Utf8PathBuf,
    /// Works dump (plain, `.gz` or `.bz2`).
    pub works_dump: Utf8PathBuf,
}

impl IngestionPlan {
    /// Build a plan from the two dump paths.
    #[must_use]
    pub fn new(authors_dump: impl Into<Utf8PathBuf>, works_dump: impl Into<Utf8PathBuf>) -> Self {
        Self {
            authors_dump: authors_dump.into(),
            works_dump: works_dump.into(),
        }
    }
}

/// Per-phase reports from a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Author phase outcome.
    pub authors: LoadReport,
    /// Book phase outcome.
    pub books: LoadReport,
}

impl IngestionReport {
    /// Whether either phase skipped or failed a line.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        !(self.authors.is_clean() && self.books.is_clean())
    }
}

/// Errors that stop an ingestion run.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The author phase could not complete; no book was read.
    #[error("author phase failed: {0}")]
    Authors(#[source] LoadError),
    /// The book phase could not complete after the author phase finished.
    #[error("book phase failed after {} author(s) were written: {source}", .authors.records_written)]
    Books {
        /// Report of the completed author phase.
        authors: Box<LoadReport>,
        /// Fatal book phase error.
        #[source]
        source: LoadError,
    },
}

/// Load the authors dump, then the works dump, into the given stores.
///
/// `authors` receives every author and is then used to resolve book author
/// names; `books` receives every book. Both may be the same store.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use shelfload_core::SqliteCatalogueStore;
/// use shelfload_data::{IngestionPlan, run_ingestion};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteCatalogueStore::open(Utf8Path::new("catalogue.db"))?;
/// let plan = IngestionPlan::new(
///     "ol_dump_authors_latest.txt.gz",
///     "ol_dump_works_latest.txt.gz",
/// );
/// let report = run_ingestion(&plan, &store, &store)?;
/// println!("{} books written", report.books.records_written);
/// # Ok(())
/// # }
/// ```
pub fn run_ingestion<A, B>(
    plan: &IngestionPlan,
    authors: &A,
    books: &B,
) -> Result<IngestionReport, IngestionError>
where
    A: AuthorStore,
    B: BookStore,
{
    info!("ingestion: author phase started");
    let author_report = AuthorLoader::new(authors)
        .load_path(&plan.authors_dump)
        .map_err(IngestionError::Authors)?;

    info!("ingestion: book phase started");
    let book_report = match BookLoader::new(authors, books).load_path(&plan.works_dump) {
        Ok(report) => report,
        Err(source) => {
            return Err(IngestionError::Books {
                authors: Box::new(author_report),
                source,
            });
        }
    };

    info!(
        "ingestion: finished with {} author(s) and {} book(s) written",
        author_report.records_written, book_report.records_written
    );
    Ok(IngestionReport {
        authors: author_report,
        books: book_report,
    })
}
