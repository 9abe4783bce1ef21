use std::io::BufRead;

use camino::Utf8Path;
use log::{debug, info};
use shelfload_core::{AuthorRecord, AuthorStore};

use crate::dump::{ParsedLine, open_dump, parse_line};

use super::{LoadError, LoadReport, RecordError, drive, field_defaulted};

/// Prefix removed from author keys to form the record id.
pub const AUTHOR_KEY_PREFIX: &str = "/authors/";

const LABEL: &str = "authors";

/// Loads author dumps into an [`AuthorStore`].
#[derive(Debug)]
pub struct AuthorLoader<'s, S> {
    store: &'s S,
}

impl<'s, S: AuthorStore> AuthorLoader<'s, S> {
    /// Create a loader writing into `store`.
    #[must_use]
    pub const fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Open the dump at `path` and load every author in it.
    pub fn load_path(&self, path: &Utf8Path) -> Result<LoadReport, LoadError> {
        info!("{LABEL}: loading {path}");
        let reader = open_dump(path)?;
        let report = self.load_reader(reader)?;
        info!(
            "{LABEL}: {} written, {} skipped, {} failed",
            report.records_written, report.skipped, report.failed
        );
        Ok(report)
    }

    /// Load every author from an already-open dump.
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<LoadReport, LoadError> {
        drive(reader, LABEL, |line| self.load_line(line))
    }

    fn load_line(&self, line: &str) -> Result<(), RecordError> {
        let author = author_from_line(&parse_line(line)?)?;
        self.store
            .save_author(&author)
            .map_err(|source| RecordError::store(&author.id, "save author", source))?;
        debug!("{LABEL}: saved {} ({})", author.id, author.name);
        Ok(())
    }
}

/// Load the author dump at `path` into `store`.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use shelfload_core::SqliteCatalogueStore;
/// use shelfload_data::load_authors;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteCatalogueStore::open(Utf8Path::new("catalogue.db"))?;
/// let report = load_authors(Utf8Path::new("ol_dump_authors_latest.txt.gz"), &store)?;
/// println!("{} authors written", report.records_written);
/// # Ok(())
/// # }
/// ```
pub fn load_authors<S: AuthorStore>(path: &Utf8Path, store: &S) -> Result<LoadReport, LoadError> {
    AuthorLoader::new(store).load_path(path)
}

/// Map a parsed author line onto an [`AuthorRecord`].
///
/// The id is `key` without [`AUTHOR_KEY_PREFIX`]; `name` defaults to empty.
/// The personal name is never taken from the dump.
pub fn author_from_line(line: &ParsedLine) -> Result<AuthorRecord, RecordError> {
    let id = record_id(line, AUTHOR_KEY_PREFIX).ok_or(RecordError::MissingKey)?;
    let name = line.text("name").unwrap_or_else(|| {
        if line.get("name").is_some() {
            field_defaulted(LABEL, &id, "name");
        }
        String::new()
    });
    Ok(AuthorRecord::new(id, name))
}

/// Derive a record id from `key`, stripping `prefix` when present.
pub(super) fn record_id(line: &ParsedLine, prefix: &str) -> Option<String> {
    let key = line.text("key")?;
    let id = key.strip_prefix(prefix).unwrap_or(&key);
    (!id.is_empty()).then(|| id.to_owned())
}
