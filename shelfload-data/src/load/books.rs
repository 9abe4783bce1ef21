use std::io::BufRead;

use camino::Utf8Path;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde_json::Value;
use shelfload_core::{AuthorStore, BookRecord, BookStore, NO_AUTHOR_NAME};

use crate::dump::{ParsedLine, open_dump, parse_line};

use super::{
    AUTHOR_KEY_PREFIX, LoadError, LoadReport, RecordError, authors::record_id, drive,
    field_defaulted,
};

/// Prefix removed from work keys to form the record id.
pub const WORK_KEY_PREFIX: &str = "/works/";

/// `chrono` pattern for `created.value` (`yyyy-MM-ddTHH:mm:ss.SSSSSS`).
pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

const LABEL: &str = "books";

/// A work line mapped to book fields, before author names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWork {
    /// Work id with [`WORK_KEY_PREFIX`] removed.
    pub id: String,
    /// Title, empty when absent.
    pub name: String,
    /// Cover ids rendered as strings.
    pub cover_ids: Vec<String>,
    /// Referenced author ids with [`AUTHOR_KEY_PREFIX`] removed.
    pub author_ids: Vec<String>,
    /// Date part of `created.value`.
    pub created_by: Option<NaiveDate>,
}

impl ParsedWork {
    /// Look up every referenced author and assemble the [`BookRecord`].
    ///
    /// Authors missing from `authors` resolve to [`NO_AUTHOR_NAME`]; only a
    /// store error aborts resolution.
    ///
    /// # Examples
    /// ```
    /// use shelfload_core::{AuthorRecord, NO_AUTHOR_NAME, test_support::MemoryStore};
    /// use shelfload_data::{parse_line, work_from_line};
    ///
    /// let authors = MemoryStore::with_authors([AuthorRecord::new("A1", "Jane Doe")]);
    /// let line = parse_line(
    ///     r#"{"key":"/works/B1","authors":[{"author":{"key":"/authors/A1"}},{"author":{"key":"/authors/A9"}}]}"#,
    /// )?;
    /// let book = work_from_line(&line)?.resolve(&authors)?;
    /// assert_eq!(book.author_names, vec!["Jane Doe", NO_AUTHOR_NAME]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn resolve<A: AuthorStore>(self, authors: &A) -> Result<BookRecord, A::Error> {
        let author_names = self
            .author_ids
            .iter()
            .map(|id| {
                authors.find_author(id).map(|found| {
                    found.map_or_else(|| NO_AUTHOR_NAME.to_owned(), |author| author.name)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BookRecord {
            id: self.id,
            name: self.name,
            cover_ids: self.cover_ids,
            author_ids: self.author_ids,
            author_names,
            created_by: self.created_by,
        })
    }
}

/// Map a parsed work line onto its book fields.
///
/// Fields with an unexpected shape fall back to empty values; only a missing
/// key or an unparseable `created.value` rejects the line.
pub fn work_from_line(line: &ParsedLine) -> Result<ParsedWork, RecordError> {
    let id = record_id(line, WORK_KEY_PREFIX).ok_or(RecordError::MissingKey)?;
    let name = line.text("title").unwrap_or_else(|| {
        if line.get("title").is_some() {
            field_defaulted(LABEL, &id, "title");
        }
        String::new()
    });
    let cover_ids = cover_ids(line, &id);
    let author_ids = author_ids(line, &id);
    let created_by = created_by(line, &id)?;

    Ok(ParsedWork {
        id,
        name,
        cover_ids,
        author_ids,
        created_by,
    })
}

fn cover_ids(line: &ParsedLine, id: &str) -> Vec<String> {
    let Some(covers) = list_field(line, id, "covers") else {
        return Vec::new();
    };
    let ids: Vec<String> = covers
        .iter()
        .filter_map(|cover| match cover {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        })
        .collect();
    if ids.len() != covers.len() {
        field_defaulted(LABEL, id, "covers[]");
    }
    ids
}

fn author_ids(line: &ParsedLine, id: &str) -> Vec<String> {
    let Some(entries) = list_field(line, id, "authors") else {
        return Vec::new();
    };
    let ids: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.get("author")?.get("key")?.as_str())
        .map(|key| key.strip_prefix(AUTHOR_KEY_PREFIX).unwrap_or(key))
        .filter(|author_id| !author_id.is_empty())
        .map(str::to_owned)
        .collect();
    if ids.len() != entries.len() {
        field_defaulted(LABEL, id, "authors[]");
    }
    ids
}

fn list_field<'l>(line: &'l ParsedLine, id: &str, field: &str) -> Option<&'l [Value]> {
    let list = line.list(field);
    if list.is_none() && line.get(field).is_some() {
        field_defaulted(LABEL, id, field);
    }
    list
}

fn created_by(line: &ParsedLine, id: &str) -> Result<Option<NaiveDate>, RecordError> {
    let Some(raw) = line.path(&["created", "value"]) else {
        return Ok(None);
    };
    let Some(value) = raw.as_str() else {
        field_defaulted(LABEL, id, "created.value");
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(value, CREATED_DATE_FORMAT)
        .map(|timestamp| Some(timestamp.date()))
        .map_err(|source| RecordError::InvalidCreatedDate {
            value: value.to_owned(),
            source,
        })
}

/// Loads work dumps into a [`BookStore`], resolving author names against an
/// [`AuthorStore`].
///
/// The author store is only read. Loading books before their authors is
/// allowed but every name resolves to [`NO_AUTHOR_NAME`].
#[derive(Debug)]
pub struct BookLoader<'s, A, B> {
    authors: &'s A,
    books: &'s B,
}

impl<'s, A: AuthorStore, B: BookStore> BookLoader<'s, A, B> {
    /// Create a loader resolving names in `authors` and writing to `books`.
    #[must_use]
    pub const fn new(authors: &'s A, books: &'s B) -> Self {
        Self { authors, books }
    }

    /// Open the dump at `path` and load every work in it.
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

    /// Load every work from an already-open dump.
    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<LoadReport, LoadError> {
        drive(reader, LABEL, |line| self.load_line(line))
    }

    fn load_line(&self, line: &str) -> Result<(), RecordError> {
        let work = work_from_line(&parse_line(line)?)?;
        let id = work.id.clone();
        let book = work
            .resolve(self.authors)
            .map_err(|source| RecordError::store(&id, "find author", source))?;
        self.books
            .save_book(&book)
            .map_err(|source| RecordError::store(&id, "save book", source))?;
        debug!(
            "{LABEL}: saved {id} with {} author(s)",
            book.author_ids.len()
        );
        Ok(())
    }
}

/// Load the works dump at `path` into `books`, resolving names in `authors`.
///
/// `authors` and `books` may be the same store.
pub fn load_books<A, B>(path: &Utf8Path, authors: &A, books: &B) -> Result<LoadReport, LoadError>
where
    A: AuthorStore,
    B: BookStore,
{
    BookLoader::new(authors, books).load_path(path)
}
