//! Core domain types for the shelfload catalogue.
//!
//! The records mirror one row each in the author and book tables. Book
//! records carry a denormalised copy of their authors' names, resolved at
//! ingestion time rather than kept as live references.

use chrono::NaiveDate;

pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use store::{AuthorStore, BookStore};

#[cfg(feature = "store-sqlite")]
pub use store::{SCHEMA_VERSION, SchemaError, SqliteCatalogueStore, SqliteCatalogueStoreError};

/// Placeholder stored in [`BookRecord::author_names`] when a referenced
/// author is not present in the author store.
pub const NO_AUTHOR_NAME: &str = "no author";

/// An author as persisted in the catalogue.
///
/// # Examples
///
/// ```
/// use shelfload_core::AuthorRecord;
///
/// let author = AuthorRecord::new("OL1A", "Jane Doe");
/// assert_eq!(author.id, "OL1A");
/// assert_eq!(author.personal_name, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthorRecord {
    /// Identifier derived from the dump key with the `/authors/` prefix removed.
    pub id: String,
    /// Display name; empty when the dump omits it.
    pub name: String,
    /// Personal name, if known. Dump ingestion never sets it.
    pub personal_name: Option<String>,
}

impl AuthorRecord {
    /// Construct an author without a personal name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            personal_name: None,
        }
    }

    /// Attach a personal name.
    #[must_use]
    pub fn with_personal_name(mut self, personal_name: impl Into<String>) -> Self {
        self.personal_name = Some(personal_name.into());
        self
    }
}

/// A book (an Open Library "work") as persisted in the catalogue.
///
/// `author_names[i]` always holds the name resolved for `author_ids[i]`.
///
/// # Examples
///
/// ```
/// use shelfload_core::BookRecord;
///
/// let book = BookRecord::new("OL1W", "Sample");
/// assert!(book.author_ids.is_empty());
/// assert_eq!(book.author_ids.len(), book.author_names.len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookRecord {
    /// Identifier derived from the dump key with the `/works/` prefix removed.
    pub id: String,
    /// Title; empty when the dump omits it.
    pub name: String,
    /// Cover identifiers in dump order.
    pub cover_ids: Vec<String>,
    /// Referenced author identifiers in dump order.
    pub author_ids: Vec<String>,
    /// Resolved author names, aligned with `author_ids`.
    pub author_names: Vec<String>,
    /// Calendar date of the work's `created` timestamp.
    pub created_by: Option<NaiveDate>,
}

impl BookRecord {
    /// Construct a book with no covers, authors or creation date.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cover_ids: Vec::new(),
            author_ids: Vec::new(),
            author_names: Vec::new(),
            created_by: None,
        }
    }
}
