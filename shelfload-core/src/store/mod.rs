//! Data access traits for catalogue records.
//!
//! Loaders receive their stores as explicit parameters. Writes take `&self`
//! so a single backing store can serve as both the author lookup and the book
//! sink during the book phase; each write is independent and overwrites any
//! existing record with the same id.

use crate::{AuthorRecord, BookRecord};

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use schema::{SCHEMA_VERSION, SchemaError};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCatalogueStore, SqliteCatalogueStoreError};

/// Persistent access to author records keyed by id.
///
/// # Examples
///
/// ```rust
/// use std::{cell::RefCell, collections::HashMap, convert::Infallible};
/// use shelfload_core::{AuthorRecord, AuthorStore};
///
/// #[derive(Default)]
/// struct MapStore(RefCell<HashMap<String, AuthorRecord>>);
///
/// impl AuthorStore for MapStore {
///     type Error = Infallible;
///
///     fn save_author(&self, author: &AuthorRecord) -> Result<(), Self::Error> {
///         self.0.borrow_mut().insert(author.id.clone(), author.clone());
///         Ok(())
///     }
///
///     fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, Self::Error> {
///         Ok(self.0.borrow().get(id).cloned())
///     }
///
///     fn author_count(&self) -> Result<u64, Self::Error> {
///         Ok(self.0.borrow().len() as u64)
///     }
/// }
///
/// let store = MapStore::default();
/// store.save_author(&AuthorRecord::new("OL1A", "Jane Doe")).unwrap();
/// assert_eq!(store.find_author("OL1A").unwrap().unwrap().name, "Jane Doe");
/// ```
pub trait AuthorStore {
    /// Error raised by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert or replace the author with the same id.
    fn save_author(&self, author: &AuthorRecord) -> Result<(), Self::Error>;

    /// Look up an author by id; `Ok(None)` when absent.
    fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, Self::Error>;

    /// Number of stored authors.
    fn author_count(&self) -> Result<u64, Self::Error>;
}

/// Persistent access to book records keyed by id.
pub trait BookStore {
    /// Error raised by the backing storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert or replace the book with the same id.
    fn save_book(&self, book: &BookRecord) -> Result<(), Self::Error>;

    /// Look up a book by id; `Ok(None)` when absent.
    fn find_book(&self, id: &str) -> Result<Option<BookRecord>, Self::Error>;

    /// Number of stored books.
    fn book_count(&self) -> Result<u64, Self::Error>;
}
