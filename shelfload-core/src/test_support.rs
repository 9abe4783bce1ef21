//! In-memory store used by unit, behaviour and property tests.

use std::{cell::RefCell, collections::BTreeMap, convert::Infallible};

use crate::{AuthorRecord, AuthorStore, BookRecord, BookStore};

/// In-memory implementation of both [`AuthorStore`] and [`BookStore`].
///
/// Records live in ordered maps so iteration order is deterministic.
#[derive(Default, Debug)]
pub struct MemoryStore {
    authors: RefCell<BTreeMap<String, AuthorRecord>>,
    books: RefCell<BTreeMap<String, BookRecord>>,
}

impl MemoryStore {
    /// Create a store pre-populated with the given authors.
    #[must_use]
    pub fn with_authors<I>(authors: I) -> Self
    where
        I: IntoIterator<Item = AuthorRecord>,
    {
        let store = Self::default();
        store.authors.borrow_mut().extend(
            authors
                .into_iter()
                .map(|author| (author.id.clone(), author)),
        );
        store
    }

    /// Snapshot of every stored author, ordered by id.
    #[must_use]
    pub fn authors(&self) -> Vec<AuthorRecord> {
        self.authors.borrow().values().cloned().collect()
    }

    /// Snapshot of every stored book, ordered by id.
    #[must_use]
    pub fn books(&self) -> Vec<BookRecord> {
        self.books.borrow().values().cloned().collect()
    }
}

impl AuthorStore for MemoryStore {
    type Error = Infallible;

    fn save_author(&self, author: &AuthorRecord) -> Result<(), Self::Error> {
        self.authors
            .borrow_mut()
            .insert(author.id.clone(), author.clone());
        Ok(())
    }

    fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, Self::Error> {
        Ok(self.authors.borrow().get(id).cloned())
    }

    fn author_count(&self) -> Result<u64, Self::Error> {
        Ok(self.authors.borrow().len() as u64)
    }
}

impl BookStore for MemoryStore {
    type Error = Infallible;

    fn save_book(&self, book: &BookRecord) -> Result<(), Self::Error> {
        self.books.borrow_mut().insert(book.id.clone(), book.clone());
        Ok(())
    }

    fn find_book(&self, id: &str) -> Result<Option<BookRecord>, Self::Error> {
        Ok(self.books.borrow().get(id).cloned())
    }

    fn book_count(&self) -> Result<u64, Self::Error> {
        Ok(self.books.borrow().len() as u64)
    }
}
