//! Facade crate for the shelfload catalogue loader.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and the dump loaders behind feature flags.

#![forbid(unsafe_code)]

pub use shelfload_core::{AuthorRecord, AuthorStore, BookRecord, BookStore, NO_AUTHOR_NAME};

#[cfg(feature = "store-sqlite")]
pub use shelfload_core::{SqliteCatalogueStore, SqliteCatalogueStoreError};

#[cfg(feature = "loaders")]
pub use shelfload_data::{
    IngestionError, IngestionPlan, IngestionReport, LoadError, LoadReport, load_authors,
    load_books, run_ingestion,
};
