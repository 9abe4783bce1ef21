//! Dump ingestion for the shelfload catalogue.
//!
//! Responsibilities:
//! - Open line-delimited Open Library dumps (plain, gzip or bzip2).
//! - Parse each line into a JSON object, tolerating a non-JSON prefix.
//! - Map authors and works onto catalogue records and persist them through
//!   the store traits from `shelfload-core`.
//!
//! Boundaries:
//! - Stores are always passed in; nothing here owns a connection.
//! - Per-line problems are reported, never fatal. Only an unreadable dump
//!   stops a loader.
//!
//! Invariants:
//! - Authors are fully loaded before any work is resolved against them.
//! - A book's author names stay aligned with its author ids.
#![forbid(unsafe_code)]

pub mod dump;
pub mod ingest;
pub mod load;

pub use dump::{Compression, LineParseError, ParsedLine, open_dump, parse_line};
pub use ingest::{IngestionError, IngestionPlan, IngestionReport, run_ingestion};
pub use load::{
    AUTHOR_KEY_PREFIX, AuthorLoader, BookLoader, CREATED_DATE_FORMAT, LineIssue, LineIssueKind,
    LoadError, LoadReport, MAX_RECORDED_ISSUES, PROGRESS_INTERVAL, ParsedWork, RecordError,
    WORK_KEY_PREFIX, author_from_line, load_authors, load_books, work_from_line,
};
