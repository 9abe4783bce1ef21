//! Loaders that turn dump lines into persisted catalogue records.
//!
//! Both loaders share one forward pass over the dump: every non-blank line
//! yields exactly one outcome (written, skipped or failed) and the counts are
//! collected into a [`LoadReport`]. Only failures to open or read the dump
//! itself abort the pass.
#![forbid(unsafe_code)]

use std::{error::Error as StdError, io::BufRead};

use camino::Utf8PathBuf;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::dump::LineParseError;

mod authors;
mod books;

pub use authors::{AUTHOR_KEY_PREFIX, AuthorLoader, author_from_line, load_authors};
pub use books::{
    BookLoader, CREATED_DATE_FORMAT, ParsedWork, WORK_KEY_PREFIX, load_books, work_from_line,
};

/// Number of lines between progress log entries.
pub const PROGRESS_INTERVAL: u64 = 10_000;

/// Upper bound on the issues retained in a [`LoadReport`].
pub const MAX_RECORDED_ISSUES: usize = 1_000;

/// Fatal errors that stop a loader before or during its pass.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dump could not be opened; nothing was written.
    #[error("dump at {path:?} is unavailable: {source}")]
    SourceUnavailable {
        /// Location of the dump.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading from the dump failed part-way through.
    #[error("failed to read dump at line {line}: {source}")]
    Read {
        /// 1-based number of the line being read.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Why a single line produced no record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The line was not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    /// The line did not carry a parseable JSON object.
    #[error(transparent)]
    Parse(#[from] LineParseError),
    /// The object had no usable `key` field.
    #[error("record has no usable `key` field")]
    MissingKey,
    /// `created.value` did not match [`CREATED_DATE_FORMAT`].
    #[error("created timestamp {value:?} is not in yyyy-MM-ddTHH:mm:ss.SSSSSS form")]
    InvalidCreatedDate {
        /// Raw timestamp text.
        value: String,
        /// Parser error reported by `chrono`.
        #[source]
        source: chrono::ParseError,
    },
    /// The store failed while saving the record or resolving its authors.
    #[error("store failed to {operation} for record {id}: {source}")]
    Store {
        /// Identifier of the record being processed.
        id: String,
        /// Short description of the store call.
        operation: &'static str,
        /// Error reported by the store.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl RecordError {
    pub(crate) fn store<E>(id: &str, operation: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Store {
            id: id.to_owned(),
            operation,
            source: Box::new(source),
        }
    }

    /// Classification used in reports.
    #[must_use]
    pub const fn kind(&self) -> LineIssueKind {
        match self {
            Self::InvalidUtf8 => LineIssueKind::InvalidUtf8,
            Self::Parse(LineParseError::NoJsonObject) => LineIssueKind::NoJsonObject,
            Self::Parse(LineParseError::Json { .. }) => LineIssueKind::InvalidJson,
            Self::MissingKey => LineIssueKind::MissingKey,
            Self::InvalidCreatedDate { .. } => LineIssueKind::InvalidCreatedDate,
            Self::Store { .. } => LineIssueKind::Store,
        }
    }
}

/// Category of a per-line problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineIssueKind {
    /// Line bytes were not UTF-8.
    InvalidUtf8,
    /// No `{` on the line.
    NoJsonObject,
    /// JSON after the prefix was malformed.
    InvalidJson,
    /// Missing or empty `key`.
    MissingKey,
    /// Unparseable `created.value`.
    InvalidCreatedDate,
    /// The store rejected a read or write.
    Store,
}

impl LineIssueKind {
    /// Whether the issue counts as a failure rather than a skipped line.
    ///
    /// Input problems skip the line; store problems fail it.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Store)
    }
}

/// One per-line problem recorded during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineIssue {
    /// 1-based line number in the dump.
    pub line: usize,
    /// Problem category.
    pub kind: LineIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Outcome of a single loader pass.
///
/// `records_written + skipped + failed == lines_read` always holds. Blank
/// lines are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Non-blank lines consumed.
    pub lines_read: u64,
    /// Records persisted.
    pub records_written: u64,
    /// Lines dropped because of input problems.
    pub skipped: u64,
    /// Lines dropped because the store returned an error.
    pub failed: u64,
    /// The first [`MAX_RECORDED_ISSUES`] problems, in line order.
    pub issues: Vec<LineIssue>,
}

impl LoadReport {
    fn record_written(&mut self) {
        self.lines_read += 1;
        self.records_written += 1;
    }

    fn record_issue(&mut self, line: usize, error: &RecordError) {
        self.lines_read += 1;
        let kind = error.kind();
        if kind.is_failure() {
            self.failed += 1;
        } else {
            self.skipped += 1;
        }
        if self.issues.len() < MAX_RECORDED_ISSUES {
            self.issues.push(LineIssue {
                line,
                kind,
                message: render_error(error),
            });
        }
    }

    /// Whether every non-blank line produced a record.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}

fn render_error(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Drive one pass over `reader`, handing each non-blank line to `handle`.
///
/// `label` prefixes the progress and warning log lines.
pub(crate) fn drive<R, F>(mut reader: R, label: &str, mut handle: F) -> Result<LoadReport, LoadError>
where
    R: BufRead,
    F: FnMut(&str) -> Result<(), RecordError>,
{
    let mut report = LoadReport::default();
    let mut buffer = Vec::new();
    let mut line_number = 0usize;

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => line_number += 1,
            Err(source) => {
                return Err(LoadError::Read {
                    line: line_number + 1,
                    source,
                });
            }
        }

        let outcome = match std::str::from_utf8(&buffer) {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(text) => handle(text),
            Err(_) => Err(RecordError::InvalidUtf8),
        };
        match outcome {
            Ok(()) => report.record_written(),
            Err(error) => {
                warn!("{label}: line {line_number} dropped: {}", render_error(&error));
                report.record_issue(line_number, &error);
            }
        }

        if report.lines_read % PROGRESS_INTERVAL == 0 {
            info!(
                "{label}: {} lines processed ({} written)",
                report.lines_read, report.records_written
            );
        }
    }

    Ok(report)
}

/// Log that a field had an unexpected JSON shape and was defaulted.
pub(crate) fn field_defaulted(label: &str, id: &str, field: &str) {
    debug!("{label}: field `{field}` of {id} has an unexpected shape; using default");
}
