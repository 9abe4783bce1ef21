//! Catalogue schema for the SQLite store.

use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `catalogue_schema_version` by this release.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the catalogue tables inside an SQLite database if they are missing.
///
/// Existing databases must already carry [`SCHEMA_VERSION`]; any other value
/// is rejected so migrations can be applied explicitly.
pub(super) fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create authors",
        "CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY CHECK (length(id) > 0),
            name TEXT NOT NULL,
            personal_name TEXT
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create books",
        "CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY CHECK (length(id) > 0),
            name TEXT NOT NULL,
            cover_ids TEXT NOT NULL,
            author_ids TEXT NOT NULL,
            author_names TEXT NOT NULL,
            created_by TEXT
        ) WITHOUT ROWID",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS catalogue_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM catalogue_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO catalogue_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when initialising the catalogue schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A DDL statement or version bookkeeping query failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Short description of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible release.
    #[error(
        "expected catalogue schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this release writes.
        expected: i64,
        /// Version found in the database.
        found: i64,
    },
}
