//! SQLite-backed catalogue store.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Row};
use thiserror::Error;

use crate::{AuthorRecord, BookRecord};

use super::schema::{SchemaError, initialise_schema};
use super::{AuthorStore, BookStore};

/// Errors raised by [`SqliteCatalogueStore`].
#[derive(Debug, Error)]
pub enum SqliteCatalogueStoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database location.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating or validating the schema failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A list column could not be encoded as JSON.
    #[error("failed to encode {column} for book {id}")]
    EncodeList {
        /// Book identifier.
        id: String,
        /// Column being written.
        column: &'static str,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A stored list column was not a JSON array of strings.
    #[error("failed to decode {column} for book {id}")]
    DecodeList {
        /// Book identifier.
        id: String,
        /// Column being read.
        column: &'static str,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A statement failed.
    #[error("failed to {operation}")]
    Sqlite {
        /// Short description of the failing statement.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Author and book store persisted in a single SQLite database.
///
/// # Examples
///
/// ```
/// use shelfload_core::{AuthorRecord, AuthorStore, SqliteCatalogueStore};
///
/// # fn main() -> Result<(), shelfload_core::SqliteCatalogueStoreError> {
/// let store = SqliteCatalogueStore::open_in_memory()?;
/// store.save_author(&AuthorRecord::new("OL1A", "Jane Doe"))?;
/// let author = store.find_author("OL1A")?;
/// assert_eq!(author.map(|a| a.name).as_deref(), Some("Jane Doe"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteCatalogueStore {
    connection: Connection,
}

impl SqliteCatalogueStore {
    /// Open (or create) the catalogue database at `path`.
    ///
    /// Parent directories are created automatically and the schema is
    /// initialised if missing.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteCatalogueStoreError> {
        ensure_parent_dir(path)?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteCatalogueStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_connection(connection)
    }

    /// Create a transient in-memory catalogue.
    pub fn open_in_memory() -> Result<Self, SqliteCatalogueStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteCatalogueStoreError::Open {
                path: Utf8PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_connection(connection)
    }

    /// Wrap an existing connection, initialising the schema if required.
    ///
    /// File-backed databases switch to write-ahead logging with
    /// `synchronous = NORMAL`, so each single-row write avoids a full sync.
    /// In-memory databases keep their `memory` journal.
    pub fn from_connection(mut connection: Connection) -> Result<Self, SqliteCatalogueStoreError> {
        configure_journal(&connection)?;
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    fn count(&self, sql: &str, operation: &'static str) -> Result<u64, SqliteCatalogueStoreError> {
        self.connection
            .query_row(sql, [], |row| row.get::<_, i64>(0))
            .map(i64::unsigned_abs)
            .map_err(|source| SqliteCatalogueStoreError::Sqlite { operation, source })
    }
}

impl AuthorStore for SqliteCatalogueStore {
    type Error = SqliteCatalogueStoreError;

    fn save_author(&self, author: &AuthorRecord) -> Result<(), Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "INSERT OR REPLACE INTO authors (id, name, personal_name) VALUES (?1, ?2, ?3)",
            )
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "prepare author insert",
                source,
            })?;
        statement
            .execute((
                author.id.as_str(),
                author.name.as_str(),
                author.personal_name.as_deref(),
            ))
            .map(|_| ())
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "insert author",
                source,
            })
    }

    fn find_author(&self, id: &str) -> Result<Option<AuthorRecord>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached("SELECT id, name, personal_name FROM authors WHERE id = ?1")
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "prepare author lookup",
                source,
            })?;
        statement
            .query_row([id], |row| {
                Ok(AuthorRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    personal_name: row.get(2)?,
                })
            })
            .optional()
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "look up author",
                source,
            })
    }

    fn author_count(&self) -> Result<u64, Self::Error> {
        self.count("SELECT COUNT(*) FROM authors", "count authors")
    }
}

impl BookStore for SqliteCatalogueStore {
    type Error = SqliteCatalogueStoreError;

    fn save_book(&self, book: &BookRecord) -> Result<(), Self::Error> {
        let cover_ids = encode_list(&book.id, "cover_ids", &book.cover_ids)?;
        let author_ids = encode_list(&book.id, "author_ids", &book.author_ids)?;
        let author_names = encode_list(&book.id, "author_names", &book.author_names)?;
        let mut statement = self
            .connection
            .prepare_cached(
                "INSERT OR REPLACE INTO books (
                    id,
                    name,
                    cover_ids,
                    author_ids,
                    author_names,
                    created_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "prepare book insert",
                source,
            })?;
        statement
            .execute((
                book.id.as_str(),
                book.name.as_str(),
                cover_ids,
                author_ids,
                author_names,
                book.created_by,
            ))
            .map(|_| ())
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "insert book",
                source,
            })
    }

    fn find_book(&self, id: &str) -> Result<Option<BookRecord>, Self::Error> {
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT id, name, cover_ids, author_ids, author_names, created_by
                    FROM books WHERE id = ?1",
            )
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "prepare book lookup",
                source,
            })?;
        let row = statement
            .query_row([id], BookRow::from_row)
            .optional()
            .map_err(|source| SqliteCatalogueStoreError::Sqlite {
                operation: "look up book",
                source,
            })?;
        row.map(BookRow::into_record).transpose()
    }

    fn book_count(&self) -> Result<u64, Self::Error> {
        self.count("SELECT COUNT(*) FROM books", "count books")
    }
}

/// Raw `books` row with list columns still JSON-encoded.
struct BookRow {
    id: String,
    name: String,
    cover_ids: String,
    author_ids: String,
    author_names: String,
    created_by: Option<chrono::NaiveDate>,
}

impl BookRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            cover_ids: row.get(2)?,
            author_ids: row.get(3)?,
            author_names: row.get(4)?,
            created_by: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<BookRecord, SqliteCatalogueStoreError> {
        let cover_ids = decode_list(&self.id, "cover_ids", &self.cover_ids)?;
        let author_ids = decode_list(&self.id, "author_ids", &self.author_ids)?;
        let author_names = decode_list(&self.id, "author_names", &self.author_names)?;
        Ok(BookRecord {
            id: self.id,
            name: self.name,
            cover_ids,
            author_ids,
            author_names,
            created_by: self.created_by,
        })
    }
}

fn encode_list(
    id: &str,
    column: &'static str,
    values: &[String],
) -> Result<String, SqliteCatalogueStoreError> {
    serde_json::to_string(values).map_err(|source| SqliteCatalogueStoreError::EncodeList {
        id: id.to_owned(),
        column,
        source,
    })
}

fn decode_list(
    id: &str,
    column: &'static str,
    raw: &str,
) -> Result<Vec<String>, SqliteCatalogueStoreError> {
    serde_json::from_str(raw).map_err(|source| SqliteCatalogueStoreError::DecodeList {
        id: id.to_owned(),
        column,
        source,
    })
}

fn configure_journal(connection: &Connection) -> Result<(), SqliteCatalogueStoreError> {
    connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(|source| SqliteCatalogueStoreError::Sqlite {
            operation: "enable write-ahead logging",
            source,
        })?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .map_err(|source| SqliteCatalogueStoreError::Sqlite {
            operation: "relax synchronous mode",
            source,
        })
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteCatalogueStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };

    let map_io = |source| SqliteCatalogueStoreError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(map_io)?;
    dir.create_dir_all(relative).map_err(map_io)
}
