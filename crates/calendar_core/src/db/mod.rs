//! SQLite storage bootstrap and schema migrations.
//!
//! # Responsibility
//! - Open the SQLite database that backs the key-value store.
//! - Bring its schema to the latest migration before first use.
//! - Attach context (database target, migration version, store key) to
//!   every SQLite failure.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No key is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Direction of a key-value table access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAccess {
    Read,
    Write,
}

impl Display for KeyAccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

#[derive(Debug)]
pub enum DbError {
    /// Connection to `target` (a file path or `:memory:`) could not be set up.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// `PRAGMA user_version` could not be read.
    SchemaProbe(rusqlite::Error),
    /// Migration to `version` failed; the transaction was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A `kv_store` row access failed.
    Key {
        key: String,
        access: KeyAccess,
        source: rusqlite::Error,
    },
}

impl DbError {
    pub(crate) fn on_key(key: &str, access: KeyAccess) -> impl FnOnce(rusqlite::Error) -> Self + '_ {
        move |source| Self::Key {
            key: key.to_string(),
            access,
            source,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open calendar database `{target}`: {source}")
            }
            Self::SchemaProbe(source) => write!(f, "cannot read schema version: {source}"),
            Self::Migration { version, source } => {
                write!(f, "migration to schema version {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "calendar database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Key {
                key,
                access,
                source,
            } => write!(f, "failed to {access} store key `{key}`: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. }
            | Self::Migration { source, .. }
            | Self::Key { source, .. }
            | Self::SchemaProbe(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
