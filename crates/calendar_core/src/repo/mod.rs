//! Persistence layer for calendar state.
//!
//! # Responsibility
//! - Expose the key-value `get/set` contract over SQLite (`kv_repo`).
//! - Encode and decode the whole guild collection under one key (`state_repo`).
//!
//! # Invariants
//! - Reads reject malformed persisted state instead of masking it.
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   DB transport errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv_repo;
pub mod state_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for persistence reads, writes and state decoding.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "calendar state serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted calendar state: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
