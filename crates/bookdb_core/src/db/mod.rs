//! SQLite storage bootstrap and connection providers.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog.
//! - Bootstrap the two-table schema before a connection is handed out.
//! - Hand repositories one fresh connection per operation.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Every connection returned by a provider has `foreign_keys=ON`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
mod provider;
pub mod schema;

pub use open::{open_db, open_shared_memory};
pub use provider::{
    ConnectionError, ConnectionProvider, FileConnectionProvider, MemoryConnectionProvider,
};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
