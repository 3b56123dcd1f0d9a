//! Connection providers consumed by the SQLite repositories.
//!
//! # Responsibility
//! - Hand out one bootstrapped connection per repository operation.
//! - Own the store location; repositories never see paths or URIs.
//!
//! # Invariants
//! - `acquire` returns an owned connection; dropping it closes it.
//! - Providers never share one connection between two callers.

use super::{open_db, open_shared_memory, DbError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MEMORY_DB: AtomicU64 = AtomicU64::new(1);

/// Failure to obtain a usable connection.
#[derive(Debug)]
pub struct ConnectionError {
    target: String,
    source: DbError,
}

impl ConnectionError {
    pub fn new(target: impl Into<String>, source: DbError) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }

    /// Store location the provider tried to reach.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn db_error(&self) -> &DbError {
        &self.source
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot connect to `{}`: {}", self.target, self.source)
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Supplies a live connection on demand.
pub trait ConnectionProvider {
    fn acquire(&self) -> Result<Connection, ConnectionError>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn acquire(&self) -> Result<Connection, ConnectionError> {
        (**self).acquire()
    }
}

/// Opens the SQLite file at a fixed path on every `acquire`.
#[derive(Debug, Clone)]
pub struct FileConnectionProvider {
    path: PathBuf,
}

impl FileConnectionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens and closes one connection to surface bad paths early.
    pub fn check(&self) -> Result<(), ConnectionError> {
        self.acquire().map(drop)
    }
}

impl ConnectionProvider for FileConnectionProvider {
    fn acquire(&self) -> Result<Connection, ConnectionError> {
        open_db(&self.path)
            .map_err(|err| ConnectionError::new(self.path.display().to_string(), err))
    }
}

/// Private shared-cache in-memory database.
///
/// The provider keeps one anchor connection open so data survives between
/// operations; each `acquire` still opens its own connection.
pub struct MemoryConnectionProvider {
    name: String,
    _anchor: Connection,
}

impl MemoryConnectionProvider {
    pub fn new() -> Result<Self, ConnectionError> {
        let name = format!(
            "bookdb-{}-{}",
            std::process::id(),
            NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed)
        );
        let anchor = open_shared_memory(&name)
            .map_err(|err| ConnectionError::new(name.clone(), err))?;
        Ok(Self {
            name,
            _anchor: anchor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ConnectionProvider for MemoryConnectionProvider {
    fn acquire(&self) -> Result<Connection, ConnectionError> {
        open_shared_memory(&self.name).map_err(|err| ConnectionError::new(self.name.clone(), err))
    }
}
