//! Data-access layer for the book catalog.
//!
//! Repositories map `Author` and `Book` values to a two-table SQLite store,
//! acquiring one connection per operation from a `ConnectionProvider`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use crate::config::{ConfigError, StoreConfig};
pub use db::{
    ConnectionError, ConnectionProvider, DbError, FileConnectionProvider,
    MemoryConnectionProvider,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{Author, AuthorId, Book, BookId, ValidationError};
pub use repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
pub use repo::book_repo::{BookRepository, SqliteBookRepository};
pub use repo::memory::{MemoryAuthorRepository, MemoryBookRepository, MemoryStore};
pub use repo::{PersistenceCause, RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
