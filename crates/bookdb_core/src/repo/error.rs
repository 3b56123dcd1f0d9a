//! Repository error taxonomy.
//!
//! Every variant records the operation (`author.add`, `book.get`, ...) so
//! callers can log failures without extra context. Not-found is never an
//! error; lookups return `Option`.

use crate::db::ConnectionError;
use crate::model::{AuthorId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    /// Entity rejected before any store access.
    Validation {
        op: &'static str,
        source: ValidationError,
    },
    /// Provider could not hand out a connection.
    Connection {
        op: &'static str,
        source: ConnectionError,
    },
    /// Statement failed or its rows could not be mapped.
    Persistence {
        op: &'static str,
        id: Option<i64>,
        cause: PersistenceCause,
    },
}

/// Reason a statement or row mapping failed.
#[derive(Debug)]
pub enum PersistenceCause {
    Sqlite(rusqlite::Error),
    InvalidData(String),
    /// Book row points at an author that does not exist.
    MissingAuthor(AuthorId),
    /// Author cannot be removed while books reference it.
    AuthorInUse(AuthorId),
}

impl RepoError {
    /// Name of the repository operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Validation { op, .. }
            | Self::Connection { op, .. }
            | Self::Persistence { op, .. } => *op,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Re-tags an error raised by a nested repository call with the calling
    /// operation and entity, keeping the underlying cause.
    pub(crate) fn within(self, op: &'static str, id: Option<i64>) -> Self {
        match self {
            Self::Validation { source, .. } => Self::Validation { op, source },
            Self::Connection { source, .. } => Self::Connection { op, source },
            Self::Persistence { cause, .. } => Self::Persistence { op, id, cause },
        }
    }

    pub(crate) fn validation(op: &'static str) -> impl FnOnce(ValidationError) -> Self {
        move |source| Self::Validation { op, source }
    }

    pub(crate) fn connection(op: &'static str) -> impl FnOnce(ConnectionError) -> Self {
        move |source| Self::Connection { op, source }
    }

    pub(crate) fn persistence(
        op: &'static str,
        id: Option<i64>,
    ) -> impl FnOnce(PersistenceCause) -> Self {
        move |cause| Self::Persistence { op, id, cause }
    }

    pub(crate) fn sqlite(op: &'static str, id: Option<i64>) -> impl FnOnce(rusqlite::Error) -> Self {
        move |err| Self::Persistence {
            op,
            id,
            cause: PersistenceCause::Sqlite(err),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { op, source } => write!(f, "{op}: invalid input: {source}"),
            Self::Connection { op, source } => write!(f, "{op}: {source}"),
            Self::Persistence {
                op,
                id: Some(id),
                cause,
            } => write!(f, "{op} (id={id}): {cause}"),
            Self::Persistence { op, id: None, cause } => write!(f, "{op}: {cause}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation { source, .. } => Some(source),
            Self::Connection { source, .. } => Some(source),
            Self::Persistence {
                cause: PersistenceCause::Sqlite(err),
                ..
            } => Some(err),
            Self::Persistence { .. } => None,
        }
    }
}

impl Display for PersistenceCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingAuthor(id) => write!(f, "referenced author {id} does not exist"),
            Self::AuthorInUse(id) => write!(f, "author {id} is still referenced by books"),
        }
    }
}

impl From<rusqlite::Error> for PersistenceCause {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
