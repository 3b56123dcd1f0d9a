//! Domain model for the book catalog.
//!
//! # Responsibility
//! - Define the `Author` and `Book` entities handed to and returned by
//!   repositories.
//! - Own field-level preconditions checked before any store access.
//!
//! # Invariants
//! - Identities are assigned by the store exactly once and never change.
//! - A `Book` always embeds exactly one `Author`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author;
pub mod book;

pub use author::Author;
pub use book::Book;

/// Store-assigned identity of an author row.
pub type AuthorId = i64;

/// Store-assigned identity of a book row.
pub type BookId = i64;

/// Caller-supplied entity violates a precondition.
///
/// Always raised before the store is touched, so a failed call leaves no
/// trace in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// `add` was called on an entity that already has an identity.
    IdentityAlreadySet { entity: &'static str, id: i64 },
    /// `update` was called on an entity that was never persisted.
    IdentityUnset { entity: &'static str },
    /// Book references an author that has no identity yet.
    AuthorNotPersisted,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => write!(f, "{entity}.{field} must not be empty"),
            Self::IdentityAlreadySet { entity, id } => {
                write!(f, "{entity} already has identity {id}")
            }
            Self::IdentityUnset { entity } => write!(f, "{entity} has no identity"),
            Self::AuthorNotPersisted => write!(f, "book author has no identity"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
