//! Book entity.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it during `add`.
//! - `author` is the fully resolved author; only its identity is persisted.

use super::{require_text, Author, BookId, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    id: Option<BookId>,
    pub title: String,
    pub author: Author,
    pub publication_year: Option<i32>,
}

impl Book {
    /// Creates a book that has not been persisted yet.
    pub fn new(title: impl Into<String>, author: Author) -> Self {
        Self {
            id: None,
            title: title.into(),
            author,
            publication_year: None,
        }
    }

    /// Creates a book carrying an existing store identity.
    pub fn with_id(id: BookId, title: impl Into<String>, author: Author) -> Self {
        Self {
            id: Some(id),
            ..Self::new(title, author)
        }
    }

    /// Builder-style setter for the publication year.
    pub fn published_in(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn id(&self) -> Option<BookId> {
        self.id
    }

    /// Checks field-level preconditions shared by `add` and `update`.
    ///
    /// A book may only reference an author the store already knows.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("book", "title", &self.title)?;
        if self.author.id().is_none() {
            return Err(ValidationError::AuthorNotPersisted);
        }
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: BookId) {
        debug_assert!(self.id.is_none(), "book identity is assigned once");
        self.id = Some(id);
    }
}
