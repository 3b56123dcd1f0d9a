//! Author entity.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it during `add`.
//! - `first_name` and `last_name` are non-empty for every persisted author.

use super::{require_text, AuthorId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    id: Option<AuthorId>,
    pub first_name: String,
    pub last_name: String,
    /// Serialized as `YYYY-MM-DD`.
    pub birth_date: Option<NaiveDate>,
}

impl Author {
    /// Creates an author that has not been persisted yet.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
        }
    }

    /// Creates an author carrying an existing store identity.
    ///
    /// Used when mapping rows and by callers that already know the key.
    pub fn with_id(
        id: AuthorId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(first_name, last_name, birth_date)
        }
    }

    pub fn id(&self) -> Option<AuthorId> {
        self.id
    }

    /// `First Last`, as shown in listings.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks field-level preconditions shared by `add` and `update`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("author", "first_name", &self.first_name)?;
        require_text("author", "last_name", &self.last_name)?;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: AuthorId) {
        debug_assert!(self.id.is_none(), "author identity is assigned once");
        self.id = Some(id);
    }
}
