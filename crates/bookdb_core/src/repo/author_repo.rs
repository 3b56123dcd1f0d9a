//! Author repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `author` table.
//! - Map rows to `Author` values, rejecting malformed persisted data.
//!
//! # Invariants
//! - Every operation acquires its own connection and drops it before
//!   returning, on success and failure alike.
//! - `birth_date` is stored as `YYYY-MM-DD` text.

use super::{
    instrumented, instrumented_insert, report_update, PersistenceCause, RepoError, RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::{Author, AuthorId, ValidationError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Row};

const AUTHOR_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    birth_date
FROM author";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for author CRUD operations.
pub trait AuthorRepository {
    /// Inserts `author` and sets the store-assigned identity on it.
    fn add(&self, author: &mut Author) -> RepoResult<AuthorId>;
    /// Overwrites the row matching `author.id()`; `false` when none matched.
    fn update(&self, author: &Author) -> RepoResult<bool>;
    fn get(&self, id: AuthorId) -> RepoResult<Option<Author>>;
    /// All authors ordered by identity.
    fn get_all(&self) -> RepoResult<Vec<Author>>;
    /// Removes the author; fails while any book still references it.
    fn delete(&self, id: AuthorId) -> RepoResult<bool>;
}

impl<R: AuthorRepository + ?Sized> AuthorRepository for &R {
    fn add(&self, author: &mut Author) -> RepoResult<AuthorId> {
        (**self).add(author)
    }

    fn update(&self, author: &Author) -> RepoResult<bool> {
        (**self).update(author)
    }

    fn get(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        (**self).get(id)
    }

    fn get_all(&self) -> RepoResult<Vec<Author>> {
        (**self).get_all()
    }

    fn delete(&self, id: AuthorId) -> RepoResult<bool> {
        (**self).delete(id)
    }
}

/// Checks an author about to be inserted.
pub(crate) fn validate_new_author(author: &Author) -> Result<(), ValidationError> {
    if let Some(id) = author.id() {
        return Err(ValidationError::IdentityAlreadySet {
            entity: "author",
            id,
        });
    }
    author.validate()
}

/// Checks an author about to be updated and returns its identity.
pub(crate) fn validate_stored_author(author: &Author) -> Result<AuthorId, ValidationError> {
    let id = author
        .id()
        .ok_or(ValidationError::IdentityUnset { entity: "author" })?;
    author.validate()?;
    Ok(id)
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'p> {
    provider: &'p dyn ConnectionProvider,
}

impl<'p> SqliteAuthorRepository<'p> {
    pub fn new(provider: &'p dyn ConnectionProvider) -> Self {
        Self { provider }
    }

    fn connect(&self, op: &'static str) -> RepoResult<Connection> {
        self.provider.acquire().map_err(RepoError::connection(op))
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn add(&self, author: &mut Author) -> RepoResult<AuthorId> {
        const OP: &str = "author.add";
        instrumented_insert(OP, || {
            validate_new_author(author).map_err(RepoError::validation(OP))?;
            let conn = self.connect(OP)?;

            conn.execute(
                "INSERT INTO author (first_name, last_name, birth_date)
                 VALUES (?1, ?2, ?3);",
                params![
                    author.first_name.as_str(),
                    author.last_name.as_str(),
                    author.birth_date.map(format_date),
                ],
            )
            .map_err(RepoError::sqlite(OP, None))?;

            let id = conn.last_insert_rowid();
            author.assign_id(id);
            Ok(id)
        })
    }

    fn update(&self, author: &Author) -> RepoResult<bool> {
        const OP: &str = "author.update";
        instrumented(OP, author.id(), || {
            let id = validate_stored_author(author).map_err(RepoError::validation(OP))?;
            let conn = self.connect(OP)?;

            let changed = conn
                .execute(
                    "UPDATE author
                     SET
                        first_name = ?1,
                        last_name = ?2,
                        birth_date = ?3
                     WHERE id = ?4;",
                    params![
                        author.first_name.as_str(),
                        author.last_name.as_str(),
                        author.birth_date.map(format_date),
                        id,
                    ],
                )
                .map_err(RepoError::sqlite(OP, Some(id)))?;

            Ok(report_update(OP, id, changed))
        })
    }

    fn get(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        const OP: &str = "author.get";
        instrumented(OP, Some(id), || {
            let conn = self.connect(OP)?;
            select_author(&conn, id).map_err(RepoError::persistence(OP, Some(id)))
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Author>> {
        const OP: &str = "author.get_all";
        instrumented(OP, None, || {
            let conn = self.connect(OP)?;
            select_all_authors(&conn).map_err(RepoError::persistence(OP, None))
        })
    }

    fn delete(&self, id: AuthorId) -> RepoResult<bool> {
        const OP: &str = "author.delete";
        instrumented(OP, Some(id), || {
            let conn = self.connect(OP)?;
            let changed = conn
                .execute("DELETE FROM author WHERE id = ?1;", [id])
                .map_err(|err| {
                    let cause = if is_constraint_violation(&err) {
                        PersistenceCause::AuthorInUse(id)
                    } else {
                        err.into()
                    };
                    RepoError::persistence(OP, Some(id))(cause)
                })?;
            Ok(changed > 0)
        })
    }
}

fn select_author(conn: &Connection, id: AuthorId) -> Result<Option<Author>, PersistenceCause> {
    let mut stmt = conn.prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_author_row(row)?));
    }

    Ok(None)
}

fn select_all_authors(conn: &Connection) -> Result<Vec<Author>, PersistenceCause> {
    let mut stmt = conn.prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut authors = Vec::new();

    while let Some(row) = rows.next()? {
        authors.push(parse_author_row(row)?);
    }

    Ok(authors)
}

fn parse_author_row(row: &Row<'_>) -> Result<Author, PersistenceCause> {
    let birth_date = match row.get::<_, Option<String>>("birth_date")? {
        Some(text) => Some(parse_date(&text).ok_or_else(|| {
            PersistenceCause::InvalidData(format!(
                "invalid date `{text}` in author.birth_date"
            ))
        })?),
        None => None,
    };

    Ok(Author::with_id(
        row.get("id")?,
        row.get::<_, String>("first_name")?,
        row.get::<_, String>("last_name")?,
        birth_date,
    ))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}
