//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `book` table.
//! - Resolve each row's `author_id` into a full `Author` through an
//!   `AuthorRepository`.
//!
//! # Invariants
//! - Only the author identity is written; author fields are never touched.
//! - A book row whose author cannot be loaded is a persistence failure,
//!   not an absent result.
//! - The book connection is released before authors are resolved.

use super::author_repo::{is_constraint_violation, AuthorRepository};
use super::{
    instrumented, instrumented_insert, report_update, PersistenceCause, RepoError, RepoResult,
};
use crate::db::ConnectionProvider;
use crate::model::{AuthorId, Book, BookId, ValidationError};
use rusqlite::{params, Connection, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author_id,
    publication_year
FROM book";

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    /// Inserts `book` and sets the store-assigned identity on it.
    fn add(&self, book: &mut Book) -> RepoResult<BookId>;
    /// Overwrites the row matching `book.id()`; `false` when none matched.
    fn update(&self, book: &Book) -> RepoResult<bool>;
    /// Loads one book with its author resolved.
    fn get(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// All books ordered by identity, authors resolved.
    fn get_all(&self) -> RepoResult<Vec<Book>>;
    fn delete(&self, id: BookId) -> RepoResult<bool>;
}

impl<R: BookRepository + ?Sized> BookRepository for &R {
    fn add(&self, book: &mut Book) -> RepoResult<BookId> {
        (**self).add(book)
    }

    fn update(&self, book: &Book) -> RepoResult<bool> {
        (**self).update(book)
    }

    fn get(&self, id: BookId) -> RepoResult<Option<Book>> {
        (**self).get(id)
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        (**self).get_all()
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        (**self).delete(id)
    }
}

/// Persisted shape of a book: the author is only an identity.
#[derive(Debug, Clone)]
pub(crate) struct BookRow {
    pub(crate) id: BookId,
    pub(crate) title: String,
    pub(crate) author_id: AuthorId,
    pub(crate) publication_year: Option<i32>,
}

impl BookRow {
    pub(crate) fn from_book(id: BookId, author_id: AuthorId, book: &Book) -> Self {
        Self {
            id,
            title: book.title.clone(),
            author_id,
            publication_year: book.publication_year,
        }
    }
}

/// Turns a stored row into a `Book` by loading its author.
pub(crate) fn resolve_book<A: AuthorRepository + ?Sized>(
    authors: &A,
    op: &'static str,
    row: BookRow,
) -> RepoResult<Book> {
    let author = authors
        .get(row.author_id)
        .map_err(|err| err.within(op, Some(row.id)))?
        .ok_or(RepoError::Persistence {
            op,
            id: Some(row.id),
            cause: PersistenceCause::MissingAuthor(row.author_id),
        })?;

    let mut book = Book::with_id(row.id, row.title, author);
    book.publication_year = row.publication_year;
    Ok(book)
}

/// Checks a book about to be inserted and returns its author identity.
pub(crate) fn validate_new_book(book: &Book) -> Result<AuthorId, ValidationError> {
    if let Some(id) = book.id() {
        return Err(ValidationError::IdentityAlreadySet { entity: "book", id });
    }
    book.validate()?;
    book.author.id().ok_or(ValidationError::AuthorNotPersisted)
}

/// Checks a book about to be updated and returns `(book_id, author_id)`.
pub(crate) fn validate_stored_book(book: &Book) -> Result<(BookId, AuthorId), ValidationError> {
    let id = book
        .id()
        .ok_or(ValidationError::IdentityUnset { entity: "book" })?;
    book.validate()?;
    let author_id = book.author.id().ok_or(ValidationError::AuthorNotPersisted)?;
    Ok((id, author_id))
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'p, A> {
    provider: &'p dyn ConnectionProvider,
    authors: A,
}

impl<'p, A: AuthorRepository> SqliteBookRepository<'p, A> {
    pub fn new(provider: &'p dyn ConnectionProvider, authors: A) -> Self {
        Self { provider, authors }
    }

    fn connect(&self, op: &'static str) -> RepoResult<Connection> {
        self.provider.acquire().map_err(RepoError::connection(op))
    }
}

impl<A: AuthorRepository> BookRepository for SqliteBookRepository<'_, A> {
    fn add(&self, book: &mut Book) -> RepoResult<BookId> {
        const OP: &str = "book.add";
        instrumented_insert(OP, || {
            let author_id = validate_new_book(book).map_err(RepoError::validation(OP))?;
            let conn = self.connect(OP)?;

            conn.execute(
                "INSERT INTO book (title, author_id, publication_year)
                 VALUES (?1, ?2, ?3);",
                params![book.title.as_str(), author_id, book.publication_year],
            )
            .map_err(|err| missing_author_or_sqlite(OP, None, author_id, err))?;

            let id = conn.last_insert_rowid();
            book.assign_id(id);
            Ok(id)
        })
    }

    fn update(&self, book: &Book) -> RepoResult<bool> {
        const OP: &str = "book.update";
        instrumented(OP, book.id(), || {
            let (id, author_id) = validate_stored_book(book).map_err(RepoError::validation(OP))?;
            let conn = self.connect(OP)?;

            let changed = conn
                .execute(
                    "UPDATE book
                     SET
                        title = ?1,
                        author_id = ?2,
                        publication_year = ?3
                     WHERE id = ?4;",
                    params![book.title.as_str(), author_id, book.publication_year, id],
                )
                .map_err(|err| missing_author_or_sqlite(OP, Some(id), author_id, err))?;

            Ok(report_update(OP, id, changed))
        })
    }

    fn get(&self, id: BookId) -> RepoResult<Option<Book>> {
        const OP: &str = "book.get";
        instrumented(OP, Some(id), || {
            let row = {
                let conn = self.connect(OP)?;
                select_book_row(&conn, id).map_err(RepoError::persistence(OP, Some(id)))?
            };

            row.map(|row| resolve_book(&self.authors, OP, row))
                .transpose()
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        const OP: &str = "book.get_all";
        instrumented(OP, None, || {
            let rows = {
                let conn = self.connect(OP)?;
                select_all_book_rows(&conn).map_err(RepoError::persistence(OP, None))?
            };

            rows.into_iter()
                .map(|row| resolve_book(&self.authors, OP, row))
                .collect()
        })
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        const OP: &str = "book.delete";
        instrumented(OP, Some(id), || {
            let conn = self.connect(OP)?;
            let changed = conn
                .execute("DELETE FROM book WHERE id = ?1;", [id])
                .map_err(RepoError::sqlite(OP, Some(id)))?;
            Ok(changed > 0)
        })
    }
}

fn missing_author_or_sqlite(
    op: &'static str,
    id: Option<BookId>,
    author_id: AuthorId,
    err: rusqlite::Error,
) -> RepoError {
    // The only constraint a valid book can break is the author foreign key.
    let cause = if is_constraint_violation(&err) {
        PersistenceCause::MissingAuthor(author_id)
    } else {
        PersistenceCause::Sqlite(err)
    };
    RepoError::Persistence { op, id, cause }
}

fn select_book_row(conn: &Connection, id: BookId) -> Result<Option<BookRow>, PersistenceCause> {
    let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_book_row(row)?));
    }

    Ok(None)
}

fn select_all_book_rows(conn: &Connection) -> Result<Vec<BookRow>, PersistenceCause> {
    let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut books = Vec::new();

    while let Some(row) = rows.next()? {
        books.push(parse_book_row(row)?);
    }

    Ok(books)
}

fn parse_book_row(row: &Row<'_>) -> Result<BookRow, PersistenceCause> {
    Ok(BookRow {
        id: row.get("id")?,
        title: row.get("title")?,
        author_id: row.get("author_id")?,
        publication_year: row.get("publication_year")?,
    })
}
