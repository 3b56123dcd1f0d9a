//! In-memory repositories honoring the same contract as SQLite.
//!
//! # Responsibility
//! - Back `AuthorRepository`/`BookRepository` with process-local tables.
//! - Emulate the store's foreign-key rules so contract tests behave the
//!   same against both backends.
//!
//! # Invariants
//! - Identities start at 1 and are never reused, like `AUTOINCREMENT`.
//! - Single-threaded: repositories borrow one `MemoryStore`.

use super::author_repo::{validate_new_author, validate_stored_author, AuthorRepository};
use super::book_repo::{
    resolve_book, validate_new_book, validate_stored_book, BookRepository, BookRow,
};
use super::{
    instrumented, instrumented_insert, report_update, PersistenceCause, RepoError, RepoResult,
};
use crate::model::{Author, AuthorId, Book, BookId};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, BookRow>,
    last_author_id: AuthorId,
    last_book_id: BookId,
}

/// Shared tables for the in-memory repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory author repository.
pub struct MemoryAuthorRepository<'s> {
    store: &'s MemoryStore,
}

impl<'s> MemoryAuthorRepository<'s> {
    pub fn new(store: &'s MemoryStore) -> Self {
        Self { store }
    }
}

impl AuthorRepository for MemoryAuthorRepository<'_> {
    fn add(&self, author: &mut Author) -> RepoResult<AuthorId> {
        const OP: &str = "author.add";
        instrumented_insert(OP, || {
            validate_new_author(author).map_err(RepoError::validation(OP))?;

            let mut tables = self.store.tables.borrow_mut();
            tables.last_author_id += 1;
            let id = tables.last_author_id;
            author.assign_id(id);
            tables.authors.insert(id, author.clone());
            Ok(id)
        })
    }

    fn update(&self, author: &Author) -> RepoResult<bool> {
        const OP: &str = "author.update";
        instrumented(OP, author.id(), || {
            let id = validate_stored_author(author).map_err(RepoError::validation(OP))?;

            let mut tables = self.store.tables.borrow_mut();
            let changed = match tables.authors.get_mut(&id) {
                Some(stored) => {
                    *stored = author.clone();
                    1
                }
                None => 0,
            };
            Ok(report_update(OP, id, changed))
        })
    }

    fn get(&self, id: AuthorId) -> RepoResult<Option<Author>> {
        instrumented("author.get", Some(id), || {
            Ok(self.store.tables.borrow().authors.get(&id).cloned())
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Author>> {
        instrumented("author.get_all", None, || {
            Ok(self.store.tables.borrow().authors.values().cloned().collect())
        })
    }

    fn delete(&self, id: AuthorId) -> RepoResult<bool> {
        const OP: &str = "author.delete";
        instrumented(OP, Some(id), || {
            let mut tables = self.store.tables.borrow_mut();
            if tables.books.values().any(|row| row.author_id == id) {
                return Err(RepoError::persistence(OP, Some(id))(
                    PersistenceCause::AuthorInUse(id),
                ));
            }
            Ok(tables.authors.remove(&id).is_some())
        })
    }
}

/// In-memory book repository resolving authors through `A`.
pub struct MemoryBookRepository<'s, A> {
    store: &'s MemoryStore,
    authors: A,
}

impl<'s, A: AuthorRepository> MemoryBookRepository<'s, A> {
    pub fn new(store: &'s MemoryStore, authors: A) -> Self {
        Self { store, authors }
    }

    /// Emulates the author foreign key through the same repository that
    /// resolves authors on read.
    fn require_author(
        &self,
        op: &'static str,
        id: Option<BookId>,
        author_id: AuthorId,
    ) -> RepoResult<()> {
        match self.authors.get(author_id).map_err(|err| err.within(op, id))? {
            Some(_) => Ok(()),
            None => Err(RepoError::persistence(op, id)(
                PersistenceCause::MissingAuthor(author_id),
            )),
        }
    }
}

impl<A: AuthorRepository> BookRepository for MemoryBookRepository<'_, A> {
    fn add(&self, book: &mut Book) -> RepoResult<BookId> {
        const OP: &str = "book.add";
        instrumented_insert(OP, || {
            let author_id = validate_new_book(book).map_err(RepoError::validation(OP))?;

            self.require_author(OP, None, author_id)?;

            let mut tables = self.store.tables.borrow_mut();
            tables.last_book_id += 1;
            let id = tables.last_book_id;
            tables.books.insert(id, BookRow::from_book(id, author_id, book));
            book.assign_id(id);
            Ok(id)
        })
    }

    fn update(&self, book: &Book) -> RepoResult<bool> {
        const OP: &str = "book.update";
        instrumented(OP, book.id(), || {
            let (id, author_id) = validate_stored_book(book).map_err(RepoError::validation(OP))?;

            if !self.store.tables.borrow().books.contains_key(&id) {
                return Ok(report_update(OP, id, 0));
            }
            self.require_author(OP, Some(id), author_id)?;

            self.store
                .tables
                .borrow_mut()
                .books
                .insert(id, BookRow::from_book(id, author_id, book));
            Ok(report_update(OP, id, 1))
        })
    }

    fn get(&self, id: BookId) -> RepoResult<Option<Book>> {
        const OP: &str = "book.get";
        instrumented(OP, Some(id), || {
            let row = self.store.tables.borrow().books.get(&id).cloned();
            row.map(|row| resolve_book(&self.authors, OP, row))
                .transpose()
        })
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        const OP: &str = "book.get_all";
        instrumented(OP, None, || {
            let rows: Vec<BookRow> = self.store.tables.borrow().books.values().cloned().collect();
            rows.into_iter()
                .map(|row| resolve_book(&self.authors, OP, row))
                .collect()
        })
    }

    fn delete(&self, id: BookId) -> RepoResult<bool> {
        instrumented("book.delete", Some(id), || {
            Ok(self.store.tables.borrow_mut().books.remove(&id).is_some())
        })
    }
}
