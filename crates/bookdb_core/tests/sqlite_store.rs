use bookdb_core::db::schema::schema_version;
use bookdb_core::db::{open_db, ConnectionProvider, DbError};
use bookdb_core::{
    Author, AuthorRepository, Book, BookRepository, FileConnectionProvider,
    MemoryConnectionProvider, PersistenceCause, RepoError, SqliteAuthorRepository,
    SqliteBookRepository,
};
use rusqlite::Connection;

#[test]
fn acquired_connections_have_schema_and_foreign_keys() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let conn = provider.acquire().unwrap();

    assert_eq!(user_version(&conn), schema_version());
    assert_table_exists(&conn, "author");
    assert_table_exists(&conn, "book");
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn memory_providers_do_not_share_data() {
    let first = MemoryConnectionProvider::new().unwrap();
    let second = MemoryConnectionProvider::new().unwrap();
    assert_ne!(first.name(), second.name());

    let mut author = Author::new("Ada", "Lovelace", None);
    SqliteAuthorRepository::new(&first).add(&mut author).unwrap();

    assert_eq!(SqliteAuthorRepository::new(&first).get_all().unwrap().len(), 1);
    assert!(SqliteAuthorRepository::new(&second).get_all().unwrap().is_empty());
}

#[test]
fn file_store_keeps_rows_across_providers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    let mut author = Author::new("Mary", "Shelley", None);
    {
        let provider = FileConnectionProvider::new(&path);
        provider.check().unwrap();
        SqliteAuthorRepository::new(&provider).add(&mut author).unwrap();
    }

    let provider = FileConnectionProvider::new(&path);
    let loaded = SqliteAuthorRepository::new(&provider)
        .get(author.id().unwrap())
        .unwrap();
    assert_eq!(loaded, Some(author));
}

#[test]
fn unreachable_store_surfaces_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FileConnectionProvider::new(dir.path().join("missing").join("books.db"));
    assert!(provider.check().is_err());

    let authors = SqliteAuthorRepository::new(&provider);
    let err = authors.get_all().unwrap_err();
    assert!(matches!(err, RepoError::Connection { op: "author.get_all", .. }));

    let mut author = Author::new("Ada", "Lovelace", None);
    let err = authors.add(&mut author).unwrap_err();
    assert!(matches!(err, RepoError::Connection { op: "author.add", .. }));
    assert_eq!(author.id(), None);
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    let err = FileConnectionProvider::new(&path).acquire().unwrap_err();
    match err.db_error() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(*db_version, 999);
            assert_eq!(*latest_supported, schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("future.db"));
}

#[test]
fn reopening_bootstrapped_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.db");

    drop(open_db(&path).unwrap());
    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), schema_version());
}

#[test]
fn book_with_dangling_author_is_a_persistence_failure() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let book_id = {
        let conn = provider.acquire().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO book (title, author_id) VALUES ('Orphan', 42);",
        )
        .unwrap();
        conn.last_insert_rowid()
    };

    let authors = SqliteAuthorRepository::new(&provider);
    let books = SqliteBookRepository::new(&provider, &authors);

    let err = books.get(book_id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Persistence {
            op: "book.get",
            id: Some(id),
            cause: PersistenceCause::MissingAuthor(42),
        } if id == book_id
    ));

    let err = books.get_all().unwrap_err();
    assert_eq!(err.operation(), "book.get_all");
}

#[test]
fn malformed_birth_date_is_a_persistence_failure() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let author_id = {
        let conn = provider.acquire().unwrap();
        conn.execute(
            "INSERT INTO author (first_name, last_name, birth_date) VALUES ('Ada', 'Lovelace', 'sometime');",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    };

    let err = SqliteAuthorRepository::new(&provider)
        .get(author_id)
        .unwrap_err();
    match err {
        RepoError::Persistence {
            op: "author.get",
            cause: PersistenceCause::InvalidData(message),
            ..
        } => assert!(message.contains("author.birth_date")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_author_row_is_reported_against_the_book() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let authors = SqliteAuthorRepository::new(&provider);
    let books = SqliteBookRepository::new(&provider, &authors);

    let mut author = Author::new("Ada", "Lovelace", None);
    let author_id = authors.add(&mut author).unwrap();
    let mut book = Book::new("Notes", author);
    let book_id = books.add(&mut book).unwrap();
    provider
        .acquire()
        .unwrap()
        .execute(
            "UPDATE author SET birth_date = 'garbage' WHERE id = ?1;",
            [author_id],
        )
        .unwrap();

    let err = books.get(book_id).unwrap_err();
    assert!(
        matches!(
            err,
            RepoError::Persistence {
                op: "book.get",
                id: Some(id),
                cause: PersistenceCause::InvalidData(_),
            } if id == book_id
        ),
        "unexpected error: {err}"
    );

    let err = books.get_all().unwrap_err();
    assert_eq!(err.operation(), "book.get_all");
    assert!(matches!(err, RepoError::Persistence { id: Some(id), .. } if id == book_id));
}

#[test]
fn birth_date_is_stored_as_iso_text() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let mut author = Author::new(
        "Ada",
        "Lovelace",
        chrono::NaiveDate::from_ymd_opt(1815, 12, 10),
    );
    let id = SqliteAuthorRepository::new(&provider).add(&mut author).unwrap();

    let stored: String = provider
        .acquire()
        .unwrap()
        .query_row("SELECT birth_date FROM author WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(stored, "1815-12-10");
}

#[test]
fn book_write_persists_only_the_author_identity() {
    let provider = MemoryConnectionProvider::new().unwrap();
    let authors = SqliteAuthorRepository::new(&provider);
    let books = SqliteBookRepository::new(&provider, &authors);

    let mut author = Author::new("Ada", "Lovelace", None);
    authors.add(&mut author).unwrap();

    let mut stale = author.clone();
    stale.first_name = "Not".to_string();
    stale.last_name = "Persisted".to_string();
    let mut book = Book::new("Notes", stale);
    let id = books.add(&mut book).unwrap();

    assert_eq!(authors.get(author.id().unwrap()).unwrap(), Some(author.clone()));
    assert_eq!(books.get(id).unwrap().unwrap().author, author);
}

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
