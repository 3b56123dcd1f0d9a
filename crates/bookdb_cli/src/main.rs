//! Catalog listing entry point.
//!
//! # Responsibility
//! - Verify `bookdb_core` wiring against a real database file.
//! - Print every author and every book with its resolved author.
//!
//! Usage: `bookdb_cli [DATABASE_PATH]`; without an argument the store is
//! configured from `BOOKDB_*` environment variables.

use bookdb_core::{
    init_logging, AuthorRepository, BookRepository, SqliteAuthorRepository, SqliteBookRepository,
    StoreConfig,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("bookdb_core version={}", bookdb_core::core_version());

    let config = match std::env::args_os().nth(1) {
        Some(path) => StoreConfig::for_database(path),
        None => StoreConfig::from_env()?,
    };
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok database={}",
        config.database_path.display()
    );

    let provider = config.provider();
    let authors = SqliteAuthorRepository::new(&provider);
    let books = SqliteBookRepository::new(&provider, &authors);

    println!("authors:");
    for author in authors.get_all()? {
        let born = author
            .birth_date
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        println!(
            "  #{} {} (born {born})",
            author.id().unwrap_or_default(),
            author.full_name()
        );
    }

    println!("books:");
    for book in books.get_all()? {
        let year = book
            .publication_year
            .map_or_else(|| "-".to_string(), |year| year.to_string());
        println!(
            "  #{} {} by {} ({year})",
            book.id().unwrap_or_default(),
            book.title,
            book.author.full_name()
        );
    }

    Ok(())
}
