use bookdb_core::{Author, Book, ValidationError};
use chrono::NaiveDate;

#[test]
fn new_entities_have_no_identity() {
    let author = Author::new("Ada", "Lovelace", None);
    assert_eq!(author.id(), None);
    assert_eq!(author.full_name(), "Ada Lovelace");

    let book = Book::new("Notes", author);
    assert_eq!(book.id(), None);
    assert_eq!(book.publication_year, None);
}

#[test]
fn author_validation_requires_both_names() {
    assert_eq!(
        Author::new("Ada", "", None).validate(),
        Err(ValidationError::EmptyField {
            entity: "author",
            field: "last_name"
        })
    );
    assert!(Author::new("Ada", "Lovelace", None).validate().is_ok());
}

#[test]
fn book_validation_requires_title_and_persisted_author() {
    let stored = Author::with_id(7, "Ada", "Lovelace", None);

    assert_eq!(
        Book::new(" ", stored.clone()).validate(),
        Err(ValidationError::EmptyField {
            entity: "book",
            field: "title"
        })
    );
    assert_eq!(
        Book::new("Notes", Author::new("Ada", "Lovelace", None)).validate(),
        Err(ValidationError::AuthorNotPersisted)
    );
    assert!(Book::new("Notes", stored).validate().is_ok());
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let author = Author::with_id(
        3,
        "Ada",
        "Lovelace",
        NaiveDate::from_ymd_opt(1815, 12, 10),
    );
    let book = Book::with_id(9, "Sketch of the Analytical Engine", author).published_in(1843);

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["id"], 9);
    assert_eq!(json["title"], "Sketch of the Analytical Engine");
    assert_eq!(json["publication_year"], 1843);
    assert_eq!(json["author"]["id"], 3);
    assert_eq!(json["author"]["first_name"], "Ada");
    assert_eq!(json["author"]["birth_date"], "1815-12-10");

    let decoded: Book = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, book);
}

#[test]
fn unpersisted_author_serializes_null_identity() {
    let json = serde_json::to_value(Author::new("Homer", "Unknown", None)).unwrap();
    assert!(json["id"].is_null());
    assert!(json["birth_date"].is_null());
}
