use serde::{Deserialize, Serialize};

/// A catalogued book. `isbn` is the identity and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// The mutable part of a book: every field except `isbn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl Book {
    pub fn from_parts(isbn: impl Into<String>, fields: BookFields) -> Self {
        Self {
            isbn: isbn.into(),
            amazon_url: fields.amazon_url,
            author: fields.author,
            language: fields.language,
            pages: fields.pages,
            publisher: fields.publisher,
            title: fields.title,
            year: fields.year,
        }
    }

    /// Replace every mutable field, keeping `isbn`
    pub fn apply(&mut self, fields: BookFields) {
        let isbn = std::mem::take(&mut self.isbn);
        *self = Book::from_parts(isbn, fields);
    }
}

/// `{"book": Book}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// `{"books": [Book, ...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksEnvelope {
    pub books: Vec<Book>,
}

/// `{"message": ".."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
}
