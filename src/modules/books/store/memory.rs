use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields};

/// Process-local store keyed by isbn.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<BTreeMap<String, Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing books
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect();

        Self {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.books.read().await.get(isbn).cloned())
    }

    async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.isbn) {
            return Err(StoreError::Conflict(book.isbn.clone()));
        }
        books.insert(book.isbn.clone(), book.clone());
        Ok(book.clone())
    }

    async fn update(&self, isbn: &str, fields: &BookFields) -> Result<Option<Book>, StoreError> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(isbn).map(|book| {
            book.apply(fields.clone());
            book.clone()
        }))
    }

    async fn remove(&self, isbn: &str) -> Result<bool, StoreError> {
        Ok(self.books.write().await.remove(isbn).is_some())
    }
}
