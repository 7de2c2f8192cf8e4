//! Book resource operations.
//!
//! Each function is one request/response transaction against the store. HTTP
//! concerns live in `routes`; failures are reported as [`BookError`].

use serde_json::Value;
use thiserror::Error;

use super::models::Book;
use super::schema::{self, Violation};
use super::store::{BookStore, StoreError};

pub const DELETED_MESSAGE: &str = "Book deleted";

#[derive(Debug, Error)]
pub enum BookError {
    #[error("invalid book payload ({} violations)", .0.len())]
    Validation(Vec<Violation>),

    #[error("There is no book with an isbn of '{0}'")]
    NotFound(String),

    #[error("A book with an isbn of '{0}' already exists")]
    Conflict(String),

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(isbn) => BookError::Conflict(isbn),
            StoreError::Backend(err) => BookError::Storage(err),
        }
    }
}

/// Every book, ordered by title.
pub async fn list(store: &dyn BookStore) -> Result<Vec<Book>, BookError> {
    let books = store.find_all().await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(books)
}

pub async fn get_one(store: &dyn BookStore, isbn: &str) -> Result<Book, BookError> {
    store
        .find_one(isbn)
        .await?
        .ok_or_else(|| BookError::NotFound(isbn.to_string()))
}

/// Validate and insert a new book.
///
/// Existence is not checked first: a duplicate isbn is reported by the store's
/// uniqueness constraint.
pub async fn create(store: &dyn BookStore, payload: &Value) -> Result<Book, BookError> {
    let book = schema::validate_create(payload).map_err(BookError::Validation)?;

    let created = store.create(&book).await?;
    tracing::info!(isbn = %created.isbn, title = %created.title, "book created");
    Ok(created)
}

/// Validate and overwrite every field except `isbn`.
pub async fn update(store: &dyn BookStore, isbn: &str, payload: &Value) -> Result<Book, BookError> {
    let fields = schema::validate_update(payload).map_err(BookError::Validation)?;

    ensure_exists(store, isbn).await?;

    let updated = store
        .update(isbn, &fields)
        .await?
        .ok_or_else(|| BookError::NotFound(isbn.to_string()))?;
    tracing::info!(isbn = %updated.isbn, "book updated");
    Ok(updated)
}

pub async fn delete(store: &dyn BookStore, isbn: &str) -> Result<(), BookError> {
    ensure_exists(store, isbn).await?;

    if !store.remove(isbn).await? {
        return Err(BookError::NotFound(isbn.to_string()));
    }
    tracing::info!(isbn = %isbn, "book deleted");
    Ok(())
}

async fn ensure_exists(store: &dyn BookStore, isbn: &str) -> Result<(), BookError> {
    match store.find_one(isbn).await? {
        Some(_) => Ok(()),
        None => Err(BookError::NotFound(isbn.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::BookFields;
    use crate::modules::books::store::InMemoryBookStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn sample() -> Book {
        Book {
            isbn: "123432122".to_string(),
            amazon_url: "https://amazon.com/taco".to_string(),
            author: "Elie".to_string(),
            language: "English".to_string(),
            pages: 100,
            publisher: "Nothing publishers".to_string(),
            title: "my first book".to_string(),
            year: 2008,
        }
    }

    fn dracula_fields() -> Value {
        json!({
            "amazon_url": "https://www.amazon.com/Dracula-Norton-Critical-Editions-Stoker/dp/0393970124",
            "author": "Bram Stoker",
            "language": "english",
            "pages": 512,
            "publisher": "W. W. Norton & Company",
            "title": "Dracula",
            "year": 1996
        })
    }

    /// Store whose backend is unreachable
    struct BrokenStore;

    #[async_trait]
    impl BookStore for BrokenStore {
        async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn find_one(&self, _isbn: &str) -> Result<Option<Book>, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn create(&self, _book: &Book) -> Result<Book, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn update(
            &self,
            _isbn: &str,
            _fields: &BookFields,
        ) -> Result<Option<Book>, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn remove(&self, _isbn: &str) -> Result<bool, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let store = InMemoryBookStore::new();
        let mut payload = dracula_fields();
        payload["isbn"] = json!("9780393970128");

        let created = create(&store, &payload).await.unwrap();
        let fetched = get_one(&store, "9780393970128").await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.author, "Bram Stoker");
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let store = InMemoryBookStore::new();

        let err = create(&store, &dracula_fields()).await.unwrap_err();

        assert!(matches!(
            err,
            BookError::Validation(ref v) if v.len() == 1 && v[0].field == "isbn"
        ));
        assert!(list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_conflict() {
        let store = InMemoryBookStore::with_books([sample()]);
        let mut payload = dracula_fields();
        payload["isbn"] = json!("123432122");

        let err = create(&store, &payload).await.unwrap_err();

        assert!(matches!(err, BookError::Conflict(ref isbn) if isbn == "123432122"));
        assert_eq!(get_one(&store, "123432122").await.unwrap().title, "my first book");
    }

    #[tokio::test]
    async fn update_never_changes_isbn() {
        let store = InMemoryBookStore::with_books([sample()]);
        let mut payload = dracula_fields();
        payload["isbn"] = json!("999");

        let updated = update(&store, "123432122", &payload).await.unwrap();

        assert_eq!(updated.isbn, "123432122");
        assert_eq!(updated.title, "Dracula");
        assert!(matches!(
            get_one(&store, "999").await,
            Err(BookError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_validates_before_touching_storage() {
        let mut payload = dracula_fields();
        payload.as_object_mut().unwrap().remove("language");

        let err = update(&BrokenStore, "123432122", &payload).await.unwrap_err();

        assert!(matches!(err, BookError::Validation(_)));
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let store = InMemoryBookStore::new();

        let err = update(&store, "0", &dracula_fields()).await.unwrap_err();

        assert!(matches!(err, BookError::NotFound(ref isbn) if isbn == "0"));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let store = InMemoryBookStore::with_books([sample()]);

        delete(&store, "123432122").await.unwrap();
        let err = delete(&store, "123432122").await.unwrap_err();

        assert!(matches!(err, BookError::NotFound(_)));
    }

    #[tokio::test]
    async fn storage_faults_surface_as_storage_errors() {
        assert!(matches!(list(&BrokenStore).await, Err(BookError::Storage(_))));
        assert!(matches!(
            get_one(&BrokenStore, "123432122").await,
            Err(BookError::Storage(_))
        ));
        assert!(matches!(
            delete(&BrokenStore, "123432122").await,
            Err(BookError::Storage(_))
        ));
    }

    #[test]
    fn not_found_message_names_isbn() {
        assert_eq!(
            BookError::NotFound("0".to_string()).to_string(),
            "There is no book with an isbn of '0'"
        );
    }
}
