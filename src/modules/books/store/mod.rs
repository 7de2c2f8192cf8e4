//! Storage collaborator for books.

mod memory;
mod postgres;

pub use memory::InMemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::models::{Book, BookFields};

/// Failures surfaced by a [`BookStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A book with this isbn already exists
    #[error("a book with isbn '{0}' already exists")]
    Conflict(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence operations the book handler depends on.
///
/// Every call is a single statement against the backing store. Uniqueness of
/// `isbn` is enforced by the store itself.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by title ascending
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError>;

    /// Insert a new book; `StoreError::Conflict` on a duplicate isbn
    async fn create(&self, book: &Book) -> Result<Book, StoreError>;

    /// Overwrite every mutable field; `None` if no row matches
    async fn update(&self, isbn: &str, fields: &BookFields) -> Result<Option<Book>, StoreError>;

    /// `true` if a row was deleted
    async fn remove(&self, isbn: &str) -> Result<bool, StoreError>;
}

/// Store handle shared by the HTTP handlers.
pub type SharedBookStore = Arc<dyn BookStore>;
