use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use super::{BookStore, StoreError};
use crate::modules::books::models::{Book, BookFields};

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// `books` table in Postgres.
#[derive(Debug, Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn book_from_row(row: &PgRow) -> Result<Book, sqlx::Error> {
    Ok(Book {
        isbn: row.try_get("isbn")?,
        amazon_url: row.try_get("amazon_url")?,
        author: row.try_get("author")?,
        language: row.try_get("language")?,
        pages: row.try_get("pages")?,
        publisher: row.try_get("publisher")?,
        title: row.try_get("title")?,
        year: row.try_get("year")?,
    })
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        // Byte-wise title order, the same order `InMemoryBookStore` uses.
        let rows = sqlx::query(&format!(
            r#"SELECT {COLUMNS} FROM books ORDER BY title COLLATE "C""#
        ))
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")?;

        let books = rows
            .iter()
            .map(book_from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to decode book row")?;
        Ok(books)
    }

    async fn find_one(&self, isbn: &str) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM books WHERE isbn = $1"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load book '{}'", isbn))?;

        let book = row
            .as_ref()
            .map(book_from_row)
            .transpose()
            .context("failed to decode book row")?;
        Ok(book)
    }

    async fn create(&self, book: &Book) -> Result<Book, StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO books ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
        ))
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await;

        let row = match result {
            Ok(row) => row,
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                return Err(StoreError::Conflict(book.isbn.clone()));
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("failed to insert book '{}'", book.isbn))
                    .into());
            }
        };

        Ok(book_from_row(&row).context("failed to decode book row")?)
    }

    async fn update(&self, isbn: &str, fields: &BookFields) -> Result<Option<Book>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE books
             SET amazon_url = $1, author = $2, language = $3, pages = $4,
                 publisher = $5, title = $6, year = $7
             WHERE isbn = $8
             RETURNING {COLUMNS}"
        ))
        .bind(&fields.amazon_url)
        .bind(&fields.author)
        .bind(&fields.language)
        .bind(fields.pages)
        .bind(&fields.publisher)
        .bind(&fields.title)
        .bind(fields.year)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update book '{}'", isbn))?;

        let book = row
            .as_ref()
            .map(book_from_row)
            .transpose()
            .context("failed to decode book row")?;
        Ok(book)
    }

    async fn remove(&self, isbn: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete book '{}'", isbn))?;

        Ok(result.rows_affected() > 0)
    }
}
