//! HTTP surface of the books module, mounted at `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use bookshelf_http::AppError;

use super::handler::{self, BookError, DELETED_MESSAGE};
use super::models::{BookEnvelope, BooksEnvelope, MessageEnvelope};
use super::store::SharedBookStore;

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(violations) => {
                AppError::validation(violations.iter().map(ToString::to_string))
            }
            err @ BookError::NotFound(_) => AppError::not_found(err.to_string()),
            err @ BookError::Conflict(_) => AppError::conflict(err.to_string()),
            BookError::Storage(err) => AppError::Internal(err),
        }
    }
}

pub fn router(store: SharedBookStore) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{isbn}", get(get_book).put(update_book).delete(delete_book))
        .with_state(store)
}

/// Unwrap a JSON body, turning malformed input into a 400
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn list_books(State(store): State<SharedBookStore>) -> Result<Json<BooksEnvelope>, AppError> {
    let books = handler::list(store.as_ref()).await?;
    Ok(Json(BooksEnvelope { books }))
}

async fn get_book(
    State(store): State<SharedBookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = handler::get_one(store.as_ref(), &isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn create_book(
    State(store): State<SharedBookStore>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let payload = json_body(payload)?;
    let book = handler::create(store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

async fn update_book(
    State(store): State<SharedBookStore>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let payload = json_body(payload)?;
    let book = handler::update(store.as_ref(), &isbn, &payload).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn delete_book(
    State(store): State<SharedBookStore>,
    Path(isbn): Path<String>,
) -> Result<Json<MessageEnvelope>, AppError> {
    handler::delete(store.as_ref(), &isbn).await?;
    Ok(Json(MessageEnvelope {
        message: DELETED_MESSAGE.to_string(),
    }))
}
