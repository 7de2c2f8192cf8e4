pub mod handler;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use store::SharedBookStore;

/// Book catalogue: CRUD over the `books` table
pub struct BooksModule {
    store: SharedBookStore,
}

impl BooksModule {
    pub fn new(store: SharedBookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let envelope = |description: &str, schema: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };
        let isbn_param = json!([{
            "name": "isbn",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        }]);

        let mut book_properties = json!({
            "amazon_url": { "type": "string" },
            "author": { "type": "string" },
            "language": { "type": "string" },
            "pages": { "type": "integer", "format": "int32" },
            "publisher": { "type": "string" },
            "title": { "type": "string" },
            "year": { "type": "integer", "format": "int32" }
        });
        let field_names = [
            "amazon_url",
            "author",
            "language",
            "pages",
            "publisher",
            "title",
            "year",
        ];
        let field_properties = book_properties.clone();
        book_properties["isbn"] = json!({ "type": "string" });
        let mut book_required = vec!["isbn"];
        book_required.extend(field_names);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books ordered by title",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope("All books", "BooksEnvelope"),
                            "500": error("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": body("Book"),
                        "responses": {
                            "201": envelope("Created book", "BookEnvelope"),
                            "400": error("Validation error"),
                            "409": error("Duplicate isbn"),
                            "500": error("Internal server error")
                        }
                    }
                },
                "/{isbn}": {
                    "get": {
                        "summary": "Get a book by isbn",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": envelope("The book", "BookEnvelope"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Replace every field of a book except isbn",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "requestBody": body("BookFields"),
                        "responses": {
                            "200": envelope("Updated book", "BookEnvelope"),
                            "400": error("Validation error"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": isbn_param,
                        "responses": {
                            "200": envelope("Deletion confirmation", "MessageEnvelope"),
                            "404": error("Book not found"),
                            "500": error("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_properties,
                        "required": book_required
                    },
                    "BookFields": {
                        "type": "object",
                        "properties": field_properties,
                        "required": field_names
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                        "required": ["book"]
                    },
                    "BooksEnvelope": {
                        "type": "object",
                        "properties": {
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["books"]
                    },
                    "MessageEnvelope": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    isbn       TEXT PRIMARY KEY,
                    amazon_url TEXT NOT NULL,
                    author     TEXT NOT NULL,
                    language   TEXT NOT NULL,
                    pages      INTEGER NOT NULL,
                    publisher  TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    year       INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS books_title_idx ON books (title);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a books module backed by `store`
pub fn create_module(store: SharedBookStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
