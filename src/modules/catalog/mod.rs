pub mod form;
pub mod models;
pub mod operations;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use sea_orm::{sea_query::TableCreateStatement, DatabaseConnection, Schema};
use serde_json::json;

/// Author and book catalog served from the site root.
pub struct CatalogModule {
    db: DatabaseConnection,
}

impl CatalogModule {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn mount_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let authors = repository::list_all_authors(ctx.db)
            .await
            .with_context(|| "catalog tables are not readable")?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            authors = authors.len(),
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(routes::CatalogState {
            db: self.db.clone(),
        })
    }

    fn schema(&self, schema: &Schema) -> Vec<TableCreateStatement> {
        vec![
            schema.create_table_from_entity(models::author::Entity),
            schema.create_table_from_entity(models::book::Entity),
        ]
    }

    async fn seed(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        seed::load(ctx.db)
            .await
            .with_context(|| "failed to load catalog fixtures")
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let page = json!({
            "description": "Catalog page",
            "content": { "text/html": { "schema": { "type": "string" } } }
        });
        let page_with_notice = |description: &str| {
            json!({
                "description": description,
                "content": { "text/html": { "schema": { "type": "string" } } }
            })
        };
        let redirect = json!({ "description": "Deleted; redirect to the catalog page" });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Show the catalog",
                        "tags": ["Catalog"],
                        "responses": { "200": page }
                    },
                    "post": {
                        "summary": "Add a book, creating its author if needed",
                        "tags": ["Catalog"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/AddBookForm" }
                                }
                            }
                        },
                        "responses": {
                            "200": page,
                            "409": page_with_notice("Book already exists"),
                            "422": page_with_notice("Invalid parameters"),
                            "500": page_with_notice("Add failed")
                        }
                    }
                },
                "/delete_author/{author_id}": {
                    "get": {
                        "summary": "Delete an author and all of their books",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "author_id", "in": "path", "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "303": redirect,
                            "400": page_with_notice("Author lookup failed"),
                            "404": page_with_notice("Author does not exist"),
                            "500": page_with_notice("Author deletion failed")
                        }
                    }
                },
                "/delete_book/{book_id}": {
                    "get": {
                        "summary": "Delete a single book",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "book_id", "in": "path", "required": true,
                            "schema": { "type": "integer" }
                        }],
                        "responses": {
                            "303": redirect,
                            "400": page_with_notice("Book lookup failed"),
                            "404": page_with_notice("Book does not exist"),
                            "500": page_with_notice("Book deletion failed")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "AddBookForm": {
                        "type": "object",
                        "properties": {
                            "author": { "type": "string", "description": "Author name" },
                            "book": {
                                "type": "string",
                                "description": "Book title, unique across the catalog"
                            }
                        },
                        "required": ["author", "book"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create a new instance of the catalog module
pub fn create_module(db: DatabaseConnection) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(db))
}
