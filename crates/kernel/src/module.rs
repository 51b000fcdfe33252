use async_trait::async_trait;
use axum::Router;
use sea_orm::{sea_query::TableCreateStatement, DatabaseConnection, Schema};

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a DatabaseConnection,
}

/// Core module trait that every application module implements
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Path the module's router is mounted under.
    /// Defaults to `/api/{module_name}`; `/` merges the routes at the root.
    fn mount_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Initialize the module with the provided context
    /// Called during application startup after the schema is installed
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return this module's OpenAPI document fragment as JSON
    /// Paths are relative to `mount_path` and get merged with other modules' fragments
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Tables owned by this module, parents before children
    fn schema(&self, _schema: &Schema) -> Vec<TableCreateStatement> {
        vec![]
    }

    /// Load fixture rows into freshly created tables
    async fn seed(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Start background tasks for this module
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
