use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Schema migration contributed by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Lifecycle contract every bookshelf module implements
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module, also its mount point (`/{name}`)
    fn name(&self) -> &'static str;

    /// Called once at startup, after migrations have been applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Axum router for this module's routes, with any state already attached
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components`) merged into the service document.
    /// Paths are relative to the module mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Migrations are executed in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called after every module has been initialized
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called during shutdown, in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
