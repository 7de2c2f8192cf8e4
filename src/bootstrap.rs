//! Process bootstrap: database, migrations, module lifecycle and HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{
    self,
    books::store::{InMemoryBookStore, PgBookStore},
};

/// Connect to the database, apply migrations and serve HTTP until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        bind = %settings.server.bind_address(),
        "bookshelf bootstrap starting"
    );

    let pool = bookshelf_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(PgBookStore::new(pool.clone())));

    bookshelf_db::migrate(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!(modules = registry.len(), "bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    pool.close().await;

    served
}

/// Apply pending migrations for every module and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database).await?;

    let registry = route_registry();
    let applied = bookshelf_db::migrate(&pool, &registry.collect_migrations()).await?;

    pool.close().await;
    Ok(applied)
}

/// Registry with every module registered but no database attached.
///
/// Suitable for inspecting routes and migrations; request handling runs
/// against an empty in-memory store.
pub fn route_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(InMemoryBookStore::new()));
    registry
}
