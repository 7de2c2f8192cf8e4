//! Postgres pool factory and migration runner.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;

const MIGRATIONS_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (module, id)
)";

/// Open a connection pool to the configured database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let pool = pool_options(settings)
        .connect(&settings.url)
        .await
        .with_context(|| "failed to connect to database")?;

    tracing::info!(
        target: "bookshelf-db",
        max_connections = settings.max_connections,
        "database pool ready"
    );

    Ok(pool)
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
}

/// Apply every migration not yet recorded in `schema_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied.
pub async fn migrate(pool: &PgPool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE_DDL)
        .execute(pool)
        .await
        .context("failed to create schema_migrations table")?;

    let applied: HashSet<(String, String)> = sqlx::query("SELECT module, id FROM schema_migrations")
        .fetch_all(pool)
        .await
        .context("failed to read applied migrations")?
        .into_iter()
        .map(|row| -> Result<(String, String), sqlx::Error> {
            Ok((row.try_get("module")?, row.try_get("id")?))
        })
        .collect::<Result<_, _>>()?;

    let todo = pending(&applied, migrations);

    for (module, migration) in &todo {
        tracing::info!(
            target: "bookshelf-db",
            module = %module,
            id = migration.id,
            "applying migration"
        );

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO schema_migrations (module, id) VALUES ($1, $2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    if todo.is_empty() {
        tracing::info!(target: "bookshelf-db", "schema is up to date");
    }

    Ok(todo.len())
}

/// Migrations not present in `applied`, in their given order.
fn pending<'a>(
    applied: &HashSet<(String, String)>,
    migrations: &'a [(String, Migration)],
) -> Vec<&'a (String, Migration)> {
    migrations
        .iter()
        .filter(|(module, migration)| {
            !applied.contains(&(module.clone(), migration.id.to_string()))
        })
        .collect()
}
