use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::DbConfig;

/// Opens the SQLite pool, creating the database file if it does not exist yet.
pub async fn connect(cfg: &DbConfig) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&cfg.url)
        .with_context(|| format!("parse database url {}", cfg.url))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs));

    let db = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect_with(opts)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// Every in-memory SQLite connection is its own database, so the test pool
/// holds exactly one connection and never recycles it.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    crate::users::repo::init_schema(&db)
        .await
        .expect("create users table");
    db
}
