use crate::{config::AppConfig, db};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.db).await?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// State over a private in-memory store with the schema already in place.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            db: crate::config::DbConfig {
                url: "sqlite::memory:".into(),
                max_connections: 1,
                acquire_timeout_secs: 1,
                busy_timeout_secs: 1,
            },
        });
        Self::from_parts(db::memory_pool().await, config)
    }
}
