use anyhow::Context;

mod app;
mod config;
mod db;
mod error;
mod response;
mod routes;
mod state;
mod users;

use crate::{app::build_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "usercrud=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(url = %app_state.config.db.url, "database connected");

    users::repo::init_schema(&app_state.db)
        .await
        .context("create users table")?;

    let app = build_app(app_state.clone());
    app::serve(app, app_state).await
}
