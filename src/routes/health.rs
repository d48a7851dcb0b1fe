use axum::{routing::any, Router};
use time::{macros::format_description, OffsetDateTime};
use tracing::warn;

use crate::{
    response::{ApiResponse, HealthStatus, Payload},
    state::AppState,
};

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", any(health))
}

/// Liveness only; the store is not consulted. Any method is accepted.
pub async fn health() -> ApiResponse {
    ApiResponse::ok(
        "service is running",
        Payload::Health(HealthStatus {
            status: "healthy",
            timestamp: format_timestamp(OffsetDateTime::now_utc()),
        }),
    )
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|e| {
        warn!(error = %e, "format health timestamp");
        String::new()
    })
}
