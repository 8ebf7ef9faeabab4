use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Games API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "token": "POST /token (public - form username/password)",
            "me": "GET /users/me (bearer)",
            "games": "GET, POST /games/ (bearer)",
            "game": "GET, PUT, DELETE /games/:id (bearer)",
            "health": "GET /health (public)"
        }
    }))
}

/// GET /health - Liveness plus database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
