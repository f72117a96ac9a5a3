// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, health, and the session acquisition endpoints under /auth.

pub mod auth;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service info
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "CRM API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Clients, interactions, opportunities and tasks, scoped to the signed-in user",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/signup, /auth/signin, /auth/callback (public - session acquisition)",
                "auth": "/api/auth/session, /api/auth/signout (protected)",
                "clients": "/api/clients[/:id] (protected)",
                "interactions": "/api/clients/:id/interactions[/:interaction_id] (protected)",
                "opportunities": "/api/opportunities[/:id] (protected)",
                "tasks": "/api/tasks[/:id][/toggle] (protected)",
                "dashboard": "/api/dashboard (protected)",
            }
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
