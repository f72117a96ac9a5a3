// handlers/protected/auth.rs - GET /api/auth/session, POST /api/auth/signout

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::auth::SessionContext;
use crate::controllers::auth::{self, CurrentSession, LOGIN_PATH};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/auth/session - the signed-in user and when the session ends
pub async fn session(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<CurrentSession> {
    let current = auth::current(&state, &session).await?;
    Ok(ApiResponse::success(current))
}

/// POST /api/auth/signout - revoke the presented token
pub async fn signout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Value> {
    auth::sign_out(&state, &session).await;
    Ok(ApiResponse::success(json!({ "signed_out": true })).redirect_to(LOGIN_PATH))
}
