// handlers/protected/dashboard.rs - GET /api/dashboard

use axum::{extract::State, Extension};

use crate::auth::SessionContext;
use crate::controllers::dashboard::{self, Dashboard};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn show(State(state): State<AppState>, Extension(session): Extension<SessionContext>) -> ApiResult<Dashboard> {
    Ok(ApiResponse::success(dashboard::load(&state, &session).await?))
}
