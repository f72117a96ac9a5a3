// handlers/public/auth.rs - POST /auth/signup, POST /auth/signin, GET /auth/callback

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::auth::{Session, SignUpOutcome};
use crate::controllers::auth::{self, HOME_PATH, LOGIN_PATH};
use crate::handlers::FormInput;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{LoginInput, RegisterInput};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// POST /auth/signup - register; a session is returned unless email confirmation is required
pub async fn signup(
    State(state): State<AppState>,
    FormInput(input): FormInput<RegisterInput>,
) -> ApiResult<SignUpOutcome> {
    let outcome = auth::sign_up(&state, &input).await?;
    let next = if outcome.session.is_some() { HOME_PATH } else { LOGIN_PATH };
    Ok(ApiResponse::created(outcome).redirect_to(next))
}

/// POST /auth/signin - exchange credentials for a bearer session
pub async fn signin(
    State(state): State<AppState>,
    FormInput(input): FormInput<LoginInput>,
) -> ApiResult<Session> {
    let session = auth::sign_in(&state, &input).await?;
    Ok(ApiResponse::success(session).redirect_to(HOME_PATH))
}

/// GET /auth/callback?code= - confirm an email address and start a session
pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> ApiResult<Session> {
    let session = auth::callback(&state, query.code.as_deref()).await?;
    Ok(ApiResponse::success(session).redirect_to(HOME_PATH))
}
