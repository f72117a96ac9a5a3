use serde::Serialize;

use crate::auth::{Session, SessionContext, SignUpOutcome};
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{LoginInput, RegisterInput, Validate};

pub const HOME_PATH: &str = "/api/dashboard";
pub const LOGIN_PATH: &str = "/auth/signin";

#[derive(Debug, Clone, Serialize)]
pub struct CurrentSession {
    pub user: Profile,
    pub expires_at: i64,
}

/// Failed credentials echo the submitted fields (never the password)
fn echo<I: Serialize>(input: &I, err: impl Into<ApiError>) -> ApiError {
    err.into().with_values(serde_json::to_value(input).unwrap_or_default())
}

pub async fn sign_up(state: &AppState, input: &RegisterInput) -> Result<SignUpOutcome, ApiError> {
    let registration = input.validate().map_err(|e| echo(input, e))?;
    state
        .sessions
        .sign_up(registration)
        .await
        .map_err(|e| echo(input, e))
}

pub async fn sign_in(state: &AppState, input: &LoginInput) -> Result<Session, ApiError> {
    let credentials = input.validate().map_err(|e| echo(input, e))?;
    state
        .sessions
        .sign_in(credentials)
        .await
        .map_err(|e| echo(input, e))
}

/// Exchange an emailed confirmation code for a session
pub async fn callback(state: &AppState, code: Option<&str>) -> Result<Session, ApiError> {
    let code = code.unwrap_or_default();
    Ok(state.sessions.exchange_code(code).await?)
}

pub async fn current(state: &AppState, session: &SessionContext) -> Result<CurrentSession, ApiError> {
    let user = state.sessions.current_user(session).await?;
    Ok(CurrentSession {
        user,
        expires_at: session.expires_at,
    })
}

pub async fn sign_out(state: &AppState, session: &SessionContext) {
    state.sessions.sign_out(session).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::state;

    fn register(email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            password: password.into(),
            full_name: "Ana Diaz".into(),
        }
    }

    #[tokio::test]
    async fn validation_errors_echo_without_password() {
        let state = state();
        let err = sign_up(&state, &register("ana", "123")).await.unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, values, .. } => {
                assert!(field_errors.get("email").is_some());
                assert!(field_errors.get("password").is_some());
                let values = values.unwrap();
                assert_eq!(values["email"], "ana");
                assert!(values.get("password").is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_password_is_an_auth_error_with_values() {
        let state = state();
        sign_up(&state, &register("ana@example.com", "secret1")).await.unwrap();

        let login = LoginInput {
            email: "ana@example.com".into(),
            password: "wrong-one".into(),
        };
        let err = sign_in(&state, &login).await.unwrap_err();
        assert_eq!(err.error_code(), "AUTH_ERROR");
        assert_eq!(err.to_json()["values"]["email"], "ana@example.com");
    }

    #[tokio::test]
    async fn missing_code_is_refused() {
        let state = state();
        assert_eq!(callback(&state, None).await.unwrap_err().error_code(), "AUTH_ERROR");
    }
}
