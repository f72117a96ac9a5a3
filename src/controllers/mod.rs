//! Per-resource controllers.
//!
//! Every form follows the same path: claim the form (one submission in
//! flight), validate the whole input, then persist. Validation failures
//! return every field error plus the submitted values and never reach the
//! store.

pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod interactions;
pub mod listing;
pub mod opportunities;
pub mod pending;
pub mod tasks;

use serde::Serialize;
use std::future::Future;

use crate::auth::SessionContext;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Validate;

/// A persisted record plus the page the caller should move to
#[derive(Debug, Clone, Serialize)]
pub struct Submitted<T> {
    pub record: T,
    pub redirect: String,
}

pub async fn submit<I, T, F, Fut>(
    state: &AppState,
    session: &SessionContext,
    form: &str,
    input: &I,
    persist: F,
) -> Result<T, ApiError>
where
    I: Validate + Serialize,
    F: FnOnce(I::Output) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let _guard = state.pending.begin(session.user_id, form)?;

    let fields = input.validate().map_err(|errors| {
        let submitted = serde_json::to_value(input).unwrap_or_default();
        ApiError::from(errors).with_values(submitted)
    })?;

    persist(fields).await
}

/// Deletes are irreversible and must be confirmed explicitly
pub fn require_confirmation(confirm: bool, what: &str) -> Result<(), ApiError> {
    if confirm {
        Ok(())
    } else {
        Err(ApiError::confirmation_required(format!(
            "Deleting this {} cannot be undone; repeat the request with confirm=true",
            what
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use uuid::Uuid;

    use crate::auth::SessionContext;
    use crate::config::AppConfig;
    use crate::state::AppState;

    pub fn state() -> AppState {
        AppState::in_memory(&AppConfig::development().security).unwrap()
    }

    pub fn session() -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            token_id: Uuid::new_v4(),
            expires_at: i64::MAX,
        }
    }
}
