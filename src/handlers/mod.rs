// handlers/mod.rs - HTTP surface, split by security tier
//
// Public (no auth) → /, /health, /auth/*
// Protected (bearer session) → /api/*
//
// Handlers only translate between HTTP and the controllers: extract, call,
// wrap the result in the success envelope.

pub mod protected;
pub mod public;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::controllers::Submitted;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::validation::FieldErrors;

const WRONG_TYPE: &str = "Has the wrong type";

/// JSON form body. A field of the wrong JSON type becomes a field error
/// with the submitted values echoed, like any other validation failure.
pub struct FormInput<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormInput<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;
        parse_form(body).map(FormInput)
    }
}

/// Every form input defaults missing fields, so each key can be tried alone
pub(crate) fn parse_form<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    let err = match serde_json::from_value::<T>(body.clone()) {
        Ok(input) => return Ok(input),
        Err(err) => err,
    };
    let Value::Object(submitted) = body else {
        return Err(ApiError::bad_request("Form body must be a JSON object"));
    };

    let mut errors = FieldErrors::new();
    for (key, value) in &submitted {
        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(single)).is_err() {
            errors.add(key, WRONG_TYPE);
        }
    }
    if errors.is_empty() {
        return Err(ApiError::bad_request(format!("Invalid form body: {}", err)));
    }

    let mut values = submitted;
    values.remove("password");
    Err(ApiError::from(errors).with_values(Value::Object(values)))
}

/// `?confirm=true` on every DELETE
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmQuery {
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

/// 201 with the new record, pointing the caller at its page
pub(crate) fn created<T: Serialize>(submitted: Submitted<T>) -> ApiResponse<T> {
    ApiResponse::created(submitted.record).redirect_to(submitted.redirect)
}

pub(crate) fn saved<T: Serialize>(submitted: Submitted<T>) -> ApiResponse<T> {
    ApiResponse::success(submitted.record).redirect_to(submitted.redirect)
}

pub(crate) fn deleted(id: Uuid, redirect: String) -> ApiResponse<Deleted> {
    ApiResponse::success(Deleted { id }).redirect_to(redirect)
}
