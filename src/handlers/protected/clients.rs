// handlers/protected/clients.rs - /api/clients[/:id]

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension,
};
use uuid::Uuid;

use crate::auth::SessionContext;
use crate::controllers::clients::{self, ClientDetail, ClientSummary};
use crate::controllers::listing::{ListQuery, Listing};
use crate::database::models::Client;
use crate::handlers::{created, deleted, saved, ConfirmQuery, Deleted, FormInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::ClientInput;

/// GET /api/clients?search=&status=&order=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Listing<Client, ClientSummary>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(clients::list(&state, &session, &query).await?))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    FormInput(input): FormInput<ClientInput>,
) -> ApiResult<Client> {
    Ok(created(clients::create(&state, &session, &input).await?))
}

/// GET /api/clients/:id - the client with its interactions and opportunities
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ClientDetail> {
    let Path(id) = id?;
    Ok(ApiResponse::success(clients::detail(&state, &session, id).await?))
}

/// PUT /api/clients/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    FormInput(input): FormInput<ClientInput>,
) -> ApiResult<Client> {
    let Path(id) = id?;
    Ok(saved(clients::update(&state, &session, id, &input).await?))
}

/// DELETE /api/clients/:id?confirm=true - also removes its interactions and opportunities
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let Query(query) = query?;
    let redirect = clients::delete(&state, &session, id, query.confirm).await?;
    Ok(deleted(id, redirect))
}
