// handlers/protected/interactions.rs - /api/clients/:id/interactions[/:interaction_id]

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension,
};
use uuid::Uuid;

use crate::auth::SessionContext;
use crate::controllers::interactions::{self, InteractionList};
use crate::controllers::listing::ListQuery;
use crate::database::models::Interaction;
use crate::handlers::{created, deleted, saved, ConfirmQuery, Deleted, FormInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::InteractionInput;

/// GET /api/clients/:id/interactions?order=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    client_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<InteractionList> {
    let Path(client_id) = client_id?;
    let Query(query) = query?;
    let list = interactions::list(&state, &session, client_id, query.order.as_deref()).await?;
    Ok(ApiResponse::success(list))
}

/// POST /api/clients/:id/interactions
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    client_id: Result<Path<Uuid>, PathRejection>,
    FormInput(input): FormInput<InteractionInput>,
) -> ApiResult<Interaction> {
    let Path(client_id) = client_id?;
    Ok(created(interactions::create(&state, &session, client_id, &input).await?))
}

/// PUT /api/clients/:id/interactions/:interaction_id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    FormInput(input): FormInput<InteractionInput>,
) -> ApiResult<Interaction> {
    let Path((client_id, id)) = ids?;
    Ok(saved(interactions::update(&state, &session, client_id, id, &input).await?))
}

/// DELETE /api/clients/:id/interactions/:interaction_id?confirm=true
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> ApiResult<Deleted> {
    let Path((client_id, id)) = ids?;
    let Query(query) = query?;
    let redirect = interactions::delete(&state, &session, client_id, id, query.confirm).await?;
    Ok(deleted(id, redirect))
}
