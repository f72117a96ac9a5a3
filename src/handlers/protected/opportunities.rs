// handlers/protected/opportunities.rs - /api/opportunities[/:id]

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension,
};
use uuid::Uuid;

use crate::auth::SessionContext;
use crate::controllers::listing::{ListQuery, Listing};
use crate::controllers::opportunities::{self, OpportunitySummary};
use crate::database::models::Opportunity;
use crate::handlers::{created, deleted, saved, ConfirmQuery, Deleted, FormInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::OpportunityInput;

/// GET /api/opportunities?search=&stage=&order=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Listing<Opportunity, OpportunitySummary>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(opportunities::list(&state, &session, &query).await?))
}

/// POST /api/opportunities
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    FormInput(input): FormInput<OpportunityInput>,
) -> ApiResult<Opportunity> {
    Ok(created(opportunities::create(&state, &session, &input).await?))
}

/// GET /api/opportunities/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Opportunity> {
    let Path(id) = id?;
    Ok(ApiResponse::success(opportunities::get(&state, &session, id).await?))
}

/// PUT /api/opportunities/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    FormInput(input): FormInput<OpportunityInput>,
) -> ApiResult<Opportunity> {
    let Path(id) = id?;
    Ok(saved(opportunities::update(&state, &session, id, &input).await?))
}

/// DELETE /api/opportunities/:id?confirm=true
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let Query(query) = query?;
    let redirect = opportunities::delete(&state, &session, id, query.confirm).await?;
    Ok(deleted(id, redirect))
}
