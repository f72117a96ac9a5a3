// handlers/protected/tasks.rs - /api/tasks[/:id][/toggle]

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
use crate::controllers::tasks::{self, TaskRecord, TaskSummary};
use crate::database::models::Task;
use crate::handlers::{created, deleted, saved, ConfirmQuery, Deleted, FormInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::TaskInput;

/// GET /api/tasks?search=&status=&priority=&order=
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Listing<TaskRecord, TaskSummary>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(tasks::list(&state, &session, &query).await?))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    FormInput(input): FormInput<TaskInput>,
) -> ApiResult<Task> {
    Ok(created(tasks::create(&state, &session, &input).await?))
}

/// GET /api/tasks/:id
pub async fn show(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Task> {
    let Path(id) = id?;
    Ok(ApiResponse::success(tasks::get(&state, &session, id).await?))
}

/// PUT /api/tasks/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    FormInput(input): FormInput<TaskInput>,
) -> ApiResult<Task> {
    let Path(id) = id?;
    Ok(saved(tasks::update(&state, &session, id, &input).await?))
}

/// POST /api/tasks/:id/toggle - flip completion
pub async fn toggle(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Task> {
    let Path(id) = id?;
    let task = tasks::toggle(&state, &session, id).await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:id?confirm=true
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let Query(query) = query?;
    let redirect = tasks::delete(&state, &session, id, query.confirm).await?;
    Ok(deleted(id, redirect))
}
