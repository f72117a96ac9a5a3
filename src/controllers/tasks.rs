use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::info;
use uuid::Uuid;

use super::clients;
use super::listing::{filter_matches, text_matches, ListQuery, Listing};
use super::{require_confirmation, submit, Submitted};
use crate::auth::SessionContext;
use crate::database::models::{Client, Opportunity, Priority, Task};
use crate::database::{Row, StoreError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{to_row, TaskFields, TaskInput};

pub const LIST_PATH: &str = "/api/tasks";

pub fn detail_path(id: Uuid) -> String {
    format!("{}/{}", LIST_PATH, id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRef {
    pub id: Uuid,
    pub name: String,
}

/// A task as listed, with the name of the client it references
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub task: Task,
    pub client: Option<ClientRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub matched: usize,
    pub completed: usize,
    pub pending: usize,
    pub by_priority: BTreeMap<&'static str, usize>,
}

/// `status` is "pending", "completed" or "all"
pub fn filter_tasks(tasks: &[Task], search: Option<&str>, status: Option<&str>, priority: Option<&str>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| {
            let state = if t.completed { "completed" } else { "pending" };
            text_matches(search, &[Some(t.title.as_str()), t.description.as_deref()])
                && filter_matches(status, state)
                && filter_matches(priority, t.priority.as_str())
        })
        .cloned()
        .collect()
}

pub fn summarize(tasks: &[Task], matched: usize) -> TaskSummary {
    let completed = tasks.iter().filter(|t| t.completed).count();
    let mut by_priority: BTreeMap<&'static str, usize> = Priority::ALL.iter().map(|p| (p.as_str(), 0)).collect();
    for task in tasks {
        *by_priority.entry(task.priority.as_str()).or_default() += 1;
    }
    TaskSummary {
        total: tasks.len(),
        matched,
        completed,
        pending: tasks.len() - completed,
        by_priority,
    }
}

pub async fn list(
    state: &AppState,
    session: &SessionContext,
    query: &ListQuery,
) -> Result<Listing<TaskRecord, TaskSummary>, ApiError> {
    let tasks = state.repo::<Task>();
    let clients = state.repo::<Client>();
    let (tasks, clients) = futures::try_join!(
        tasks.list(session.user_id, query.order.as_deref()),
        clients.list(session.user_id, None),
    )?;

    let names: HashMap<Uuid, String> = clients.into_iter().map(|c| (c.id, c.name)).collect();
    let filtered = filter_tasks(
        &tasks,
        query.search.as_deref(),
        query.status.as_deref(),
        query.priority.as_deref(),
    );
    let summary = summarize(&tasks, filtered.len());
    let records = filtered
        .into_iter()
        .map(|task| {
            let client = task
                .client_id
                .and_then(|id| names.get(&id).map(|name| ClientRef { id, name: name.clone() }));
            TaskRecord { task, client }
        })
        .collect();
    Ok(Listing { records, summary })
}

pub async fn get(state: &AppState, session: &SessionContext, id: Uuid) -> Result<Task, ApiError> {
    state
        .repo::<Task>()
        .get(session.user_id, id)
        .await
        .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))
}

/// Referenced client and opportunity must both belong to the session
async fn check_references(state: &AppState, session: &SessionContext, fields: &TaskFields) -> Result<(), ApiError> {
    if let Some(client_id) = fields.client_id {
        clients::ensure_owned(state, session, client_id).await?;
    }
    if let Some(opportunity_id) = fields.opportunity_id {
        match state.repo::<Opportunity>().get(session.user_id, opportunity_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => {
                return Err(ApiError::not_found(format!("Opportunity {} not found", opportunity_id)))
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub async fn create(
    state: &AppState,
    session: &SessionContext,
    input: &TaskInput,
) -> Result<Submitted<Task>, ApiError> {
    submit(state, session, "tasks:new", input, |fields| async move {
        check_references(state, session, &fields).await?;
        let task = state.repo::<Task>().create(session.user_id, to_row(&fields)?).await?;
        info!(user_id = %session.user_id, task_id = %task.id, "Created task");
        Ok(Submitted {
            redirect: detail_path(task.id),
            record: task,
        })
    })
    .await
}

pub async fn update(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    input: &TaskInput,
) -> Result<Submitted<Task>, ApiError> {
    let form = format!("tasks:{}:edit", id);
    submit(state, session, &form, input, |fields| async move {
        check_references(state, session, &fields).await?;
        let task = state
            .repo::<Task>()
            .update(session.user_id, id, to_row(&fields)?)
            .await
            .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))?;
        Ok(Submitted {
            redirect: detail_path(task.id),
            record: task,
        })
    })
    .await
}

/// Flip completion without touching any other field
pub async fn toggle(state: &AppState, session: &SessionContext, id: Uuid) -> Result<Task, ApiError> {
    let form = format!("tasks:{}:toggle", id);
    let _guard = state.pending.begin(session.user_id, &form)?;

    let repo = state.repo::<Task>();
    let task = get(state, session, id).await?;
    let mut fields = Row::new();
    fields.insert("completed".into(), (!task.completed).into());
    let task = repo
        .update(session.user_id, id, fields)
        .await
        .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))?;
    info!(user_id = %session.user_id, task_id = %id, completed = task.completed, "Toggled task");
    Ok(task)
}

pub async fn delete(state: &AppState, session: &SessionContext, id: Uuid, confirm: bool) -> Result<String, ApiError> {
    require_confirmation(confirm, "task")?;
    state.repo::<Task>().delete(session.user_id, id).await?;
    info!(user_id = %session.user_id, task_id = %id, "Deleted task");
    Ok(LIST_PATH.to_string())
}
