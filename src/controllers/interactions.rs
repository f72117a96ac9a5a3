use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::clients::{self, detail_path};
use super::{require_confirmation, submit, Submitted};
use crate::auth::SessionContext;
use crate::database::models::interaction::INTERACTIONS;
use crate::database::models::Interaction;
use crate::database::{Scope, StoreError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{to_row, InteractionInput};

#[derive(Debug, Clone, Serialize)]
pub struct InteractionList {
    pub records: Vec<Interaction>,
    pub summary: InteractionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSummary {
    pub total: usize,
}

fn not_under_client(client_id: Uuid, id: Uuid) -> ApiError {
    ApiError::not_found(format!("Interaction {} not found", id)).with_redirect(detail_path(client_id))
}

/// A client's interactions, most recent first unless `order` says otherwise
pub async fn list(
    state: &AppState,
    session: &SessionContext,
    client_id: Uuid,
    order: Option<&str>,
) -> Result<InteractionList, ApiError> {
    clients::load(state, session, client_id).await?;
    let scope = Scope::owner(session.user_id).with_parent("client_id", client_id);
    let records = state
        .repo::<Interaction>()
        .list_scoped(&scope, order)
        .await?;
    let summary = InteractionSummary { total: records.len() };
    Ok(InteractionList { records, summary })
}

pub async fn create(
    state: &AppState,
    session: &SessionContext,
    client_id: Uuid,
    input: &InteractionInput,
) -> Result<Submitted<Interaction>, ApiError> {
    let form = format!("clients:{}:interactions:new", client_id);
    submit(state, session, &form, input, |fields| async move {
        clients::load(state, session, client_id).await?;

        let mut row = to_row(&fields)?;
        row.insert("client_id".into(), client_id.to_string().into());
        let interaction = state.repo::<Interaction>().create(session.user_id, row).await?;
        info!(user_id = %session.user_id, %client_id, interaction_id = %interaction.id, "Logged interaction");
        Ok(Submitted {
            redirect: detail_path(client_id),
            record: interaction,
        })
    })
    .await
}

pub async fn update(
    state: &AppState,
    session: &SessionContext,
    client_id: Uuid,
    id: Uuid,
    input: &InteractionInput,
) -> Result<Submitted<Interaction>, ApiError> {
    let form = format!("clients:{}:interactions:{}:edit", client_id, id);
    submit(state, session, &form, input, |fields| async move {
        let repo = state.repo::<Interaction>();
        match repo.get(session.user_id, id).await {
            Ok(existing) if existing.client_id == client_id => {}
            Ok(_) | Err(StoreError::NotFound(_)) => return Err(not_under_client(client_id, id)),
            Err(e) => return Err(e.into()),
        }

        let interaction = repo.update(session.user_id, id, to_row(&fields)?).await?;
        Ok(Submitted {
            redirect: detail_path(client_id),
            record: interaction,
        })
    })
    .await
}

pub async fn delete(
    state: &AppState,
    session: &SessionContext,
    client_id: Uuid,
    id: Uuid,
    confirm: bool,
) -> Result<String, ApiError> {
    require_confirmation(confirm, "interaction")?;
    let scope = Scope::record(session.user_id, id).with_parent("client_id", client_id);
    let removed = state.store.delete(&INTERACTIONS, &scope).await?;
    info!(user_id = %session.user_id, %client_id, interaction_id = %id, removed, "Deleted interaction");
    Ok(detail_path(client_id))
}
