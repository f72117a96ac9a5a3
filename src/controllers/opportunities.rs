use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::clients;
use super::listing::{filter_matches, text_matches, total_amount, ListQuery, Listing};
use super::{require_confirmation, submit, Submitted};
use crate::auth::SessionContext;
use crate::database::models::Opportunity;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{to_row, OpportunityInput};

pub const LIST_PATH: &str = "/api/opportunities";

pub fn detail_path(id: Uuid) -> String {
    format!("{}/{}", LIST_PATH, id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunitySummary {
    pub count: usize,
    pub matched: usize,
    pub total_value: Decimal,
    pub active: usize,
}

pub fn filter_opportunities(
    opportunities: &[Opportunity],
    search: Option<&str>,
    stage: Option<&str>,
) -> Vec<Opportunity> {
    opportunities
        .iter()
        .filter(|o| {
            text_matches(search, &[Some(o.title.as_str()), o.notes.as_deref()])
                && filter_matches(stage, &o.stage)
        })
        .cloned()
        .collect()
}

pub fn summarize(opportunities: &[Opportunity], matched: usize) -> OpportunitySummary {
    OpportunitySummary {
        count: opportunities.len(),
        matched,
        total_value: total_amount(opportunities.iter().map(|o| o.amount.as_ref())),
        active: opportunities.iter().filter(|o| o.is_active()).count(),
    }
}

pub async fn list(
    state: &AppState,
    session: &SessionContext,
    query: &ListQuery,
) -> Result<Listing<Opportunity, OpportunitySummary>, ApiError> {
    let opportunities = state
        .repo::<Opportunity>()
        .list(session.user_id, query.order.as_deref())
        .await?;
    let records = filter_opportunities(&opportunities, query.search.as_deref(), query.stage.as_deref());
    let summary = summarize(&opportunities, records.len());
    Ok(Listing { records, summary })
}

pub async fn get(state: &AppState, session: &SessionContext, id: Uuid) -> Result<Opportunity, ApiError> {
    state
        .repo::<Opportunity>()
        .get(session.user_id, id)
        .await
        .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))
}

pub async fn create(
    state: &AppState,
    session: &SessionContext,
    input: &OpportunityInput,
) -> Result<Submitted<Opportunity>, ApiError> {
    submit(state, session, "opportunities:new", input, |fields| async move {
        clients::ensure_owned(state, session, fields.client_id).await?;
        let opportunity = state
            .repo::<Opportunity>()
            .create(session.user_id, to_row(&fields)?)
            .await?;
        info!(user_id = %session.user_id, opportunity_id = %opportunity.id, "Created opportunity");
        Ok(Submitted {
            redirect: detail_path(opportunity.id),
            record: opportunity,
        })
    })
    .await
}

pub async fn update(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    input: &OpportunityInput,
) -> Result<Submitted<Opportunity>, ApiError> {
    let form = format!("opportunities:{}:edit", id);
    submit(state, session, &form, input, |fields| async move {
        clients::ensure_owned(state, session, fields.client_id).await?;
        let opportunity = state
            .repo::<Opportunity>()
            .update(session.user_id, id, to_row(&fields)?)
            .await
            .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))?;
        Ok(Submitted {
            redirect: detail_path(opportunity.id),
            record: opportunity,
        })
    })
    .await
}

pub async fn delete(state: &AppState, session: &SessionContext, id: Uuid, confirm: bool) -> Result<String, ApiError> {
    require_confirmation(confirm, "opportunity")?;
    state.repo::<Opportunity>().delete(session.user_id, id).await?;
    info!(user_id = %session.user_id, opportunity_id = %id, "Deleted opportunity");
    Ok(LIST_PATH.to_string())
}
