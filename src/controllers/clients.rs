use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use super::listing::{filter_matches, text_matches, total_amount, ListQuery, Listing};
use super::{require_confirmation, submit, Submitted};
use crate::auth::SessionContext;
use crate::database::models::{Client, ClientStatus, Interaction, Opportunity};
use crate::database::{Scope, StoreError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{to_row, ClientInput};

pub const LIST_PATH: &str = "/api/clients";

pub fn detail_path(id: Uuid) -> String {
    format!("{}/{}", LIST_PATH, id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientSummary {
    pub total: usize,
    pub matched: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total_opportunities: usize,
    pub total_value: Decimal,
    pub active_opportunities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub interactions: Vec<Interaction>,
    pub opportunities: Vec<Opportunity>,
    pub summary: PipelineSummary,
}

pub fn filter_clients(clients: &[Client], search: Option<&str>, status: Option<&str>) -> Vec<Client> {
    clients
        .iter()
        .filter(|c| {
            text_matches(search, &[Some(c.name.as_str()), Some(c.email.as_str()), c.company.as_deref()])
                && filter_matches(status, c.status.as_str())
        })
        .cloned()
        .collect()
}

pub fn summarize(clients: &[Client], matched: usize) -> ClientSummary {
    let mut by_status: BTreeMap<&'static str, usize> =
        ClientStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for client in clients {
        *by_status.entry(client.status.as_str()).or_default() += 1;
    }
    ClientSummary {
        total: clients.len(),
        matched,
        by_status,
    }
}

pub fn pipeline(opportunities: &[Opportunity]) -> PipelineSummary {
    PipelineSummary {
        total_opportunities: opportunities.len(),
        total_value: total_amount(opportunities.iter().map(|o| o.amount.as_ref())),
        active_opportunities: opportunities.iter().filter(|o| o.is_active()).count(),
    }
}

/// Load a client owned by the session, redirecting to the listing when it is not there
pub async fn load(state: &AppState, session: &SessionContext, id: Uuid) -> Result<Client, ApiError> {
    state
        .repo::<Client>()
        .get(session.user_id, id)
        .await
        .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))
}

pub async fn list(
    state: &AppState,
    session: &SessionContext,
    query: &ListQuery,
) -> Result<Listing<Client, ClientSummary>, ApiError> {
    let clients = state
        .repo::<Client>()
        .list(session.user_id, query.order.as_deref())
        .await?;
    let records = filter_clients(&clients, query.search.as_deref(), query.status.as_deref());
    let summary = summarize(&clients, records.len());
    Ok(Listing { records, summary })
}

pub async fn detail(state: &AppState, session: &SessionContext, id: Uuid) -> Result<ClientDetail, ApiError> {
    let client = load(state, session, id).await?;

    let scope = Scope::owner(session.user_id).with_parent("client_id", id);
    let interactions = state.repo::<Interaction>();
    let opportunities = state.repo::<Opportunity>();
    let (interactions, opportunities) = futures::try_join!(
        interactions.list_scoped(&scope, Some("date desc")),
        opportunities.list_scoped(&scope, Some("created_at desc")),
    )?;

    let summary = pipeline(&opportunities);
    Ok(ClientDetail {
        client,
        interactions,
        opportunities,
        summary,
    })
}

pub async fn create(
    state: &AppState,
    session: &SessionContext,
    input: &ClientInput,
) -> Result<Submitted<Client>, ApiError> {
    submit(state, session, "clients:new", input, |fields| async move {
        let client = state.repo::<Client>().create(session.user_id, to_row(&fields)?).await?;
        info!(user_id = %session.user_id, client_id = %client.id, "Created client");
        Ok(Submitted {
            redirect: detail_path(client.id),
            record: client,
        })
    })
    .await
}

pub async fn update(
    state: &AppState,
    session: &SessionContext,
    id: Uuid,
    input: &ClientInput,
) -> Result<Submitted<Client>, ApiError> {
    let form = format!("clients:{}:edit", id);
    submit(state, session, &form, input, |fields| async move {
        let client = state
            .repo::<Client>()
            .update(session.user_id, id, to_row(&fields)?)
            .await
            .map_err(|e| ApiError::from(e).with_redirect(LIST_PATH))?;
        Ok(Submitted {
            redirect: detail_path(client.id),
            record: client,
        })
    })
    .await
}

/// Removes the client; its interactions and opportunities go with it and
/// tasks keep existing without a client
pub async fn delete(state: &AppState, session: &SessionContext, id: Uuid, confirm: bool) -> Result<String, ApiError> {
    require_confirmation(confirm, "client")?;
    state.repo::<Client>().delete(session.user_id, id).await?;
    info!(user_id = %session.user_id, client_id = %id, "Deleted client");
    Ok(LIST_PATH.to_string())
}

/// Ensures a referenced client belongs to the session before it is linked
pub async fn ensure_owned(state: &AppState, session: &SessionContext, id: Uuid) -> Result<(), ApiError> {
    match state.repo::<Client>().get(session.user_id, id).await {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => Err(ApiError::not_found(format!("Client {} not found", id))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::{session, state};
    use chrono::Utc;

    fn client(name: &str, status: ClientStatus) -> Client {
        Client {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            company: None,
            position: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn names(clients: &[Client]) -> Vec<&str> {
        clients.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn search_and_status_filters_combine() {
        let clients = vec![client("Ana", ClientStatus::Active), client("Bob", ClientStatus::Inactive)];
        assert_eq!(names(&filter_clients(&clients, Some("an"), Some("all"))), vec!["Ana"]);
        assert_eq!(names(&filter_clients(&clients, Some(""), Some("inactive"))), vec!["Bob"]);
        assert_eq!(names(&filter_clients(&clients, None, None)), vec!["Ana", "Bob"]);
    }

    #[test]
    fn summary_counts_every_status() {
        let clients = vec![client("Ana", ClientStatus::Active), client("Bob", ClientStatus::Inactive)];
        let summary = summarize(&clients, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.by_status["active"], 1);
        assert_eq!(summary.by_status["prospect"], 0);
    }

    #[tokio::test]
    async fn create_update_and_confirmed_delete() {
        let state = state();
        let session = session();
        let input = ClientInput {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            ..Default::default()
        };
        let created = create(&state, &session, &input).await.unwrap();
        assert_eq!(created.redirect, detail_path(created.record.id));
        assert_eq!(created.record.status, ClientStatus::Active);

        let unchanged = update(&state, &session, created.record.id, &input).await.unwrap();
        assert_eq!(unchanged.record.name, created.record.name);
        assert!(unchanged.record.updated_at >= created.record.updated_at);

        let refused = delete(&state, &session, created.record.id, false).await;
        assert!(matches!(refused, Err(ApiError::ConfirmationRequired(_))));
        assert!(load(&state, &session, created.record.id).await.is_ok());

        delete(&state, &session, created.record.id, true).await.unwrap();
        delete(&state, &session, created.record.id, true).await.unwrap();
        assert!(matches!(
            load(&state, &session, created.record.id).await,
            Err(ApiError::NotFound { redirect: Some(_), .. })
        ));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let state = state();
        let session = session();
        let input = ClientInput {
            name: "A".into(),
            email: "nope".into(),
            ..Default::default()
        };
        let err = create(&state, &session, &input).await.unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, values, .. } => {
                assert_eq!(field_errors.len(), 2);
                assert_eq!(values.unwrap()["name"], "A");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.repo::<Client>().count(session.user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_submission_of_same_form_conflicts() {
        let state = state();
        let session = session();
        let in_flight = state.pending.begin(session.user_id, "clients:new").unwrap();
        let input = ClientInput {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            ..Default::default()
        };
        assert!(matches!(create(&state, &session, &input).await, Err(ApiError::Conflict(_))));
        assert_eq!(state.repo::<Client>().count(session.user_id).await.unwrap(), 0);

        drop(in_flight);
        let created = create(&state, &session, &input).await.unwrap();
        assert_eq!(created.record.name, "Ana");
        assert_eq!(state.repo::<Client>().count(session.user_id).await.unwrap(), 1);

        let other_form = state.pending.begin(session.user_id, "clients:other:edit").unwrap();
        assert!(create(&state, &session, &input).await.is_ok());
        drop(other_form);
    }
}
