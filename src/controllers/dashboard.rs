use rust_decimal::Decimal;
use serde::Serialize;

use super::listing::total_amount;
use crate::auth::SessionContext;
use crate::database::models::{Client, Opportunity, Task};
use crate::error::ApiError;
use crate::state::AppState;

const RECENT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_clients: i64,
    pub total_opportunities: i64,
    pub total_tasks: i64,
    pub pending_tasks: usize,
    pub total_revenue: Decimal,
    pub recent_clients: Vec<Client>,
    pub upcoming_tasks: Vec<Task>,
}

pub fn total_revenue(opportunities: &[Opportunity]) -> Decimal {
    total_amount(opportunities.iter().map(|o| o.amount.as_ref()))
}

pub async fn load(state: &AppState, session: &SessionContext) -> Result<Dashboard, ApiError> {
    let owner = session.user_id;
    let clients = state.repo::<Client>();
    let opportunities = state.repo::<Opportunity>();
    let tasks = state.repo::<Task>();

    let (total_clients, total_tasks, recent_clients, opportunities, tasks) = futures::try_join!(
        clients.count(owner),
        tasks.count(owner),
        clients.list(owner, Some("created_at desc")),
        opportunities.list(owner, None),
        tasks.list(owner, Some("due_date asc, created_at asc")),
    )?;

    let pending: Vec<Task> = tasks.into_iter().filter(|t| !t.completed).collect();
    Ok(Dashboard {
        total_clients,
        total_opportunities: opportunities.len() as i64,
        total_tasks,
        pending_tasks: pending.len(),
        total_revenue: total_revenue(&opportunities),
        recent_clients: recent_clients.into_iter().take(RECENT).collect(),
        upcoming_tasks: pending.into_iter().take(RECENT).collect(),
    })
}
