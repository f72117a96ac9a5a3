use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::entity::Table;
use super::order::OrderBy;

/// A row as exchanged with a store: column name to JSON value
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Row-level predicate every store call carries. The owner is mandatory,
/// so no statement can be issued without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub owner: Uuid,
    pub id: Option<Uuid>,
    pub parent: Option<(&'static str, Uuid)>,
}

impl Scope {
    pub fn owner(owner: Uuid) -> Self {
        Self { owner, id: None, parent: None }
    }

    pub fn record(owner: Uuid, id: Uuid) -> Self {
        Self { owner, id: Some(id), parent: None }
    }

    pub fn with_parent(mut self, column: &'static str, id: Uuid) -> Self {
        self.parent = Some((column, id));
        self
    }

    /// Column/value equalities in a stable order: user_id, id, parent
    pub fn predicates(&self) -> Vec<(&'static str, Uuid)> {
        let mut out = vec![("user_id", self.owner)];
        if let Some(id) = self.id {
            out.push(("id", id));
        }
        if let Some(parent) = self.parent {
            out.push(parent);
        }
        out
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.predicates().iter().all(|(column, expected)| {
            row.get(*column)
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(|actual| actual == *expected)
                .unwrap_or(false)
        })
    }
}

/// Backing store for owner-scoped tables.
///
/// Implementations must apply `scope` to every statement and must honour the
/// foreign-key actions declared on each `Table`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, table: &'static Table, scope: &Scope, order: &[OrderBy]) -> Result<Vec<Row>, StoreError>;

    /// Insert a row owned by `owner`. Columns absent from `values` take the store default.
    async fn insert(&self, table: &'static Table, owner: Uuid, values: Row) -> Result<Row, StoreError>;

    /// Update matching rows, returning the updated row or None when nothing matched
    async fn update(&self, table: &'static Table, scope: &Scope, values: Row) -> Result<Option<Row>, StoreError>;

    /// Delete matching rows, returning how many were removed
    async fn delete(&self, table: &'static Table, scope: &Scope) -> Result<u64, StoreError>;

    async fn count(&self, table: &'static Table, scope: &Scope) -> Result<i64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
