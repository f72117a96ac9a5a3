use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::entity::{Column, ColumnType, Entity, ForeignKey, OnDelete, Table};

pub const INTERACTIONS: Table = Table {
    name: "interactions",
    columns: &[
        Column::new("client_id", ColumnType::Uuid),
        Column::new("type", ColumnType::Text),
        Column::new("notes", ColumnType::Text),
        Column::new("date", ColumnType::Timestamp),
    ],
    default_order: "date desc",
    has_updated_at: false,
    foreign_keys: &[ForeignKey { column: "client_id", references: "clients", on_delete: OnDelete::Cascade }],
};

/// A logged call, meeting, email or note against one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Interaction {
    const TABLE: &'static Table = &INTERACTIONS;

    fn id(&self) -> Uuid {
        self.id
    }
}
