use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::entity::{Column, ColumnDefault, ColumnType, Entity, ForeignKey, OnDelete, Table};

pub const OPPORTUNITIES: Table = Table {
    name: "opportunities",
    columns: &[
        Column::new("client_id", ColumnType::Uuid),
        Column::new("title", ColumnType::Text),
        Column::new("amount", ColumnType::Numeric),
        Column::with_default("stage", ColumnType::Text, ColumnDefault::Text("prospecting")),
        Column::with_default("probability", ColumnType::Integer, ColumnDefault::Integer(0)),
        Column::new("expected_close_date", ColumnType::Date),
        Column::new("notes", ColumnType::Text),
    ],
    default_order: "created_at desc",
    has_updated_at: true,
    foreign_keys: &[ForeignKey { column: "client_id", references: "clients", on_delete: OnDelete::Cascade }],
};

/// Stages that no longer count towards the active pipeline
pub const CLOSED_STAGES: [&str; 2] = ["closed", "lost"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub amount: Option<Decimal>,
    pub stage: String,
    pub probability: i32,
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn is_active(&self) -> bool {
        !CLOSED_STAGES.contains(&self.stage.as_str())
    }
}

impl Entity for Opportunity {
    const TABLE: &'static Table = &OPPORTUNITIES;

    fn id(&self) -> Uuid {
        self.id
    }
}
