use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::entity::{Column, ColumnDefault, ColumnType, Entity, ForeignKey, OnDelete, Table};

pub const TASKS: Table = Table {
    name: "tasks",
    columns: &[
        Column::new("client_id", ColumnType::Uuid),
        Column::new("opportunity_id", ColumnType::Uuid),
        Column::new("title", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::new("due_date", ColumnType::Date),
        Column::with_default("completed", ColumnType::Boolean, ColumnDefault::Boolean(false)),
        Column::with_default("priority", ColumnType::Text, ColumnDefault::Text("medium")),
    ],
    default_order: "created_at desc",
    has_updated_at: true,
    foreign_keys: &[
        ForeignKey { column: "client_id", references: "clients", on_delete: OnDelete::SetNull },
        ForeignKey { column: "opportunity_id", references: "opportunities", on_delete: OnDelete::SetNull },
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Task {
    const TABLE: &'static Table = &TASKS;

    fn id(&self) -> Uuid {
        self.id
    }
}
