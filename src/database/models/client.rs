use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::database::entity::{Column, ColumnDefault, ColumnType, Entity, Table};

pub const CLIENTS: Table = Table {
    name: "clients",
    columns: &[
        Column::new("name", ColumnType::Text),
        Column::new("email", ColumnType::Text),
        Column::new("phone", ColumnType::Text),
        Column::new("company", ColumnType::Text),
        Column::new("position", ColumnType::Text),
        Column::with_default("status", ColumnType::Text, ColumnDefault::Text("active")),
    ],
    default_order: "created_at desc",
    has_updated_at: true,
    foreign_keys: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
    Prospect,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 3] = [ClientStatus::Active, ClientStatus::Inactive, ClientStatus::Prospect];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
            ClientStatus::Prospect => "prospect",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown client status: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: ClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Client {
    const TABLE: &'static Table = &CLIENTS;

    fn id(&self) -> Uuid {
        self.id
    }
}
