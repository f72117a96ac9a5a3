use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::store::{Row, StoreError};

/// SQL type of a writable column. Parameters are bound as JSON scalars and cast
/// explicitly, so every column must declare the type Postgres should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Integer,
    Numeric,
    Boolean,
    Date,
    Timestamp,
}

impl ColumnType {
    pub fn sql_cast(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "uuid",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Numeric => "numeric",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamptz",
        }
    }
}

/// Value the store fills in when an insert omits the column.
/// Must agree with the DEFAULT clauses in migrations/.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    Null,
    Text(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl ColumnDefault {
    pub fn to_value(&self) -> Value {
        match self {
            ColumnDefault::Null => Value::Null,
            ColumnDefault::Text(s) => Value::String((*s).to_string()),
            ColumnDefault::Integer(i) => Value::from(*i),
            ColumnDefault::Boolean(b) => Value::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub default: ColumnDefault,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, default: ColumnDefault::Null }
    }

    pub const fn with_default(name: &'static str, ty: ColumnType, default: ColumnDefault) -> Self {
        Self { name, ty, default }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

/// Static description of an owner-scoped table.
///
/// `id`, `user_id` and `created_at` are implied for every table; `updated_at`
/// only where `has_updated_at` is set.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub default_order: &'static str,
    pub has_updated_at: bool,
    pub foreign_keys: &'static [ForeignKey],
}

pub const SYSTEM_COLUMNS: [&str; 4] = ["id", "user_id", "created_at", "updated_at"];

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether `name` can appear in a WHERE or ORDER BY clause
    pub fn is_readable(&self, name: &str) -> bool {
        if name == "updated_at" {
            return self.has_updated_at;
        }
        SYSTEM_COLUMNS.contains(&name) || self.column(name).is_some()
    }

    /// Rejects any key that is not a declared writable column, and nested values
    pub fn check_writable(&self, values: &Row) -> Result<(), StoreError> {
        if let Some(unknown) = values.keys().find(|k| self.column(k).is_none()) {
            return Err(StoreError::InvalidQuery(format!(
                "Column '{}' is not writable on {}",
                unknown, self.name
            )));
        }
        match values.iter().find(|(_, v)| v.is_array() || v.is_object()) {
            Some((column, _)) => Err(StoreError::InvalidQuery(format!("Column '{}' must be a scalar value", column))),
            None => Ok(()),
        }
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        match name {
            "id" | "user_id" => Some(ColumnType::Uuid),
            "created_at" => Some(ColumnType::Timestamp),
            "updated_at" if self.has_updated_at => Some(ColumnType::Timestamp),
            _ => self.column(name).map(|c| c.ty),
        }
    }
}

/// A persisted, owner-scoped row type.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static Table;

    fn id(&self) -> Uuid;
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Table = Table {
        name: "samples",
        columns: &[
            Column::new("title", ColumnType::Text),
            Column::with_default("done", ColumnType::Boolean, ColumnDefault::Boolean(false)),
        ],
        default_order: "created_at",
        has_updated_at: false,
        foreign_keys: &[],
    };

    #[test]
    fn readable_columns_include_system_columns() {
        assert!(SAMPLE.is_readable("id"));
        assert!(SAMPLE.is_readable("user_id"));
        assert!(SAMPLE.is_readable("title"));
        assert!(!SAMPLE.is_readable("updated_at"));
        assert!(!SAMPLE.is_readable("title; DROP TABLE samples"));
    }

    #[test]
    fn column_types_resolve() {
        assert_eq!(SAMPLE.column_type("id"), Some(ColumnType::Uuid));
        assert_eq!(SAMPLE.column_type("done"), Some(ColumnType::Boolean));
        assert_eq!(SAMPLE.column("done").map(|c| c.default.to_value()), Some(Value::Bool(false)));
    }

    #[test]
    fn writable_rows_are_flat_and_declared() {
        let row = |v: Value| v.as_object().cloned().unwrap();
        assert!(SAMPLE.check_writable(&row(serde_json::json!({ "title": "A", "done": true }))).is_ok());
        assert!(SAMPLE.check_writable(&row(serde_json::json!({ "owner": "A" }))).is_err());
        assert!(matches!(
            SAMPLE.check_writable(&row(serde_json::json!({ "title": ["A"] }))),
            Err(StoreError::InvalidQuery(_))
        ));
        assert!(SAMPLE.check_writable(&row(serde_json::json!({ "title": { "x": 1 } }))).is_err());
    }
}
