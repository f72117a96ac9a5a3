use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::entity::{ColumnType, OnDelete, Table};
use super::identity::{Identity, IdentityStore, NewIdentity};
use super::models::{Profile, TABLES};
use super::order::{OrderBy, SortDirection};
use super::store::{RecordStore, Row, Scope, StoreError};

struct StoredIdentity {
    profile: Profile,
    password_hash: String,
    confirmation_code_hash: Option<String>,
    confirmed: bool,
}

/// In-process store with the same scoping, defaults, ordering and
/// foreign-key actions as the Postgres schema. Used by tests and `serve --memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
    identities: RwLock<Vec<StoredIdentity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn invalid(column: &str, ty: ColumnType, value: &Value) -> StoreError {
    StoreError::InvalidQuery(format!(
        "Invalid input for {} column {}: {}",
        ty.sql_cast(),
        column,
        value
    ))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Coerce a bound value the way the matching SQL cast would
fn coerce(column: &str, ty: ColumnType, value: Value) -> Result<Value, StoreError> {
    if value.is_null() {
        return Ok(value);
    }
    let coerced = match (ty, &value) {
        (ColumnType::Text, Value::String(_)) => Some(value.clone()),
        (ColumnType::Uuid, Value::String(s)) => {
            Uuid::parse_str(s).ok().map(|u| Value::String(u.to_string()))
        }
        (ColumnType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ColumnType::Integer, Value::Number(n)) => n.as_i64().map(Value::from),
        (ColumnType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ColumnType::Numeric, Value::Number(_)) => Some(value.clone()),
        (ColumnType::Numeric, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (ColumnType::Date, Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string())),
        (ColumnType::Timestamp, Value::String(s)) => parse_timestamp(s)
            .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true))),
        _ => None,
    };
    coerced.ok_or_else(|| invalid(column, ty, &value))
}

fn table_named(name: &str) -> Option<&'static Table> {
    TABLES.iter().copied().find(|t| t.name == name)
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// Fail like a foreign-key violation when a referenced row is missing
fn check_references(
    tables: &HashMap<&'static str, Vec<Row>>,
    table: &Table,
    values: &Row,
) -> Result<(), StoreError> {
    for fk in table.foreign_keys {
        let Some(target) = values.get(fk.column).and_then(Value::as_str) else { continue };
        let exists = tables
            .get(fk.references)
            .map(|rows| rows.iter().any(|r| row_id(r) == Some(target)))
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::Constraint(format!(
                "{}.{} references missing {} row {}",
                table.name, fk.column, fk.references, target
            )));
        }
    }
    Ok(())
}

/// Apply ON DELETE actions of every table referencing `parent` for the removed ids
fn apply_delete_actions(
    tables: &mut HashMap<&'static str, Vec<Row>>,
    parent: &str,
    removed: &HashSet<String>,
) {
    if removed.is_empty() {
        return;
    }
    for child in TABLES.iter() {
        for fk in child.foreign_keys.iter().filter(|fk| fk.references == parent) {
            let Some(rows) = tables.get_mut(child.name) else { continue };
            let references = |row: &Row| {
                row.get(fk.column)
                    .and_then(Value::as_str)
                    .map(|v| removed.contains(v))
                    .unwrap_or(false)
            };
            match fk.on_delete {
                OnDelete::Cascade => {
                    let mut cascaded = HashSet::new();
                    rows.retain(|row| {
                        if references(row) {
                            if let Some(id) = row_id(row) {
                                cascaded.insert(id.to_string());
                            }
                            false
                        } else {
                            true
                        }
                    });
                    apply_delete_actions(tables, child.name, &cascaded);
                }
                OnDelete::SetNull => {
                    for row in rows.iter_mut().filter(|r| references(r)) {
                        row.insert(fk.column.to_string(), Value::Null);
                    }
                }
            }
        }
    }
}

fn sort_key(ty: Option<ColumnType>, value: Option<&Value>) -> Option<SortValue> {
    let value = value.filter(|v| !v.is_null())?;
    match (ty, value) {
        (_, Value::Bool(b)) => Some(SortValue::Bool(*b)),
        (_, Value::Number(n)) => n.as_f64().map(SortValue::Number),
        (Some(ColumnType::Timestamp), Value::String(s)) => {
            parse_timestamp(s).map(SortValue::Time)
        }
        (_, Value::String(s)) => Some(SortValue::Text(s.clone())),
        _ => None,
    }
}

#[derive(PartialEq, PartialOrd)]
enum SortValue {
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Text(String),
}

/// NULL sorts as the largest value, matching Postgres defaults
fn compare_nullable(a: Option<SortValue>, b: Option<SortValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn sort_rows(table: &Table, rows: &mut [Row], order: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for o in order {
            let ty = table.column_type(&o.column);
            let ord = compare_nullable(
                sort_key(ty, a.get(&o.column)),
                sort_key(ty, b.get(&o.column)),
            );
            let ord = match o.sort {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &'static Table, scope: &Scope, order: &[OrderBy]) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table.name)
            .map(|rows| rows.iter().filter(|r| scope.matches(r)).cloned().collect())
            .unwrap_or_default();
        sort_rows(table, &mut rows, order);
        Ok(rows)
    }

    async fn insert(&self, table: &'static Table, owner: Uuid, mut values: Row) -> Result<Row, StoreError> {
        table.check_writable(&values)?;

        let mut row = Row::new();
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        row.insert("user_id".into(), Value::String(owner.to_string()));
        for column in table.columns {
            let value = match values.remove(column.name) {
                Some(v) => coerce(column.name, column.ty, v)?,
                None => column.default.to_value(),
            };
            row.insert(column.name.to_string(), value);
        }
        let now = now_value();
        row.insert("created_at".into(), now.clone());
        if table.has_updated_at {
            row.insert("updated_at".into(), now);
        }

        let mut tables = self.tables.write().await;
        check_references(&tables, table, &row)?;
        tables.entry(table.name).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &'static Table, scope: &Scope, values: Row) -> Result<Option<Row>, StoreError> {
        table.check_writable(&values)?;

        let mut changes = Row::new();
        for (name, value) in values {
            let ty = table.column_type(&name).ok_or_else(|| {
                StoreError::InvalidQuery(format!("Column '{}' is not writable on {}", name, table.name))
            })?;
            let value = coerce(&name, ty, value)?;
            changes.insert(name, value);
        }

        let mut tables = self.tables.write().await;
        check_references(&tables, table, &changes)?;

        let Some(rows) = tables.get_mut(table.name) else { return Ok(None) };
        let mut updated = None;
        for row in rows.iter_mut().filter(|r| scope.matches(r)) {
            for (name, value) in changes.iter() {
                row.insert(name.clone(), value.clone());
            }
            if table.has_updated_at {
                row.insert("updated_at".into(), now_value());
            }
            if updated.is_none() {
                updated = Some(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &'static Table, scope: &Scope) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut removed = HashSet::new();
        if let Some(rows) = tables.get_mut(table.name) {
            rows.retain(|row| {
                if scope.matches(row) {
                    if let Some(id) = row_id(row) {
                        removed.insert(id.to_string());
                    }
                    false
                } else {
                    true
                }
            });
        }
        apply_delete_actions(&mut tables, table.name, &removed);
        Ok(removed.len() as u64)
    }

    async fn count(&self, table: &'static Table, scope: &Scope) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let count = tables
            .get(table.name)
            .map(|rows| rows.iter().filter(|r| scope.matches(r)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<Profile, StoreError> {
        let mut identities = self.identities.write().await;
        if identities.iter().any(|i| i.profile.email == new.email) {
            return Err(StoreError::Conflict(format!("Email already registered: {}", new.email)));
        }
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            email: new.email,
            full_name: Some(new.full_name),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        identities.push(StoredIdentity {
            profile: profile.clone(),
            password_hash: new.password_hash,
            confirmed: new.confirmation_code_hash.is_none(),
            confirmation_code_hash: new.confirmation_code_hash,
        });
        Ok(profile)
    }

    async fn find_identity(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.iter().find(|i| i.profile.email == email).map(|i| Identity {
            profile: i.profile.clone(),
            password_hash: i.password_hash.clone(),
            confirmed: i.confirmed,
        }))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.iter().find(|i| i.profile.id == id).map(|i| i.profile.clone()))
    }

    async fn confirm_identity(&self, code_hash: &str) -> Result<Option<Profile>, StoreError> {
        let mut identities = self.identities.write().await;
        let Some(identity) = identities
            .iter_mut()
            .find(|i| i.confirmation_code_hash.as_deref() == Some(code_hash))
        else {
            return Ok(None);
        };
        identity.confirmation_code_hash = None;
        identity.confirmed = true;
        Ok(Some(identity.profile.clone()))
    }
}
