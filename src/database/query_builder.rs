use serde_json::Value;
use sqlx::postgres::PgArguments;

use super::entity::Table;
use super::order::OrderBy;
use super::store::{Row, Scope, StoreError};

/// Generated statement plus the JSON parameters to bind, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Builds owner-scoped statements for one table.
///
/// Rows come back as `row_to_json(t) AS row` so both stores exchange the
/// same JSON shape. Every placeholder carries an explicit cast because
/// parameters are bound as untyped JSON scalars.
pub struct QueryBuilder {
    table: &'static Table,
}

impl QueryBuilder {
    pub fn new(table: &'static Table) -> Self {
        Self { table }
    }

    pub fn select(&self, scope: &Scope, order: &[OrderBy]) -> SqlResult {
        let mut params = Vec::new();
        let where_clause = self.where_clause(scope, &mut params);
        SqlResult {
            query: format!(
                "SELECT row_to_json(t) AS row FROM \"{}\" t WHERE {}{}",
                self.table.name,
                where_clause,
                OrderBy::generate(order)
            ),
            params,
        }
    }

    pub fn insert(&self, owner: uuid::Uuid, values: &Row) -> Result<SqlResult, StoreError> {
        self.table.check_writable(values)?;

        let mut columns = vec!["\"user_id\"".to_string()];
        let mut placeholders = vec!["$1::uuid".to_string()];
        let mut params = vec![Value::String(owner.to_string())];

        for column in self.table.columns {
            if let Some(value) = values.get(column.name) {
                params.push(value.clone());
                columns.push(format!("\"{}\"", column.name));
                placeholders.push(format!("${}::{}", params.len(), column.ty.sql_cast()));
            }
        }

        Ok(SqlResult {
            query: format!(
                "INSERT INTO \"{}\" AS t ({}) VALUES ({}) RETURNING row_to_json(t) AS row",
                self.table.name,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params,
        })
    }

    /// Returns None when there is nothing to assign (no values and no updated_at)
    pub fn update(&self, scope: &Scope, values: &Row) -> Result<Option<SqlResult>, StoreError> {
        self.table.check_writable(values)?;

        let mut params = Vec::new();
        let where_clause = self.where_clause(scope, &mut params);

        let mut assignments = Vec::new();
        for column in self.table.columns {
            if let Some(value) = values.get(column.name) {
                params.push(value.clone());
                assignments.push(format!(
                    "\"{}\" = ${}::{}",
                    column.name,
                    params.len(),
                    column.ty.sql_cast()
                ));
            }
        }
        if self.table.has_updated_at {
            assignments.push("\"updated_at\" = now()".to_string());
        }
        if assignments.is_empty() {
            return Ok(None);
        }

        Ok(Some(SqlResult {
            query: format!(
                "UPDATE \"{}\" AS t SET {} WHERE {} RETURNING row_to_json(t) AS row",
                self.table.name,
                assignments.join(", "),
                where_clause
            ),
            params,
        }))
    }

    pub fn delete(&self, scope: &Scope) -> SqlResult {
        let mut params = Vec::new();
        let where_clause = self.where_clause(scope, &mut params);
        SqlResult {
            query: format!("DELETE FROM \"{}\" AS t WHERE {}", self.table.name, where_clause),
            params,
        }
    }

    pub fn count(&self, scope: &Scope) -> SqlResult {
        let mut params = Vec::new();
        let where_clause = self.where_clause(scope, &mut params);
        SqlResult {
            query: format!(
                "SELECT COUNT(*) AS count FROM \"{}\" t WHERE {}",
                self.table.name, where_clause
            ),
            params,
        }
    }

    fn where_clause(&self, scope: &Scope, params: &mut Vec<Value>) -> String {
        scope
            .predicates()
            .into_iter()
            .map(|(column, id)| {
                params.push(Value::String(id.to_string()));
                format!("t.\"{}\" = ${}::uuid", column, params.len())
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Binds one scalar parameter; rows are flat so nested JSON is refused
pub fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> Result<sqlx::query::Query<'q, sqlx::Postgres, PgArguments>, StoreError> {
    let q = match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => q.bind(i),
            (None, Some(f)) => q.bind(f),
            (None, None) => q.bind(n.to_string()),
        },
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => {
            return Err(StoreError::InvalidQuery("Column values must be scalar".to_string()))
        }
    };
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::client::CLIENTS;
    use crate::database::models::interaction::INTERACTIONS;
    use serde_json::json;
    use uuid::Uuid;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn select_is_owner_scoped_and_ordered() {
        let owner = Uuid::new_v4();
        let order = OrderBy::parse("created_at", &CLIENTS).unwrap();
        let sql = QueryBuilder::new(&CLIENTS).select(&Scope::owner(owner), &order);
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM \"clients\" t WHERE t.\"user_id\" = $1::uuid ORDER BY t.\"created_at\" DESC"
        );
        assert_eq!(sql.params, vec![json!(owner.to_string())]);
    }

    #[test]
    fn nested_select_carries_parent_predicate() {
        let owner = Uuid::new_v4();
        let client = Uuid::new_v4();
        let scope = Scope::owner(owner).with_parent("client_id", client);
        let sql = QueryBuilder::new(&INTERACTIONS).select(&scope, &[]);
        assert!(sql.query.ends_with("WHERE t.\"user_id\" = $1::uuid AND t.\"client_id\" = $2::uuid"));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn insert_casts_every_placeholder() {
        let owner = Uuid::new_v4();
        let values = row(json!({ "name": "Ana", "email": "ana@example.com", "status": "active" }));
        let sql = QueryBuilder::new(&CLIENTS).insert(owner, &values).unwrap();
        assert_eq!(
            sql.query,
            "INSERT INTO \"clients\" AS t (\"user_id\", \"name\", \"email\", \"status\") VALUES ($1::uuid, $2::text, $3::text, $4::text) RETURNING row_to_json(t) AS row"
        );
        assert_eq!(sql.params[0], json!(owner.to_string()));
        assert_eq!(sql.params[1], json!("Ana"));
    }

    #[test]
    fn insert_rejects_system_and_unknown_columns() {
        let owner = Uuid::new_v4();
        let builder = QueryBuilder::new(&CLIENTS);
        assert!(builder.insert(owner, &row(json!({ "user_id": Uuid::new_v4().to_string() }))).is_err());
        assert!(builder.insert(owner, &row(json!({ "name\" = 'x'; --": "x" }))).is_err());
    }

    #[test]
    fn update_touches_updated_at_and_scopes_by_id() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let values = row(json!({ "name": "Ana" }));
        let sql = QueryBuilder::new(&CLIENTS)
            .update(&Scope::record(owner, id), &values)
            .unwrap()
            .unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"clients\" AS t SET \"name\" = $3::text, \"updated_at\" = now() WHERE t.\"user_id\" = $1::uuid AND t.\"id\" = $2::uuid RETURNING row_to_json(t) AS row"
        );
        assert_eq!(sql.params, vec![json!(owner.to_string()), json!(id.to_string()), json!("Ana")]);
    }

    #[test]
    fn empty_update_without_updated_at_is_skipped() {
        let scope = Scope::record(Uuid::new_v4(), Uuid::new_v4());
        assert!(QueryBuilder::new(&INTERACTIONS).update(&scope, &Row::new()).unwrap().is_none());
    }

    #[test]
    fn delete_and_count_are_scoped() {
        let scope = Scope::record(Uuid::new_v4(), Uuid::new_v4());
        let builder = QueryBuilder::new(&CLIENTS);
        assert_eq!(
            builder.delete(&scope).query,
            "DELETE FROM \"clients\" AS t WHERE t.\"user_id\" = $1::uuid AND t.\"id\" = $2::uuid"
        );
        assert_eq!(
            builder.count(&Scope::owner(scope.owner)).query,
            "SELECT COUNT(*) AS count FROM \"clients\" t WHERE t.\"user_id\" = $1::uuid"
        );
    }

    #[test]
    fn nested_values_never_reach_the_statement() {
        let owner = Uuid::new_v4();
        assert!(QueryBuilder::new(&CLIENTS).insert(owner, &row(json!({ "name": [1] }))).is_err());

        let nested = json!({ "a": 1 });
        assert!(bind_param(sqlx::query("SELECT $1"), &nested).is_err());
        let scalar = json!(u64::MAX);
        assert!(bind_param(sqlx::query("SELECT $1"), &scalar).is_ok());
    }
}
