use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row as _};
use uuid::Uuid;

use super::entity::Table;
use super::identity::{Identity, IdentityStore, NewIdentity};
use super::models::Profile;
use super::order::OrderBy;
use super::query_builder::{bind_param, QueryBuilder, SqlResult};
use super::store::{RecordStore, Row, Scope, StoreError};

/// PostgreSQL-backed store. Tables and constraints come from migrations/.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    log_queries: bool,
}

impl PgStore {
    pub fn new(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    async fn fetch_rows(&self, sql: SqlResult) -> Result<Vec<Row>, StoreError> {
        if self.log_queries {
            tracing::debug!(query = %sql.query, params = sql.params.len(), "executing");
        }
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p)?;
        }
        let rows = q.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                let v: Value = row.try_get("row")?;
                match v {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::Decode(format!("expected object row, got {}", other))),
                }
            })
            .collect()
    }

    async fn execute(&self, sql: SqlResult) -> Result<u64, StoreError> {
        if self.log_queries {
            tracing::debug!(query = %sql.query, params = sql.params.len(), "executing");
        }
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p)?;
        }
        let result = q.execute(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

/// Translate constraint violations into store errors callers can act on
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(mapped) = classify(db_err.code().as_deref(), db_err.message()) {
            return mapped;
        }
    }
    StoreError::Sqlx(err)
}

/// Postgres detail stays in the log; the caller only sees a fixed message
fn classify(code: Option<&str>, message: &str) -> Option<StoreError> {
    let mapped = match code? {
        "23503" | "23514" | "23502" => StoreError::Constraint("Constraint violated".to_string()),
        "23505" => StoreError::Conflict("Record already exists".to_string()),
        "22P02" | "22007" | "22008" | "22003" => {
            StoreError::InvalidQuery("Submitted value has an invalid format or is out of range".to_string())
        }
        _ => return None,
    };
    tracing::warn!(code = ?code, detail = %message, "Database rejected statement");
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_detail_is_not_forwarded() {
        let detail = "numeric field overflow: precision 14, scale 2 on opportunities.amount";
        let err = classify(Some("22003"), detail).unwrap();
        assert!(matches!(&err, StoreError::InvalidQuery(msg) if !msg.contains("precision")));

        let err = classify(Some("23505"), "duplicate key value violates unique constraint \"profiles_email_key\"").unwrap();
        assert!(matches!(&err, StoreError::Conflict(msg) if !msg.contains("profiles_email_key")));

        assert!(matches!(classify(Some("23503"), detail), Some(StoreError::Constraint(_))));
        assert!(classify(Some("40001"), detail).is_none());
        assert!(classify(None, detail).is_none());
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn select(&self, table: &'static Table, scope: &Scope, order: &[OrderBy]) -> Result<Vec<Row>, StoreError> {
        self.fetch_rows(QueryBuilder::new(table).select(scope, order)).await
    }

    async fn insert(&self, table: &'static Table, owner: Uuid, values: Row) -> Result<Row, StoreError> {
        let sql = QueryBuilder::new(table).insert(owner, &values)?;
        self.fetch_rows(sql)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {} returned no row", table.name)))
    }

    async fn update(&self, table: &'static Table, scope: &Scope, values: Row) -> Result<Option<Row>, StoreError> {
        let builder = QueryBuilder::new(table);
        let rows = match builder.update(scope, &values)? {
            Some(sql) => self.fetch_rows(sql).await?,
            None => self.fetch_rows(builder.select(scope, &[])).await?,
        };
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, table: &'static Table, scope: &Scope) -> Result<u64, StoreError> {
        self.execute(QueryBuilder::new(table).delete(scope)).await
    }

    async fn count(&self, table: &'static Table, scope: &Scope) -> Result<i64, StoreError> {
        let sql = QueryBuilder::new(table).count(scope);
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param(q, p)?;
        }
        let row = q.fetch_one(&self.pool).await.map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

const PROFILE_COLUMNS: &str = "p.id, p.email, p.full_name, p.avatar_url, p.created_at, p.updated_at";

#[async_trait]
impl IdentityStore for PgStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles AS p (id, email, full_name) VALUES ($1, $2, $3)
             RETURNING p.id, p.email, p.full_name, p.avatar_url, p.created_at, p.updated_at",
        )
        .bind(id)
        .bind(&new.email)
        .bind(&new.full_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO identities (id, email, password_hash, confirmation_code_hash, confirmed_at)
             VALUES ($1, $2, $3, $4::text, CASE WHEN $4::text IS NULL THEN now() END)",
        )
        .bind(id)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.confirmation_code_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await?;
        Ok(profile)
    }

    async fn find_identity(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let query = format!(
            "SELECT {}, i.password_hash, (i.confirmed_at IS NOT NULL) AS confirmed
             FROM identities i JOIN profiles p ON p.id = i.id
             WHERE i.email = $1",
            PROFILE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(Identity {
            profile: Profile {
                id: row.try_get("id")?,
                email: row.try_get("email")?,
                full_name: row.try_get("full_name")?,
                avatar_url: row.try_get("avatar_url")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            },
            password_hash: row.try_get("password_hash")?,
            confirmed: row.try_get("confirmed")?,
        }))
    }

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let query = format!("SELECT {} FROM profiles p WHERE p.id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(profile)
    }

    async fn confirm_identity(&self, code_hash: &str) -> Result<Option<Profile>, StoreError> {
        let confirmed: Option<Uuid> = sqlx::query_scalar(
            "UPDATE identities SET confirmed_at = now(), confirmation_code_hash = NULL
             WHERE confirmation_code_hash = $1
             RETURNING id",
        )
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match confirmed {
            Some(id) => self.find_profile(id).await,
            None => Ok(None),
        }
    }
}
