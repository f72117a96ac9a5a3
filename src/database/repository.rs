use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::entity::Entity;
use super::order::OrderBy;
use super::store::{RecordStore, Row, Scope, StoreError};

/// Typed, owner-scoped access to one entity's table
pub struct Repository<E> {
    store: Arc<dyn RecordStore>,
    _phantom: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    fn decode(row: Row) -> Result<E, StoreError> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    fn decode_all(rows: Vec<Row>) -> Result<Vec<E>, StoreError> {
        rows.into_iter().map(Self::decode).collect()
    }

    /// All rows owned by `owner`; an empty result is not an error
    pub async fn list(&self, owner: Uuid, order: Option<&str>) -> Result<Vec<E>, StoreError> {
        self.list_scoped(&Scope::owner(owner), order).await
    }

    pub async fn list_scoped(&self, scope: &Scope, order: Option<&str>) -> Result<Vec<E>, StoreError> {
        let order = OrderBy::resolve(order, E::TABLE)?;
        let rows = self.store.select(E::TABLE, scope, &order).await?;
        Self::decode_all(rows)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<E, StoreError> {
        self.store
            .select(E::TABLE, &Scope::record(owner, id), &[])
            .await?
            .into_iter()
            .next()
            .map(Self::decode)
            .unwrap_or_else(|| Err(Self::not_found(id)))
    }

    pub async fn create(&self, owner: Uuid, fields: Row) -> Result<E, StoreError> {
        let row = self.store.insert(E::TABLE, owner, fields).await?;
        Self::decode(row)
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, fields: Row) -> Result<E, StoreError> {
        match self.store.update(E::TABLE, &Scope::record(owner, id), fields).await? {
            Some(row) => Self::decode(row),
            None => Err(Self::not_found(id)),
        }
    }

    /// Succeeds whether or not the row still exists
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let removed = self.store.delete(E::TABLE, &Scope::record(owner, id)).await?;
        tracing::debug!(table = E::TABLE.name, %id, removed, "delete");
        Ok(())
    }

    pub async fn count(&self, owner: Uuid) -> Result<i64, StoreError> {
        self.store.count(E::TABLE, &Scope::owner(owner)).await
    }

    fn not_found(id: Uuid) -> StoreError {
        StoreError::NotFound(format!("{} {} not found", E::TABLE.name, id))
    }
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}
