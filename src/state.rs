use std::sync::Arc;

use crate::auth::{AuthError, SessionProvider};
use crate::config::SecurityConfig;
use crate::controllers::pending::PendingSubmissions;
use crate::database::{Entity, IdentityStore, MemoryStore, RecordStore, Repository};

/// Everything a request handler may touch, passed explicitly through axum state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub sessions: Arc<SessionProvider>,
    pub pending: PendingSubmissions,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        identities: Arc<dyn IdentityStore>,
        security: &SecurityConfig,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            sessions: Arc::new(SessionProvider::new(identities, security)?),
            pending: PendingSubmissions::default(),
        })
    }

    /// Records and identities both held in process
    pub fn in_memory(security: &SecurityConfig) -> Result<Self, AuthError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, security)
    }

    pub fn repo<E: Entity>(&self) -> Repository<E> {
        Repository::new(self.store.clone())
    }
}
