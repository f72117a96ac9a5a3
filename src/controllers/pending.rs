use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::ApiError;

/// Forms with a submission in flight, per user.
///
/// A second submission of the same form while the first is still running is
/// refused instead of queued.
#[derive(Clone, Default)]
pub struct PendingSubmissions {
    inner: Arc<Mutex<HashSet<(Uuid, String)>>>,
}

impl PendingSubmissions {
    pub fn begin(&self, owner: Uuid, form: &str) -> Result<PendingGuard, ApiError> {
        let key = (owner, form.to_string());
        let mut pending = self
            .inner
            .lock()
            .map_err(|_| ApiError::internal_server_error("Submission tracking unavailable"))?;
        if !pending.insert(key.clone()) {
            return Err(ApiError::conflict("This form is already being submitted"));
        }
        Ok(PendingGuard {
            inner: self.inner.clone(),
            key,
        })
    }

    pub fn is_pending(&self, owner: Uuid, form: &str) -> bool {
        self.inner
            .lock()
            .map(|pending| pending.contains(&(owner, form.to_string())))
            .unwrap_or(false)
    }
}

/// Releases the form when the submission finishes or is dropped
pub struct PendingGuard {
    inner: Arc<Mutex<HashSet<(Uuid, String)>>>,
    key: (Uuid, String),
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.inner.lock() {
            pending.remove(&self.key);
        }
    }
}
