use async_trait::async_trait;
use uuid::Uuid;

use super::models::Profile;
use super::store::StoreError;

/// Credentials joined with the profile they authenticate
#[derive(Debug, Clone)]
pub struct Identity {
    pub profile: Profile,
    pub password_hash: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Lowercased by the caller; unique across identities
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    /// SHA-256 hex of the one-time confirmation code; None creates a confirmed identity
    pub confirmation_code_hash: Option<String>,
}

/// Storage for the built-in session provider. Not owner-scoped: these rows
/// are what owner ids come from.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is already registered
    async fn create_identity(&self, new: NewIdentity) -> Result<Profile, StoreError>;

    async fn find_identity(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Consume a confirmation code, returning the confirmed profile
    async fn confirm_identity(&self, code_hash: &str) -> Result<Option<Profile>, StoreError>;
}
