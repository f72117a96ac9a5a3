use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::password::{generate_code, hash_code, hash_password, verify_password};
use super::token::{Claims, TokenKeys};
use super::{AuthError, SessionContext};
use crate::config::SecurityConfig;
use crate::database::models::Profile;
use crate::database::{IdentityStore, NewIdentity, StoreError};
use crate::validation::auth::{Credentials, Registration};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: i64,
    pub user: Profile,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user: Profile,
    pub session: Option<Session>,
    pub confirmation_required: bool,
    /// Delivered out of band, never in a response body
    #[serde(skip)]
    pub confirmation_code: Option<String>,
}

/// Built-in identity provider: credentials, sessions, confirmation codes and
/// the revocation set of signed-out tokens.
pub struct SessionProvider {
    identities: Arc<dyn IdentityStore>,
    keys: TokenKeys,
    expiry_hours: u64,
    require_confirmation: bool,
    /// Revoked token id to its expiry; entries drop out once the token would have expired anyway
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl SessionProvider {
    pub fn new(identities: Arc<dyn IdentityStore>, security: &SecurityConfig) -> Result<Self, AuthError> {
        Ok(Self {
            identities,
            keys: TokenKeys::new(&security.jwt_secret)?,
            expiry_hours: security.jwt_expiry_hours,
            require_confirmation: security.require_email_confirmation,
            revoked: RwLock::new(HashMap::new()),
        })
    }

    fn issue(&self, user: Profile) -> Result<Session, AuthError> {
        let claims = Claims::new(user.id, user.email.clone(), self.expiry_hours);
        let access_token = self.keys.generate(&claims)?;
        Ok(Session {
            access_token,
            token_type: "Bearer",
            expires_at: claims.exp,
            user,
        })
    }

    pub async fn sign_up(&self, registration: Registration) -> Result<SignUpOutcome, AuthError> {
        let Registration { credentials, full_name } = registration;
        let password_hash = hash_password(&credentials.password)?;
        let code = self.require_confirmation.then(generate_code);

        let new = NewIdentity {
            email: credentials.email,
            full_name,
            password_hash,
            confirmation_code_hash: code.as_deref().map(hash_code),
        };
        let user = match self.identities.create_identity(new).await {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        };

        match code {
            Some(code) => {
                info!(user_id = %user.id, email = %user.email, confirmation_code = %code, "Sign-up pending confirmation");
                Ok(SignUpOutcome {
                    user,
                    session: None,
                    confirmation_required: true,
                    confirmation_code: Some(code),
                })
            }
            None => {
                info!(user_id = %user.id, "Signed up");
                let session = self.issue(user.clone())?;
                Ok(SignUpOutcome {
                    user,
                    session: Some(session),
                    confirmation_required: false,
                    confirmation_code: None,
                })
            }
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let Some(identity) = self.identities.find_identity(&credentials.email).await? else {
            warn!(email = %credentials.email, "Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &identity.password_hash)? {
            warn!(user_id = %identity.profile.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !identity.confirmed {
            warn!(user_id = %identity.profile.id, "Sign-in before email confirmation");
            return Err(AuthError::EmailNotConfirmed);
        }
        self.issue(identity.profile)
    }

    /// Redeem a confirmation code for a first session
    pub async fn exchange_code(&self, code: &str) -> Result<Session, AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::InvalidCode);
        }
        match self.identities.confirm_identity(&hash_code(code)).await? {
            Some(user) => {
                info!(user_id = %user.id, "Email confirmed");
                self.issue(user)
            }
            None => Err(AuthError::InvalidCode),
        }
    }

    /// Validate a bearer token into the request's session context
    pub async fn get_session(&self, token: &str) -> Result<SessionContext, AuthError> {
        let claims = self.keys.validate(token)?;
        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(SessionContext::from(claims))
    }

    pub async fn current_user(&self, session: &SessionContext) -> Result<Profile, AuthError> {
        self.identities
            .find_profile(session.user_id)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Unknown user".to_string()))
    }

    pub async fn sign_out(&self, session: &SessionContext) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(session.token_id, session.expires_at);
        info!(user_id = %session.user_id, "Signed out");
    }
}
