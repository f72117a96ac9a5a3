pub mod password;
pub mod session;
pub mod token;

pub use session::{Session, SessionProvider, SignUpOutcome};
pub use token::{Claims, TokenKeys};

use thiserror::Error;
use uuid::Uuid;

use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("User already registered")]
    EmailTaken,

    #[error("Invalid or expired confirmation code")]
    InvalidCode,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The authenticated identity of one request, passed explicitly to controllers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub token_id: Uuid,
    pub expires_at: i64,
}

impl From<Claims> for SessionContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            token_id: claims.jti,
            expires_at: claims.exp,
        }
    }
}
