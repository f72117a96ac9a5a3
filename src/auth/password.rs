use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::AuthError;

/// argon2id PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// False for a wrong password; Err only for a malformed stored hash
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// One-time email confirmation code
pub fn generate_code() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Codes are stored hashed; only the holder of the original can redeem it
pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.trim().as_bytes()))
}
