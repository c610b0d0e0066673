use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plain-text password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a login attempt against a stored hash.
///
/// A stored hash bcrypt cannot parse counts as a mismatch rather than a server error,
/// so a corrupted record cannot be told apart from a wrong password.
pub fn password_matches(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}
