use crate::error::AppError;
use bcrypt::{hash, verify};

/// One-way salted credential hashing built on bcrypt.
///
/// Each call to [`hash`](PasswordHasher::hash) generates a fresh random salt
/// which bcrypt embeds in the returned digest, so nothing needs to be stored
/// separately. The cost factor comes from configuration.
#[derive(Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks a plaintext password against a stored digest.
    ///
    /// Fails closed: a malformed digest yields `false` rather than an error,
    /// so a corrupt stored hash can never look like a successful match.
    /// Comparison timing is bcrypt's own, not a custom byte compare.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match verify(password, digest) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("password verification failed on malformed digest: {}", e);
                false
            }
        }
    }
}
