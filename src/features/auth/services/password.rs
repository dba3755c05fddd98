//! Argon2id password hashing
//!
//! Hashes are stored in PHC string format so the salt and cost parameters
//! travel with the hash.

use argon2::{
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;

use crate::core::error::{AppError, Result};

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        password_hash::PasswordHasher::hash_password(&self.argon2(), password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// False for a wrong password and for a malformed stored hash
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            tracing::warn!("Stored password hash could not be parsed");
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
