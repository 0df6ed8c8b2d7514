//! Argon2id password hashing.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::domain::{GatewayError, Password, PasswordHasher};

/// Argon2id with default parameters and a random salt per password.
/// Hashes are PHC strings safe to store as-is.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &Password) -> Result<String, GatewayError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_str().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| GatewayError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, password_hash: &str) -> Result<bool, GatewayError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| GatewayError::Hashing(format!("Invalid password hash format: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(GatewayError::Hashing(e.to_string())),
        }
    }
}
