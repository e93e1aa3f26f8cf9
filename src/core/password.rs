use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use super::config::PasswordHashingConfig;
use super::AppError;

/// Salted argon2id hashing. The cost parameters only affect new hashes;
/// verification reads them back from the stored PHC string.
#[derive(Clone, Debug)]
pub struct PasswordHashing {
    params: Params,
}

impl PasswordHashing {
    pub fn new(config: &PasswordHashingConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AppError::internal_error(format!("invalid argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal_error("Failed to hash password")
            })
    }
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

/// Constant-time comparison of `password` against a stored hash. A malformed
/// hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {:?}", e);
            false
        }
    }
}
