// Password hashing and verification service

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, RngCore};

/// Default cost factor (Argon2 iterations)
pub const DEFAULT_COST_FACTOR: u32 = 12;

/// Default memory cost in KiB (19 MiB, the Argon2 crate default)
pub const DEFAULT_MEMORY_KIB: u32 = Params::DEFAULT_M_COST;

/// Password service for hashing and verification
///
/// Digests are Argon2id PHC strings with a fresh random salt per call.
/// Verification reads the parameters embedded in the digest, so digests
/// produced under an older cost factor keep verifying after a change.
#[derive(Debug, Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    /// Create a service with the given cost factor and the default memory cost
    pub fn new(cost_factor: u32) -> Result<Self, AuthError> {
        Self::with_memory(cost_factor, DEFAULT_MEMORY_KIB)
    }

    /// Create a service with an explicit memory cost in KiB
    pub fn with_memory(cost_factor: u32, memory_kib: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, cost_factor, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::HashingError(format!("invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    /// Configured cost factor
    pub fn cost_factor(&self) -> u32 {
        self.params.t_cost()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id
    ///
    /// Fails only when the salt cannot be drawn from the OS or the primitive
    /// itself fails; the password content is never rejected here.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let mut salt_bytes = [0u8; Salt::RECOMMENDED_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| AuthError::HashingError(format!("entropy unavailable: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// Verify a password against a hash
    ///
    /// A mismatch is `Ok(false)`. An error means the digest was not produced
    /// by this service.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::HashingError(format!("malformed password digest: {}", e)))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}
