//! Password hashing port and its bcrypt implementation.

use super::error::Error;

/// Hashing port so the auth service stays testable without paying the
/// bcrypt work factor in every unit test.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, Error>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, Error>;
}

/// Salted bcrypt hashing at cost 12.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

/// Work factor applied to stored credentials.
pub const BCRYPT_COST: u32 = 12;

impl BcryptPasswordHasher {
    /// Hasher at the standard cost.
    pub fn new() -> Self {
        Self { cost: BCRYPT_COST }
    }

    /// Hasher at a caller-chosen cost. Tests use the minimum cost to keep
    /// suites fast.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, Error> {
        bcrypt::hash(password, self.cost)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        bcrypt::verify(password, hash)
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))
    }
}
