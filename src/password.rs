//! Password Hasher
//!
//! Salted, adaptive password hashing built on Argon2id. Every call to
//! [`PasswordHasher::hash`] draws a fresh random salt, so hashing the same
//! password twice yields different strings; verification reads the salt
//! and cost parameters back out of the stored hash.
//!
//! Hashing cost is configurable so tests can run with cheap parameters
//! while production keeps a cost that makes offline guessing expensive.
//! Verification never panics: a stored hash that does not parse is
//! treated as a failed match.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

// ============================================================================
// Hashing cost
// ============================================================================

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory usage in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl HashingCost {
    /// Interactive-login cost suitable for production.
    pub fn default_cost() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }

    /// Minimal cost for tests. Not safe for real credentials.
    pub fn fast() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashingCost {
    fn default() -> Self {
        Self::default_cost()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Errors from the hashing side.
///
/// Verification deliberately has no error type: any failure to parse or
/// match is reported as "no match".
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hashing cost: {0}")]
    InvalidCost(argon2::Error),

    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Argon2id password hasher with fixed cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher with the given cost. Fails if the cost is outside
    /// the parameter bounds Argon2 accepts.
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(PasswordError::InvalidCost)?;
        Ok(Self { params })
    }

    /// Hash a plaintext password with a freshly generated random salt.
    ///
    /// The returned string embeds algorithm, parameters, and salt, so it
    /// is self-describing for later verification.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.argon2();
        let hash = argon2::PasswordHasher::hash_password(&argon2, password.as_bytes(), &salt)
            .map_err(PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `false` for a mismatch and for a stored hash that cannot
    /// be parsed. Corrupt store data must read as a failed login, not a
    /// panic.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}
