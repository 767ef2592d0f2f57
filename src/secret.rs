//! Signing-secret quality gate
//!
//! Validates the HMAC signing secret before the token codec ever sees it.
//! A short or guessable secret defeats every other control in this crate,
//! so the policy is enforced at configuration time: length, a deny-list of
//! weak patterns, and a Shannon-entropy floor, with thresholds scaled by
//! deployment environment.
//!
//! Also provides [`generate_secure_secret`] for bootstrapping new
//! deployments.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;

/// Minimum secret length in bytes for production.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Substrings that mark a secret as guessable, matched case-insensitively.
const WEAK_PATTERNS: &[&str] = &[
    "password", "secret", "changeme", "change-me", "default", "example",
    "test", "admin", "12345", "qwerty", "letmein",
];

/// Secret validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SecretError {
    #[error("signing secret too short: {actual} bytes, minimum {required}")]
    TooShort { actual: usize, required: usize },

    #[error("signing secret contains weak pattern: {0}")]
    WeakPattern(String),

    #[error("signing secret entropy too low: {actual:.2} bits/byte, minimum {required:.2}")]
    LowEntropy { actual: f64, required: f64 },
}

/// Validation policy for signing secrets.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretPolicy {
    pub min_length: usize,
    pub min_entropy_bits_per_byte: f64,
    pub check_weak_patterns: bool,
}

impl SecretPolicy {
    /// Policy for the given deployment environment.
    ///
    /// Unknown environment names get the production policy; failing closed
    /// beats guessing.
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "development" | "dev" => Self {
                min_length: 16,
                min_entropy_bits_per_byte: 0.0,
                check_weak_patterns: false,
            },
            "testing" | "test" => Self {
                min_length: 16,
                min_entropy_bits_per_byte: 0.0,
                check_weak_patterns: false,
            },
            "staging" => Self {
                min_length: MIN_SECRET_LENGTH,
                min_entropy_bits_per_byte: 3.0,
                check_weak_patterns: true,
            },
            _ => Self {
                min_length: MIN_SECRET_LENGTH,
                min_entropy_bits_per_byte: 3.5,
                check_weak_patterns: true,
            },
        }
    }

    /// Check a secret against this policy.
    pub fn validate(&self, secret: &str) -> Result<(), SecretError> {
        if secret.len() < self.min_length {
            return Err(SecretError::TooShort {
                actual: secret.len(),
                required: self.min_length,
            });
        }

        if self.check_weak_patterns {
            let lowered = secret.to_lowercase();
            for pattern in WEAK_PATTERNS {
                if lowered.contains(pattern) {
                    return Err(SecretError::WeakPattern((*pattern).to_owned()));
                }
            }
        }

        let entropy = shannon_entropy(secret.as_bytes());
        if entropy < self.min_entropy_bits_per_byte {
            return Err(SecretError::LowEntropy {
                actual: entropy,
                required: self.min_entropy_bits_per_byte,
            });
        }

        Ok(())
    }
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self::for_environment("production")
    }
}

/// Shannon entropy in bits per byte.
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<u8, usize> = HashMap::new();
    for byte in data {
        *counts.entry(*byte).or_insert(0) += 1;
    }

    let len = data.len() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Generate a random alphanumeric secret of the given length.
pub fn generate_secure_secret(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
