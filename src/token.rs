//! Token Codec
//!
//! Issues and validates the signed bearer tokens that stand in for
//! sessions. A token is a compact JWT carrying the subject username, an
//! issued-at instant, a strict expiry, and a unique token id, signed with
//! an HMAC secret.
//!
//! Validation order matters: the signature is verified before any claim is
//! trusted, including the expiry. The library's built-in expiry check is
//! disabled and `exp` is compared manually after signature verification,
//! against an instant the caller can supply. That keeps the ordering
//! explicit and makes expiry testable without sleeping.
//!
//! The signing secret can be rotated at runtime; rotation atomically swaps
//! the key pair and invalidates every outstanding token.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::constant_time_str_eq;
use crate::observability::SecurityEvent;
use crate::security_event;

// ============================================================================
// Claims
// ============================================================================

/// Claims embedded in an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated username
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. Strictly in the future at
    /// validation time.
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a structurally valid token
    #[error("malformed token")]
    Malformed,

    /// Structure is fine but the signature does not verify
    #[error("invalid token signature")]
    BadSignature,

    /// Signature verified, expiry has passed
    #[error("token expired")]
    Expired,
}

// ============================================================================
// Codec
// ============================================================================

struct SigningKeys {
    secret: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            secret: secret.to_owned(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and validates signed bearer tokens.
pub struct TokenCodec {
    keys: RwLock<SigningKeys>,
    algorithm: Algorithm,
    lifetime_secs: i64,
}

impl TokenCodec {
    /// Create a codec signing with `secret` for the given token lifetime.
    pub fn new(secret: &str, algorithm: Algorithm, lifetime: std::time::Duration) -> Self {
        Self {
            keys: RwLock::new(SigningKeys::from_secret(secret)),
            algorithm,
            lifetime_secs: lifetime.as_secs() as i64,
        }
    }

    /// Configured token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issue a token for `subject` valid from now.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token for `subject` as of the given instant.
    pub fn issue_at(
        &self,
        subject: &str,
        now: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now,
            exp: now + self.lifetime_secs,
            jti: Uuid::new_v4().to_string(),
        };

        let keys = self.keys.read();
        let token = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &keys.encoding)?;

        security_event!(
            SecurityEvent::TokenIssued,
            subject = %claims.sub,
            jti = %claims.jti,
            expires_at = claims.exp,
            "Bearer token issued"
        );
        Ok(token)
    }

    /// Validate a token against the current time.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Validate a token as of the given instant.
    ///
    /// Signature first, then expiry: `exp` must be strictly greater than
    /// `now`. A token whose expiry equals `now` is already expired.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below, against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let keys = self.keys.read();
        let data = jsonwebtoken::decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(map_decode_error)?;
        drop(keys);

        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }

    /// Replace the signing secret.
    ///
    /// Returns `true` if the secret changed. Rotating to the secret that
    /// is already active is a no-op; the comparison is constant-time so
    /// the check cannot leak the active secret. Tokens signed with the
    /// old secret fail validation with `BadSignature` afterwards.
    pub fn rotate_secret(&self, new_secret: &str) -> bool {
        let mut keys = self.keys.write();
        if constant_time_str_eq(&keys.secret, new_secret) {
            return false;
        }
        *keys = SigningKeys::from_secret(new_secret);
        drop(keys);

        security_event!(
            SecurityEvent::SecretRotated,
            "Signing secret rotated, outstanding tokens invalidated"
        );
        true
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

/// Parse an HMAC algorithm name from configuration.
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::Malformed,
    }
}
