//! Session Gate
//!
//! Per-request token validation for the protected API surface. A request
//! passes the gate only if its bearer token decodes under the active
//! secret, has not expired, names a subject that still exists in the
//! credential store, and that subject's account is still enabled.
//!
//! Because tokens are self-contained, the store lookup is what lets an
//! operator cut off a user mid-session: disable or remove the record and
//! the user's outstanding tokens stop working on the next request.

use std::sync::Arc;

use crate::error::AuthError;
use crate::observability::SecurityEvent;
use crate::security_event;
use crate::store::{AuthenticatedUser, CredentialStore};
use crate::token::TokenCodec;

/// Validates bearer tokens and resolves them to active users.
#[derive(Clone)]
pub struct SessionGate {
    codec: Arc<TokenCodec>,
    store: Arc<CredentialStore>,
}

impl SessionGate {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Authorize a bearer token against the current time.
    pub fn authorize(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.authorize_at(token, chrono::Utc::now().timestamp())
    }

    /// Authorize a bearer token as of the given instant.
    pub fn authorize_at(&self, token: &str, now: i64) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.codec.decode_at(token, now).map_err(|err| {
            let err = AuthError::from(err);
            security_event!(
                SecurityEvent::TokenRejected,
                reason = err.kind(),
                "Bearer token rejected"
            );
            err
        })?;

        let Some(record) = self.store.lookup(&claims.sub) else {
            security_event!(
                SecurityEvent::AccessDenied,
                subject = %claims.sub,
                jti = %claims.jti,
                reason = AuthError::UnknownSubject.kind(),
                "Access denied"
            );
            return Err(AuthError::UnknownSubject);
        };

        if record.disabled {
            security_event!(
                SecurityEvent::AccessDenied,
                subject = %claims.sub,
                jti = %claims.jti,
                reason = AuthError::AccountDisabled.kind(),
                "Access denied"
            );
            return Err(AuthError::AccountDisabled);
        }

        security_event!(
            SecurityEvent::AccessGranted,
            subject = %claims.sub,
            jti = %claims.jti,
            "Access granted"
        );
        Ok(record.public_view())
    }
}
