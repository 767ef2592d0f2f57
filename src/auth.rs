//! Authenticator
//!
//! Login-time credential verification: username lookup in the credential
//! store, password check through the hasher, disabled-account policy.
//!
//! The caller-visible outcome is deliberately coarse. Internally the
//! failure modes stay distinguishable for audit logging, but unknown
//! username, wrong password, and disabled account must all cost roughly
//! the same wall-clock time and collapse to the same response upstream.
//! The unknown-username path therefore verifies the password against a
//! throwaway hash, and the disabled flag is only consulted after the
//! password has been verified.

use std::sync::Arc;

use crate::error::AuthError;
use crate::observability::SecurityEvent;
use crate::password::{PasswordError, PasswordHasher};
use crate::security_event;
use crate::store::{AuthenticatedUser, CredentialStore};

/// Verifies login credentials against the store.
#[derive(Debug, Clone)]
pub struct Authenticator {
    store: Arc<CredentialStore>,
    hasher: PasswordHasher,
    /// Hash of a random throwaway password, verified against when the
    /// username is unknown so both paths do comparable work.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        store: Arc<CredentialStore>,
        hasher: PasswordHasher,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(&crate::secret::generate_secure_secret(32))?;
        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }

    /// Verify a username/password pair.
    ///
    /// On success returns the hash-free user view. Every failure is an
    /// [`AuthError`]; callers collapse them at the HTTP boundary.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let Some(record) = self.store.lookup(username) else {
            // Burn the same hashing work as the known-user path.
            let _ = self.hasher.verify(password, &self.dummy_hash);
            security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %username,
                reason = AuthError::UnknownCredential.kind(),
                "Login rejected"
            );
            return Err(AuthError::UnknownCredential);
        };

        if !self.hasher.verify(password, &record.password_hash) {
            security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %username,
                reason = AuthError::BadPassword.kind(),
                "Login rejected"
            );
            return Err(AuthError::BadPassword);
        }

        // Checked after password verification so response timing does not
        // reveal the account state to a caller without the password.
        if record.disabled {
            security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %username,
                reason = AuthError::AccountDisabled.kind(),
                "Login rejected"
            );
            return Err(AuthError::AccountDisabled);
        }

        security_event!(
            SecurityEvent::AuthenticationSuccess,
            username = %username,
            "Login accepted"
        );
        Ok(record.public_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::HashingCost;
    use crate::store::UserRecord;

    fn fixture() -> Authenticator {
        let hasher = PasswordHasher::new(HashingCost::fast()).unwrap();
        let store = CredentialStore::from_records([
            UserRecord::new("johndoe", hasher.hash("secret").unwrap())
                .with_full_name("John Doe")
                .with_email("johndoe@example.com"),
            UserRecord::new("alice", hasher.hash("secret2").unwrap()).disabled(),
        ])
        .unwrap();
        Authenticator::new(Arc::new(store), hasher).unwrap()
    }

    #[test]
    fn valid_credentials_authenticate() {
        let auth = fixture();
        let user = auth.authenticate("johndoe", "secret").unwrap();
        assert_eq!(user.username, "johndoe");
        assert_eq!(user.full_name.as_deref(), Some("John Doe"));
        assert!(!user.disabled);
    }

    #[test]
    fn unknown_username_is_rejected() {
        let auth = fixture();
        assert_eq!(
            auth.authenticate("mallory", "secret"),
            Err(AuthError::UnknownCredential)
        );
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = fixture();
        assert_eq!(
            auth.authenticate("johndoe", "not-the-secret"),
            Err(AuthError::BadPassword)
        );
        assert_eq!(auth.authenticate("johndoe", ""), Err(AuthError::BadPassword));
    }

    #[test]
    fn disabled_account_is_rejected_even_with_the_right_password() {
        let auth = fixture();
        assert_eq!(
            auth.authenticate("alice", "secret2"),
            Err(AuthError::AccountDisabled)
        );
    }

    #[test]
    fn disabled_account_with_wrong_password_reads_as_bad_password() {
        // The password check runs first, so a caller probing a disabled
        // account without its password learns nothing about the flag.
        let auth = fixture();
        assert_eq!(
            auth.authenticate("alice", "wrong"),
            Err(AuthError::BadPassword)
        );
    }
}
