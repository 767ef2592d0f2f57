//! Credential Store
//!
//! Holds the user records the gate authenticates against. The store is
//! loaded once at startup from a serialized user list (or built from
//! fixtures in tests) and is read-only afterwards, so concurrent lookups
//! need no locking.
//!
//! The stored password hash never leaves this module except to the
//! password hasher: [`UserRecord`] keeps the field crate-private, redacts
//! it from `Debug` output, and the serializable public view
//! ([`AuthenticatedUser`]) does not carry it at all.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single user as stored by the gate.
///
/// Immutable after load. `username` is the store key and must be unique.
#[derive(Clone, Deserialize)]
pub struct UserRecord {
    /// Unique login name
    pub username: String,

    /// Optional display name
    #[serde(default)]
    pub full_name: Option<String>,

    /// Optional contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Disabled accounts fail both login and token validation
    #[serde(default)]
    pub disabled: bool,

    /// Salted password hash produced by the password hasher
    pub(crate) password_hash: String,
}

impl UserRecord {
    /// Create a record with the given username and stored hash.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            email: None,
            disabled: false,
            password_hash: password_hash.into(),
        }
    }

    /// Builder: set the display name.
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Builder: set the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: mark the account disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The public, hash-free view of this record.
    pub fn public_view(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            disabled: self.disabled,
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("disabled", &self.disabled)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// The view of a user returned to callers and downstream handlers.
///
/// Identical to [`UserRecord`] with the password hash stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub disabled: bool,
}

/// Errors loading the backing user list.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read user list: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse user list: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records share a username. Silently dropping one of them would
    /// discard a password hash, so this is a hard load failure.
    #[error("duplicate username in user list: {0}")]
    DuplicateUsername(String),
}

/// Read-only user directory keyed by username.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, UserRecord>,
}

impl CredentialStore {
    /// Build a store from already-parsed records.
    pub fn from_records(
        records: impl IntoIterator<Item = UserRecord>,
    ) -> Result<Self, StoreError> {
        let mut users = HashMap::new();
        for record in records {
            if users.contains_key(&record.username) {
                return Err(StoreError::DuplicateUsername(record.username));
            }
            users.insert(record.username.clone(), record);
        }
        Ok(Self { users })
    }

    /// Parse a JSON array of user records.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load a JSON user list from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Look up a user by exact username.
    pub fn lookup(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
