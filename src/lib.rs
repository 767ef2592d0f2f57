//! # tollgate
//!
//! Bearer-token authentication gate for a small read-only API.
//!
//! The gate owns the full credential path: a read-only credential store,
//! an Argon2id password hasher, a JWT token codec with runtime secret
//! rotation, a login-time [`Authenticator`], and a per-request
//! [`SessionGate`]. Around the core sit the HTTP surface (login endpoint
//! plus the protected read-only routes), configuration, and structured
//! security-event logging.
//!
//! Failure behavior is the point: internally every authentication failure
//! is distinguishable, externally callers see exactly two generic 401
//! messages, one for the login path and one for the access path.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tollgate::{
//!     Authenticator, CredentialStore, PasswordHasher, HashingCost,
//!     SessionGate, TokenCodec, UserRecord,
//! };
//!
//! let hasher = PasswordHasher::new(HashingCost::default())?;
//! let store = Arc::new(CredentialStore::from_records([
//!     UserRecord::new("johndoe", hasher.hash("secret")?),
//! ])?);
//!
//! let codec = Arc::new(TokenCodec::new(
//!     &secret,
//!     jsonwebtoken::Algorithm::HS256,
//!     std::time::Duration::from_secs(1800),
//! ));
//! let authenticator = Authenticator::new(store.clone(), hasher)?;
//! let gate = SessionGate::new(codec.clone(), store);
//!
//! let user = authenticator.authenticate("johndoe", "secret")?;
//! let token = codec.issue(&user.username)?;
//! let user_again = gate.authorize(&token)?;
//! ```

pub mod auth;
pub mod channels;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod observability;
pub mod password;
pub mod prices;
pub mod secret;
pub mod server;
pub mod store;
pub mod token;

pub use auth::Authenticator;
pub use config::{ConfigError, GateConfig};
pub use error::{ApiError, AuthError};
pub use gate::SessionGate;
pub use password::{HashingCost, PasswordHasher};
pub use server::{build_router, AppState};
pub use store::{AuthenticatedUser, CredentialStore, UserRecord};
pub use token::{Claims, TokenCodec, TokenError};
