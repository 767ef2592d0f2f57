//! Configuration
//!
//! Runtime configuration for the gate, built either from environment
//! variables ([`GateConfig::from_env`]) or programmatically through the
//! builder. The signing secret is required and validated against the
//! environment's [`SecretPolicy`] before anything else starts; every other
//! setting has a sensible default.
//!
//! Environment variables:
//!
//! | Variable                   | Default            | Meaning                          |
//! |----------------------------|--------------------|----------------------------------|
//! | `TOLLGATE_SECRET`          | (required)         | HMAC signing secret              |
//! | `TOLLGATE_ENV`             | `production`       | Deployment environment           |
//! | `TOLLGATE_ALGORITHM`       | `HS256`            | Token signature algorithm        |
//! | `TOLLGATE_TOKEN_LIFETIME`  | `30m`              | Token lifetime (`90s`, `30m`, `12h`) |
//! | `TOLLGATE_BIND`            | `127.0.0.1:8000`   | Listen address                   |
//! | `TOLLGATE_USERS`           | `data/users.json`  | User list path                   |
//! | `TOLLGATE_CHANNELS`        | `data/channels.json` | Channel directory path         |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::password::HashingCost;
use crate::secret::{SecretError, SecretPolicy};
use crate::token::parse_algorithm;

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 60);
const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_USERS_PATH: &str = "data/users.json";
const DEFAULT_CHANNELS_PATH: &str = "data/channels.json";

/// Configuration failures, all fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TOLLGATE_SECRET is not set")]
    MissingSecret,

    #[error("signing secret rejected: {0}")]
    Secret(#[from] SecretError),

    #[error("unsupported token algorithm: {0}")]
    BadAlgorithm(String),

    #[error("invalid duration: {0} (expected forms like 90s, 30m, 12h)")]
    BadDuration(String),

    #[error("invalid bind address: {0}")]
    BadBindAddr(String),
}

/// Complete gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub signing_secret: String,
    pub algorithm: Algorithm,
    pub token_lifetime: Duration,
    pub hashing_cost: HashingCost,
    pub bind_addr: SocketAddr,
    pub users_path: PathBuf,
    pub channels_path: PathBuf,
}

impl GateConfig {
    /// Build configuration from the environment.
    ///
    /// The secret is validated against the policy for `TOLLGATE_ENV`
    /// before being accepted.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("TOLLGATE_SECRET").map_err(|_| ConfigError::MissingSecret)?;
        let environment =
            std::env::var("TOLLGATE_ENV").unwrap_or_else(|_| "production".to_owned());

        let mut builder = GateConfigBuilder::new(secret).environment(&environment);

        if let Ok(name) = std::env::var("TOLLGATE_ALGORITHM") {
            builder = builder.algorithm_name(&name)?;
        }
        if let Ok(raw) = std::env::var("TOLLGATE_TOKEN_LIFETIME") {
            builder = builder.token_lifetime_str(&raw)?;
        }
        if let Ok(addr) = std::env::var("TOLLGATE_BIND") {
            builder = builder.bind_addr_str(&addr)?;
        }
        if let Ok(path) = std::env::var("TOLLGATE_USERS") {
            builder = builder.users_path(path);
        }
        if let Ok(path) = std::env::var("TOLLGATE_CHANNELS") {
            builder = builder.channels_path(path);
        }

        builder.build()
    }

    /// Start a builder with the given signing secret.
    pub fn builder(signing_secret: impl Into<String>) -> GateConfigBuilder {
        GateConfigBuilder::new(signing_secret)
    }
}

/// Builder for [`GateConfig`].
#[derive(Debug)]
pub struct GateConfigBuilder {
    signing_secret: String,
    environment: String,
    algorithm: Algorithm,
    token_lifetime: Duration,
    hashing_cost: HashingCost,
    bind_addr: Option<SocketAddr>,
    users_path: PathBuf,
    channels_path: PathBuf,
}

impl GateConfigBuilder {
    fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            environment: "production".to_owned(),
            algorithm: Algorithm::HS256,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            hashing_cost: HashingCost::default(),
            bind_addr: None,
            users_path: PathBuf::from(DEFAULT_USERS_PATH),
            channels_path: PathBuf::from(DEFAULT_CHANNELS_PATH),
        }
    }

    /// Deployment environment, selecting the secret policy.
    pub fn environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_owned();
        self
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn algorithm_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.algorithm =
            parse_algorithm(name).ok_or_else(|| ConfigError::BadAlgorithm(name.to_owned()))?;
        Ok(self)
    }

    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn token_lifetime_str(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.token_lifetime =
            parse_duration(raw).ok_or_else(|| ConfigError::BadDuration(raw.to_owned()))?;
        Ok(self)
    }

    pub fn hashing_cost(mut self, cost: HashingCost) -> Self {
        self.hashing_cost = cost;
        self
    }

    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    pub fn bind_addr_str(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.bind_addr = Some(
            raw.parse()
                .map_err(|_| ConfigError::BadBindAddr(raw.to_owned()))?,
        );
        Ok(self)
    }

    pub fn users_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.users_path = path.into();
        self
    }

    pub fn channels_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.channels_path = path.into();
        self
    }

    /// Validate the secret and produce the final configuration.
    pub fn build(self) -> Result<GateConfig, ConfigError> {
        SecretPolicy::for_environment(&self.environment).validate(&self.signing_secret)?;

        let bind_addr = match self.bind_addr {
            Some(addr) => addr,
            None => DEFAULT_BIND
                .parse()
                .map_err(|_| ConfigError::BadBindAddr(DEFAULT_BIND.to_owned()))?,
        };

        Ok(GateConfig {
            signing_secret: self.signing_secret,
            algorithm: self.algorithm,
            token_lifetime: self.token_lifetime,
            hashing_cost: self.hashing_cost,
            bind_addr,
            users_path: self.users_path,
            channels_path: self.channels_path,
        })
    }
}

/// Parse `90s`, `30m`, `12h`, `500ms` into a [`Duration`].
///
/// A bare number is seconds. Returns `None` for anything else; callers
/// own defaults.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (value, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = value.parse().ok()?;

    match unit {
        "ms" => Some(Duration::from_millis(value)),
        "s" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_secs(value * 60)),
        "h" => Some(Duration::from_secs(value * 3600)),
        _ => None,
    }
}
