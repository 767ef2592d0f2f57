//! Security Event Logging
//!
//! Structured audit logging for security-relevant events. Application code
//! emits events through the [`security_event!`] macro, which dispatches to
//! the appropriate `tracing` level based on the event's severity; the
//! subscriber configured at startup decides formatting and filtering.
//!
//! Credentials and password hashes are never passed to this module; events
//! carry usernames, error kinds, and token identifiers only.
//!
//! # Usage
//!
//! ```ignore
//! use tollgate::observability::SecurityEvent;
//! use tollgate::security_event;
//!
//! security_event!(
//!     SecurityEvent::AuthenticationFailure,
//!     username = %username,
//!     reason = "bad_password",
//!     "Login rejected"
//! );
//! ```

use std::fmt;

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Login path
    /// Credentials verified, login accepted
    AuthenticationSuccess,
    /// Login rejected (unknown user, bad password, disabled account)
    AuthenticationFailure,

    // Token lifecycle
    /// Bearer token issued after successful login
    TokenIssued,
    /// Presented token failed decoding (malformed, bad signature, expired)
    TokenRejected,

    // Access path
    /// Session gate resolved a valid token to an active user
    AccessGranted,
    /// Session gate refused access (unknown subject, disabled account)
    AccessDenied,

    // Configuration
    /// Signing secret replaced; outstanding tokens invalidated
    SecretRotated,

    // System
    /// Service started
    SystemStartup,
}

impl SecurityEvent {
    /// Event category for filtering/grouping.
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess | Self::AuthenticationFailure => "authentication",
            Self::TokenIssued | Self::TokenRejected => "token",
            Self::AccessGranted | Self::AccessDenied => "authorization",
            Self::SecretRotated => "configuration",
            Self::SystemStartup => "system",
        }
    }

    /// Severity level, which selects the tracing level at the emit site.
    pub fn severity(&self) -> Severity {
        match self {
            Self::AuthenticationFailure | Self::AccessDenied | Self::TokenRejected => {
                Severity::High
            }
            Self::AuthenticationSuccess | Self::TokenIssued | Self::SecretRotated => {
                Severity::Medium
            }
            Self::AccessGranted | Self::SystemStartup => Severity::Low,
        }
    }

    /// Stable snake_case event name for log queries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::TokenIssued => "token_issued",
            Self::TokenRejected => "token_rejected",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::SecretRotated => "secret_rotated",
            Self::SystemStartup => "system_startup",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Log a security event with structured fields.
///
/// Every record carries `security_event`, `category`, and `severity`
/// fields in addition to whatever the call site supplies, so audit
/// queries can filter on a uniform schema.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let category = event.category();
        let event_name = event.name();

        match event.severity() {
            $crate::observability::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::observability::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::observability::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}
