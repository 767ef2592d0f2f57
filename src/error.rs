//! Error types
//!
//! Two layers. [`AuthError`] is the internal taxonomy: every way a login
//! or token validation can fail, fully distinguishable for logging and
//! tests. [`ApiError`] is what leaves the process: it collapses every
//! authentication failure on a given path to one generic message, so the
//! response body and status never reveal whether a username exists, a
//! password was wrong, or an account is disabled.
//!
//! Login-path failures say "incorrect username or password". Access-path
//! failures say "could not validate credentials" and carry a
//! `WWW-Authenticate: Bearer` challenge.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::token::TokenError;

// ============================================================================
// Internal taxonomy
// ============================================================================

/// Why authentication failed, precisely.
///
/// Never serialized into a response. Callers map it through
/// [`ApiError::login_rejected`] or [`ApiError::access_rejected`] at the
/// HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No user record for the presented username
    #[error("unknown credential")]
    UnknownCredential,

    /// User exists, password does not verify
    #[error("bad password")]
    BadPassword,

    /// Credentials or token are fine, the account is disabled
    #[error("account disabled")]
    AccountDisabled,

    /// Presented token is not structurally valid
    #[error("malformed token")]
    MalformedToken,

    /// Token signature does not verify against the active secret
    #[error("bad token signature")]
    BadSignature,

    /// Token signature verified but the expiry has passed
    #[error("expired token")]
    ExpiredToken,

    /// Token is valid but its subject no longer exists in the store
    #[error("unknown token subject")]
    UnknownSubject,
}

impl AuthError {
    /// Stable snake_case kind for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCredential => "unknown_credential",
            Self::BadPassword => "bad_password",
            Self::AccountDisabled => "account_disabled",
            Self::MalformedToken => "malformed_token",
            Self::BadSignature => "bad_signature",
            Self::ExpiredToken => "expired_token",
            Self::UnknownSubject => "unknown_subject",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => Self::MalformedToken,
            TokenError::BadSignature => Self::BadSignature,
            TokenError::Expired => Self::ExpiredToken,
        }
    }
}

// ============================================================================
// HTTP boundary
// ============================================================================

/// Public error messages. Exactly two for the authentication surface.
const LOGIN_REJECTED: &str = "incorrect username or password";
const ACCESS_REJECTED: &str = "could not validate credentials";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiErrorKind {
    Authentication,
    NotFound,
    Upstream,
    Internal,
}

/// Error as rendered to API callers.
///
/// `detail` is logged, never sent; `message` is the only text a caller
/// sees.
#[derive(Debug)]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    detail: Option<String>,
    challenge: bool,
}

impl ApiError {
    /// A rejected login. Same body for every [`AuthError`] variant.
    pub fn login_rejected(err: AuthError) -> Self {
        Self {
            kind: ApiErrorKind::Authentication,
            message: LOGIN_REJECTED.to_owned(),
            detail: Some(err.kind().to_owned()),
            challenge: false,
        }
    }

    /// A rejected protected request. Same body for every [`AuthError`]
    /// variant, with a bearer challenge.
    pub fn access_rejected(err: AuthError) -> Self {
        Self {
            kind: ApiErrorKind::Authentication,
            message: ACCESS_REJECTED.to_owned(),
            detail: Some(err.kind().to_owned()),
            challenge: true,
        }
    }

    /// A missing resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::NotFound,
            message: message.into(),
            detail: None,
            challenge: false,
        }
    }

    /// A collaborator service failure.
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Upstream,
            message: "upstream service unavailable".to_owned(),
            detail: Some(detail.into()),
            challenge: false,
        }
    }

    /// An unexpected server-side failure. Detail stays in the logs.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Internal,
            message: "internal server error".to_owned(),
            detail: Some(detail.into()),
            challenge: false,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ApiErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(detail) = &self.detail {
            match self.kind {
                ApiErrorKind::Authentication => {
                    tracing::debug!(detail = %detail, "Request rejected")
                }
                _ => tracing::error!(detail = %detail, "Request failed"),
            }
        }

        let body = Json(json!({ "detail": self.message }));
        let mut response = (self.status(), body).into_response();
        if self.challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_map_into_auth_errors() {
        assert_eq!(AuthError::from(TokenError::Malformed), AuthError::MalformedToken);
        assert_eq!(AuthError::from(TokenError::BadSignature), AuthError::BadSignature);
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::ExpiredToken);
    }

    #[test]
    fn login_rejections_are_indistinguishable() {
        let a = ApiError::login_rejected(AuthError::UnknownCredential);
        let b = ApiError::login_rejected(AuthError::BadPassword);
        let c = ApiError::login_rejected(AuthError::AccountDisabled);

        assert_eq!(a.message, b.message);
        assert_eq!(b.message, c.message);
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert!(!a.challenge);
    }

    #[test]
    fn access_rejections_are_indistinguishable_and_challenge() {
        let a = ApiError::access_rejected(AuthError::ExpiredToken);
        let b = ApiError::access_rejected(AuthError::UnknownSubject);

        assert_eq!(a.message, b.message);
        assert_eq!(a.message, ACCESS_REJECTED);
        assert!(a.challenge && b.challenge);
    }

    #[test]
    fn login_and_access_messages_differ() {
        // Two generic messages, one per path.
        let login = ApiError::login_rejected(AuthError::BadPassword);
        let access = ApiError::access_rejected(AuthError::BadSignature);
        assert_ne!(login.message, access.message);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::not_found("no such channel").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::upstream("timeout").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::internal("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(AuthError::UnknownCredential.kind(), "unknown_credential");
        assert_eq!(AuthError::ExpiredToken.kind(), "expired_token");
    }
}
