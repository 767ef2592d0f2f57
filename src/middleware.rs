//! Request authentication middleware
//!
//! Bridges the session gate into the router: extracts the bearer token
//! from the `Authorization` header, runs it through the gate, and stashes
//! the resolved [`AuthenticatedUser`] in request extensions for handlers
//! to pick up via the extractor below.
//!
//! A missing or malformed header is treated exactly like a malformed
//! token: the caller gets the generic access rejection with a `Bearer`
//! challenge and learns nothing else.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ApiError, AuthError};
use crate::server::AppState;
use crate::store::AuthenticatedUser;

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts_value: Option<&header::HeaderValue>) -> Option<&str> {
    let raw = parts_value?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

/// Layer guarding the protected routes.
///
/// Runs before every handler under the protected router; on success the
/// resolved user is available to handlers through the
/// [`AuthenticatedUser`] extractor.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers().get(header::AUTHORIZATION))
        .ok_or(ApiError::access_rejected(AuthError::MalformedToken))?
        .to_owned();

    let user = state
        .gate
        .authorize(&token)
        .map_err(ApiError::access_rejected)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            // Only reachable if a handler uses the extractor outside the
            // authenticated router.
            .ok_or_else(|| ApiError::internal("authenticated user missing from request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> header::HeaderValue {
        header::HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn extracts_bearer_tokens() {
        let value = header("Bearer abc.def.ghi");
        assert_eq!(bearer_token(Some(&value)), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token(Some(&header("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(Some(&header("Bearer "))), None);
        assert_eq!(bearer_token(Some(&header("bearer abc"))), None);
        assert_eq!(bearer_token(Some(&header("abc.def.ghi"))), None);
    }
}
