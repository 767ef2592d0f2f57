//! HTTP surface
//!
//! Router assembly and request handlers. Two route groups: the public
//! routes (`/` and the login endpoint) and the protected routes, which sit
//! behind the [`require_bearer`] middleware and only ever run with an
//! authenticated, active user in scope.
//!
//! Login is form-encoded (`username`/`password` fields) and returns the
//! issued token as `{"access_token": "...", "token_type": "Bearer"}`.
//! Credential verification is CPU-bound, so the handler moves it off the
//! async runtime with `spawn_blocking`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::Authenticator;
use crate::channels::{Channel, ChannelDirectory};
use crate::error::ApiError;
use crate::gate::SessionGate;
use crate::middleware::require_bearer;
use crate::prices::{PriceQuote, PriceSource};
use crate::store::AuthenticatedUser;
use crate::token::TokenCodec;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub gate: SessionGate,
    pub codec: Arc<TokenCodec>,
    pub channels: Arc<ChannelDirectory>,
    pub prices: Arc<dyn PriceSource>,
    pub test_prices: Arc<dyn PriceSource>,
}

/// Assemble the full router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/me", get(me))
        .route("/channels/{id}", get(get_channel))
        .route("/prices/{ticker}", get(get_price))
        .route("/testprices/{ticker}", get(get_test_price))
        .layer(from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/", get(root))
        .route("/token", post(login))
        .merge(protected)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

async fn root() -> &'static str {
    "The server is running."
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let authenticator = state.authenticator.clone();
    let user = tokio::task::spawn_blocking(move || {
        authenticator.authenticate(&form.username, &form.password)
    })
    .await
    .map_err(|err| ApiError::internal(format!("login task failed: {err}")))?
    .map_err(ApiError::login_rejected)?;

    let access_token = state
        .codec
        .issue(&user.username)
        .map_err(|err| ApiError::internal(format!("token issuance failed: {err}")))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
    }))
}

async fn me(user: AuthenticatedUser) -> Json<AuthenticatedUser> {
    Json(user)
}

async fn get_channel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Channel>, ApiError> {
    state
        .channels
        .lookup(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no channel with id {id}")))
}

async fn get_price(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    fetch_quote(state.prices.as_ref(), &ticker).await
}

async fn get_test_price(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    fetch_quote(state.test_prices.as_ref(), &ticker).await
}

async fn fetch_quote(
    source: &dyn PriceSource,
    ticker: &str,
) -> Result<Json<PriceQuote>, ApiError> {
    source
        .quote(ticker)
        .await
        .map(Json)
        .map_err(|err| ApiError::upstream(err.to_string()))
}
