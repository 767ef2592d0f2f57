use std::sync::Arc;

use anyhow::Context;

use tollgate::observability::SecurityEvent;
use tollgate::prices::{FixedPriceSource, MarketPageSource};
use tollgate::security_event;
use tollgate::{
    build_router, AppState, Authenticator, CredentialStore, GateConfig, PasswordHasher,
    SessionGate, TokenCodec,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = GateConfig::from_env().context("configuration failed")?;

    let store = Arc::new(
        CredentialStore::from_json_file(&config.users_path).with_context(|| {
            format!("failed to load user list from {}", config.users_path.display())
        })?,
    );
    let channels = Arc::new(
        tollgate::channels::ChannelDirectory::from_json_file(&config.channels_path).with_context(
            || {
                format!(
                    "failed to load channel directory from {}",
                    config.channels_path.display()
                )
            },
        )?,
    );

    let hasher = PasswordHasher::new(config.hashing_cost).context("invalid hashing cost")?;
    let codec = Arc::new(TokenCodec::new(
        &config.signing_secret,
        config.algorithm,
        config.token_lifetime,
    ));
    let authenticator =
        Authenticator::new(store.clone(), hasher).context("authenticator setup failed")?;
    let gate = SessionGate::new(codec.clone(), store.clone());

    let state = AppState {
        authenticator,
        gate,
        codec,
        channels,
        prices: Arc::new(MarketPageSource::new()),
        test_prices: Arc::new(FixedPriceSource::new()),
    };

    security_event!(
        SecurityEvent::SystemStartup,
        bind_addr = %config.bind_addr,
        users = store.len(),
        token_lifetime_secs = config.token_lifetime.as_secs(),
        "Authentication gate starting"
    );
    tracing::info!(bind_addr = %config.bind_addr, "Listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().json().with_env_filter(filter).init();
}
