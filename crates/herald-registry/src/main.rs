//! Herald token registry
//!
//! Binds push device tokens to the identity holding the bearer credential,
//! and sends test notifications to a caller's devices.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use herald_common::auth::{Claims, JwtContext};
use herald_common::Role;
use herald_registry::config::RegistryConfig;
use herald_registry::push::LogPushSender;
use herald_registry::store::{MemoryTokenStore, PgTokenStore, TokenStore};
use herald_registry::{api, state};

const DEV_TOKEN_TTL_SECS: i64 = 24 * 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RegistryConfig::from_env()?;

    // ── Token store ─────────────────────────────────────────────
    let store: Arc<dyn TokenStore> = match &config.database_url {
        Some(url) => Arc::new(PgTokenStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, device tokens are kept in memory only");
            Arc::new(MemoryTokenStore::new())
        }
    };

    // ── JWT context ─────────────────────────────────────────────
    let jwt = match &config.jwt_seed_b64 {
        Some(seed) => JwtContext::from_ed25519_seed(seed, config.jwt_issuer.clone())
            .map_err(|e| anyhow::anyhow!("invalid JWT seed: {e}"))?,
        None => {
            tracing::warn!(
                "JWT_SEED_B64 not set — generating ephemeral key (credentials won't survive restart)"
            );
            JwtContext::generate(config.jwt_issuer.clone()).0
        }
    };

    if let Some(value) = &config.dev_issue_token {
        issue_dev_token(&jwt, value)?;
    }

    // ── Router ──────────────────────────────────────────────────
    let state = state::AppState::new(jwt, store, Arc::new(LogPushSender));

    let app = Router::new()
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // ── Listen ──────────────────────────────────────────────────
    tracing::info!("herald-registry listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `<role>:<subject>` → log a signed credential for local testing.
fn issue_dev_token(jwt: &JwtContext, value: &str) -> anyhow::Result<()> {
    let (role, subject) = value
        .split_once(':')
        .context("DEV_ISSUE_TOKEN must look like <role>:<subject>")?;
    let role: Role = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let claims = Claims::new(subject, role, jwt.issuer(), DEV_TOKEN_TTL_SECS);
    let token = jwt
        .create_token(&claims)
        .map_err(|e| anyhow::anyhow!("signing dev token: {e}"))?;
    tracing::info!(%role, subject, "dev credential: {token}");
    Ok(())
}
