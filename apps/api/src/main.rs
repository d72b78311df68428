mod auth;
mod checkout;
mod config;
mod db;
mod entitlement;
mod errors;
mod generation;
mod lightning;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use axum::http::{header, HeaderName, HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::USER_ID_HEADER;
use crate::checkout::stripe::StripeClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::lightning::client::LnurlClient;
use crate::lightning::service::LightningService;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cover letter API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.openai_api_key.clone())?);
    info!("LLM client initialized");

    // Initialize Lightning invoicing
    let ln_provider = Arc::new(LnurlClient::new(config.ln_callback_url.clone())?);
    let lightning = LightningService::new(ln_provider, store.clone(), config.ln_invoice_sats);
    info!(
        "Lightning client initialized ({} sats per action)",
        config.ln_invoice_sats
    );

    // Initialize Stripe
    let checkout = Arc::new(StripeClient::new(config.stripe_key.clone())?);

    let cors = CorsLayer::new()
        .allow_origin(config.web_client_url.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)]);

    // Build app state
    let state = AppState {
        store,
        llm,
        lightning,
        checkout,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
