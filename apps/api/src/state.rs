use std::sync::Arc;

use crate::checkout::CheckoutProvider;
use crate::config::Config;
use crate::lightning::service::LightningService;
use crate::llm_client::CompletionProvider;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users, invoices and documents. Default: PgStore.
    pub store: Arc<dyn Store>,
    /// Pluggable completion backend. Default: LlmClient (OpenAI).
    pub llm: Arc<dyn CompletionProvider>,
    /// Invoice minting and settlement refresh over the same store.
    pub lightning: LightningService,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub config: Config,
}
