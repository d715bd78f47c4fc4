use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::logs::InteractionLog;
use crate::plan::fetcher::ContentFetcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Trait object so the engine and persona can run against a scripted
    /// provider in tests.
    pub llm: Arc<dyn CompletionProvider>,
    /// Resolves URL-form job descriptions through the scraping collaborator.
    pub fetcher: ContentFetcher,
    /// Append-only audit trail. May be disabled when no store is configured;
    /// writes are fire-and-forget either way.
    pub logs: InteractionLog,
    pub config: Config,
}
