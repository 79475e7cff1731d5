use std::sync::Arc;

use crate::analysis::engine::Engine;
use crate::analysis::provider::{LlmScoringProvider, ScoringProvider};
use crate::llm_client::LlmClient;

/// Builds the scoring provider for one request from a credential-bound client.
pub type ProviderFactory = Arc<dyn Fn(LlmClient) -> Arc<dyn ScoringProvider> + Send + Sync>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Server-level client. Requests may override its key and model.
    pub llm: LlmClient,
    pub engine: Engine,
    /// Default: `LlmScoringProvider`. Tests swap in a scripted provider.
    pub provider_factory: ProviderFactory,
}

impl AppState {
    pub fn new(llm: LlmClient, engine: Engine) -> Self {
        Self {
            llm,
            engine,
            provider_factory: Arc::new(|client: LlmClient| -> Arc<dyn ScoringProvider> {
                Arc::new(LlmScoringProvider::new(client))
            }),
        }
    }

    #[cfg(test)]
    pub fn with_provider_factory(mut self, factory: ProviderFactory) -> Self {
        self.provider_factory = factory;
        self
    }

    /// Provider bound to the request's credentials, falling back to the server's.
    pub fn provider_for(
        &self,
        api_key: Option<&str>,
        model: Option<&str>,
    ) -> Arc<dyn ScoringProvider> {
        (self.provider_factory)(self.llm.with_credentials(api_key, model))
    }
}
