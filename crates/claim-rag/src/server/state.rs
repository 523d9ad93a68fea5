//! Application state for the claim server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::engine::ClaimEngine;
use crate::error::Result;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: ClaimEngine,
}

impl AppState {
    /// Load the engine from configuration
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        tracing::info!("Initializing claim engine...");
        let engine = ClaimEngine::from_config(config).await?;
        tracing::info!(
            "Claim engine ready: {} chunks indexed ({:?}), model {} via {}",
            engine.retriever().index().len(),
            engine.retriever().index().metric(),
            engine.llm().model(),
            engine.llm().name()
        );
        Ok(Self::new(engine))
    }

    pub fn new(engine: ClaimEngine) -> Self {
        Self {
            inner: Arc::new(AppStateInner { engine }),
        }
    }

    pub fn engine(&self) -> &ClaimEngine {
        &self.inner.engine
    }
}
