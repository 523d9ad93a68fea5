//! Query-time pipeline: retrieve, prompt, generate, normalize

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embeddings::create_embedder;
use crate::error::Result;
use crate::generation::{normalize, PromptBuilder};
use crate::providers::{create_llm, LlmProvider};
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::NormalizedResponse;

/// Immutable components shared by every claim request
pub struct ClaimEngine {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
}

impl ClaimEngine {
    pub fn new(retriever: Retriever, llm: Arc<dyn LlmProvider>) -> Self {
        Self { retriever, llm }
    }

    /// Load the embedder, the index snapshot and the model client
    ///
    /// Fails if the snapshot is missing or was built with a different
    /// embedding model, so the server never starts without a usable index.
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        let embedder = create_embedder(&config.embeddings).await?;
        let index = VectorIndex::load(&config.vector_db.storage_path)?;
        let retriever = Retriever::new(Arc::new(index), embedder, config.retrieval.top_k)?;
        let llm = create_llm(&config.llm)?;

        Ok(Self::new(retriever, llm))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Produce a decision (or parse diagnostic) for one claim query
    pub async fn adjudicate(&self, query: &str) -> Result<NormalizedResponse> {
        let context = self.retriever.retrieve(query).await?;
        let prompt =
            PromptBuilder::build_claim_prompt(&PromptBuilder::build_context(&context), query);

        let raw = self.llm.complete(&prompt).await?;
        tracing::debug!("Model output: {}", raw);

        let response = normalize(&raw);
        match &response {
            NormalizedResponse::Diagnostic(_) => {
                tracing::warn!("Model output could not be parsed; returning diagnostic");
            }
            NormalizedResponse::Decision(_) => match response.decision_record() {
                Some(record) => {
                    for violation in record.violations() {
                        tracing::warn!("Decision violates instructions: {}", violation);
                    }
                }
                None => {
                    tracing::warn!("Decision does not match the decision/amount/justification schema");
                }
            },
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceMetric;
    use crate::embeddings::{HashingEmbedder, HASHING_MODEL};
    use crate::error::Error;
    use crate::retrieval::IndexEntry;
    use crate::types::ChunkMetadata;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Returns a canned reply and records the prompt it was given
    struct ScriptedLlm {
        reply: std::result::Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|_| Error::remote("HTTP 401 Unauthorized - invalid key"))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn engine(reply: std::result::Result<&str, ()>) -> (ClaimEngine, Arc<ScriptedLlm>) {
        let embedder = HashingEmbedder::new(128).unwrap();
        let clauses = [
            "Knee surgery is covered after a waiting period of 2 months.",
            "Cosmetic procedures are never covered.",
        ];
        let entries = clauses
            .iter()
            .enumerate()
            .map(|(i, text)| IndexEntry {
                vector: embedder.embed_text(text),
                text: text.to_string(),
                metadata: ChunkMetadata {
                    source: "policy.pdf".to_string(),
                    chunk_index: i as u32,
                    start: 0,
                    end: text.len(),
                },
            })
            .collect();
        let index = VectorIndex::build(HASHING_MODEL, DistanceMetric::Euclidean, entries).unwrap();
        let retriever = Retriever::new(Arc::new(index), Arc::new(embedder), 4).unwrap();

        let llm = Arc::new(ScriptedLlm {
            reply: reply.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        });
        (ClaimEngine::new(retriever, llm.clone()), llm)
    }

    #[tokio::test]
    async fn test_fenced_decision_is_parsed() {
        let (engine, llm) = engine(Ok(
            "```json\n{\"decision\":\"Approved\",\"amount\":5000,\"justification\":\"Waiting period satisfied\"}\n```",
        ));

        let response = engine.adjudicate("46M, knee surgery, 3-month policy").await.unwrap();
        let record = response.decision_record().unwrap();
        assert_eq!(record.amount, 5000);

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Knee surgery is covered after a waiting period of 2 months."));
        assert!(prompts[0].contains("46M, knee surgery, 3-month policy"));
    }

    #[tokio::test]
    async fn test_inconsistent_rejection_passes_through() {
        let (engine, _) = engine(Ok(
            r#"{"decision":"Rejected","amount":1200,"justification":"Excluded"}"#,
        ));

        let response = engine.adjudicate("cosmetic surgery").await.unwrap();
        let record = response.decision_record().unwrap();
        assert_eq!(record.amount, 1200);
        assert!(!record.violations().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_propagates() {
        let (engine, _) = engine(Err(()));
        assert!(matches!(
            engine.adjudicate("knee surgery").await,
            Err(Error::RemoteService { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_snapshot_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.embeddings.backend = crate::config::EmbeddingBackend::Hashing;
        config.vector_db.storage_path = dir.path().join("db_faiss");
        config.llm.api_key = Some("sk-test".to_string());

        assert!(matches!(
            ClaimEngine::from_config(&config).await,
            Err(Error::IndexNotFound(_))
        ));
    }
}
