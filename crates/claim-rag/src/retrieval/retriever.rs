//! Query embedding and top-k chunk retrieval

use serde::Serialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::index::VectorIndex;

/// A retrieved chunk, nearest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: String,
    pub chunk_index: u32,
    pub distance: f32,
}

/// Chunks retrieved for one query
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievedContext {
    pub chunks: Vec<RetrievedChunk>,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Embeds queries with the ingestion model and searches the index
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Pair an index with the embedder that built it
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::Config("retrieval top_k must be positive".to_string()));
        }
        if embedder.dimensions() != index.dimensions() {
            return Err(Error::Config(format!(
                "embedder produces {} dimensions but the index was built with {}",
                embedder.dimensions(),
                index.dimensions()
            )));
        }
        if embedder.model() != index.model() {
            return Err(Error::Config(format!(
                "index was built with embedding model '{}' but '{}' is configured; re-run ingestion",
                index.model(),
                embedder.model()
            )));
        }

        Ok(Self {
            index,
            embedder,
            top_k,
        })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Retrieve the `top_k` chunks nearest to the query
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.query(&vector, self.top_k)?;

        tracing::debug!(
            "Retrieved {} chunks (nearest distance {:?})",
            hits.len(),
            hits.first().map(|h| h.distance)
        );

        Ok(RetrievedContext {
            chunks: hits
                .into_iter()
                .map(|hit| RetrievedChunk {
                    text: hit.text,
                    source: hit.metadata.source,
                    chunk_index: hit.metadata.chunk_index,
                    distance: hit.distance,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceMetric;
    use crate::embeddings::HashingEmbedder;
    use crate::retrieval::IndexEntry;
    use crate::types::ChunkMetadata;

    fn build(embedder: &HashingEmbedder, texts: &[&str]) -> VectorIndex {
        let entries = texts
            .iter()
            .enumerate()
            .map(|(i, text)| IndexEntry {
                vector: embedder.embed_text(text),
                text: text.to_string(),
                metadata: ChunkMetadata {
                    source: "policy.docx".to_string(),
                    chunk_index: i as u32,
                    start: 0,
                    end: text.len(),
                },
            })
            .collect();
        VectorIndex::build(
            crate::embeddings::HASHING_MODEL,
            DistanceMetric::Euclidean,
            entries,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_retrieves_relevant_chunk_first() {
        let embedder = HashingEmbedder::new(256).unwrap();
        let index = build(
            &embedder,
            &[
                "Dental cleaning is reimbursed twice per year.",
                "Knee surgery is covered after a waiting period of 2 months.",
                "Ambulance transport is covered up to $500.",
            ],
        );
        let retriever = Retriever::new(Arc::new(index), Arc::new(embedder), 2).unwrap();

        let context = retriever
            .retrieve("knee surgery after a 3 month waiting period")
            .await
            .unwrap();

        assert_eq!(context.len(), 2);
        assert_eq!(context.chunks[0].chunk_index, 1);
        assert!(context.chunks[0].distance <= context.chunks[1].distance);
    }

    #[tokio::test]
    async fn test_fewer_chunks_than_top_k() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let index = build(&embedder, &["Only one clause."]);
        let retriever = Retriever::new(Arc::new(index), Arc::new(embedder), 4).unwrap();

        assert_eq!(retriever.retrieve("anything").await.unwrap().len(), 1);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let index = build(&HashingEmbedder::new(64).unwrap(), &["clause"]);
        let result = Retriever::new(
            Arc::new(index),
            Arc::new(HashingEmbedder::new(128).unwrap()),
            4,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let index = build(&embedder, &["clause"]);
        assert!(Retriever::new(Arc::new(index), Arc::new(embedder), 0).is_err());
    }
}
