//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;
use crate::error::Result;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OnnxEmbedder`: local all-MiniLM-L6-v2 through ONNX Runtime
/// - `HashingEmbedder`: feature hashing, no model files
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions (384 for all-MiniLM-L6-v2)
    fn dimensions(&self) -> usize;

    /// Model identifier recorded in index snapshots
    fn model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &str;
}
