//! Embedding backends

mod hashing;
#[cfg(feature = "onnx")]
mod onnx;

pub use hashing::{HashingEmbedder, HASHING_MODEL};
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;
use crate::providers::EmbeddingProvider;

/// Build the configured embedder
pub async fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.backend {
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)?),
        #[cfg(feature = "onnx")]
        EmbeddingBackend::Onnx => Arc::new(OnnxEmbedder::new(config).await?),
        #[cfg(not(feature = "onnx"))]
        EmbeddingBackend::Onnx => {
            return Err(crate::error::Error::Config(
                "ONNX embeddings require the `onnx` feature; use backend = \"hashing\"".to_string(),
            ))
        }
    };

    tracing::info!(
        "Embedding provider initialized: {} (model: {}, {} dims)",
        embedder.name(),
        embedder.model(),
        embedder.dimensions()
    );
    Ok(embedder)
}

pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}
