//! Deterministic feature-hashing embedder
//!
//! Needs no model files or network access. Each lowercase word and word
//! bigram is hashed into a signed bucket; the resulting vector is L2
//! normalized, so texts sharing vocabulary land close together.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

pub const HASHING_MODEL: &str = "feature-hashing";

/// Bag-of-words embedder using signed feature hashing
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::Config("embedding dimensions must be positive".to_string()));
        }
        Ok(Self { dimensions })
    }

    /// Embed synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        for word in &words {
            self.add_feature(&mut vector, word, 1.0);
        }
        for pair in words.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        super::l2_normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        HASHING_MODEL
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let a = embedder.embed_text("Knee surgery waiting period");
        let b = embedder.embed_text("Knee surgery waiting period");

        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::new(128).unwrap();
        assert_eq!(
            embedder.embed_text("Knee, SURGERY!"),
            embedder.embed_text("knee surgery")
        );
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let query = embedder.embed_text("knee surgery waiting period");
        let related = embedder.embed_text("Knee surgery is covered after a waiting period of 2 months.");
        let unrelated = embedder.embed_text("Dental cleaning is reimbursed twice per year.");

        assert!(distance(&query, &related) < distance(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(embedder.embed_text("").iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let texts = vec!["first clause".to_string(), "second clause".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[1], embedder.embed("second clause").await.unwrap());
    }
}
