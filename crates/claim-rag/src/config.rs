//! Configuration for the claim adjudication system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable holding the OpenRouter API key
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
/// Environment variable overriding the generation model
pub const MODEL_NAME_ENV: &str = "OPENROUTER_MODEL_NAME";
/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_ENV: &str = "CLAIM_RAG_CONFIG";

/// Upper bound on `llm.max_retries`
pub const MAX_LLM_RETRIES: u32 = 10;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Source documents for ingestion
    pub documents: DocumentsConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Language model configuration
    pub llm: LlmConfig,
}

impl RagConfig {
    /// Load configuration: TOML file (if any), then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text; missing sections use defaults
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_NAME_ENV).filter(|m| !m.trim().is_empty()) {
            self.llm.model = model;
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be positive".to_string()));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be positive".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::Config("llm.timeout_secs must be positive".to_string()));
        }
        if self.llm.max_retries > MAX_LLM_RETRIES {
            return Err(Error::Config(format!(
                "llm.max_retries ({}) must be at most {}",
                self.llm.max_retries, MAX_LLM_RETRIES
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            max_body_size: 64 * 1024,
        }
    }
}

/// Where policy documents are read from during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    pub dir: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("documents"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Prefer ending a chunk after whitespace
    pub respect_word_boundaries: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            respect_word_boundaries: true,
        }
    }
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX sentence-transformer
    #[default]
    Onnx,
    /// Feature-hashing embedder, no model files needed
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding backend
    pub backend: EmbeddingBackend,
    /// Model to use (default: all-MiniLM-L6-v2)
    pub model: String,
    /// Embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Batch size for embedding generation
    pub batch_size: usize,
    /// Maximum sequence length
    pub max_length: usize,
    /// Cache directory for models
    pub cache_dir: PathBuf,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Onnx,
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            max_length: 256,
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("claim-rag")
                .join("models"),
        }
    }
}

/// Distance metric used by the vector index
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// L2 distance
    #[default]
    Euclidean,
    /// 1 - cosine similarity
    Cosine,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Snapshot directory
    pub storage_path: PathBuf,
    /// Metric used when building a new index
    pub metric: DistanceMetric,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("vectorstore").join("db_faiss"),
            metric: DistanceMetric::Euclidean,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the model
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Language model backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenRouter (OpenAI-compatible chat completions)
    #[default]
    OpenRouter,
    /// Local Ollama server
    Ollama,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider
    pub backend: LlmBackend,
    /// API base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API key, normally supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds, doubled per attempt
    pub retry_backoff_ms: u64,
    /// HTTP-Referer header sent to OpenRouter
    pub referer: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::OpenRouter,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-4o".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
            referer: "http://localhost".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_ingestion_setup() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.embeddings.dimensions, 384);
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.vector_db.storage_path, PathBuf::from("vectorstore/db_faiss"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 500
            chunk_overlap = 50

            [embeddings]
            backend = "hashing"

            [llm]
            backend = "ollama"
            base_url = "http://localhost:11434"
            model = "llama3.2"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 500);
        assert!(config.chunking.respect_word_boundaries);
        assert_eq!(config.embeddings.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let mut config = RagConfig::default();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let mut config = RagConfig::default();
        config.llm.max_retries = MAX_LLM_RETRIES;
        assert!(config.validate().is_ok());
        config.llm.max_retries = 40;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_KEY_ENV, "sk-test"),
            (MODEL_NAME_ENV, "anthropic/claude-3.5-sonnet"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = RagConfig::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, "openai/gpt-4o");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = RagConfig::default();
        config.llm.api_key = Some("secret".to_string());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }
}
