//! Provider abstractions for embeddings and the decision model
//!
//! Trait objects let the engine run against local or remote backends and
//! against substitutes in tests.

pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openrouter;

pub use embedding::EmbeddingProvider;
pub use llm::{create_llm, LlmProvider};
pub use ollama::OllamaLlm;
pub use openrouter::OpenRouterLlm;
