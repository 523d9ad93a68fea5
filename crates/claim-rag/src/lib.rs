//! claim-rag: insurance claim adjudication over policy documents
//!
//! Policy PDFs and DOCX files are chunked, embedded and stored in a vector
//! index offline. At query time the nearest clauses are retrieved, rendered
//! into an adjudication prompt and sent to a language model whose JSON
//! answer is normalized and served over HTTP.

pub mod client;
pub mod config;
pub mod embeddings;
pub mod engine;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use client::{ClaimClient, ClaimReply};
pub use config::RagConfig;
pub use engine::ClaimEngine;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ChunkMetadata, FileType, TextUnit},
    query::ClaimRequest,
    response::{DecisionRecord, NormalizedResponse, ParseDiagnostic},
};
