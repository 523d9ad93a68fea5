//! Core types for claim adjudication

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, FileType, TextUnit};
pub use query::ClaimRequest;
pub use response::{
    Decision, DecisionRecord, DecisionViolation, NormalizedResponse, ParseDiagnostic,
};
