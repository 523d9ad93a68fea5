//! Offline document ingestion: load, chunk, embed, persist

mod chunker;
mod loader;
mod parser;
mod pipeline;

pub use chunker::TextChunker;
pub use loader::{DocumentLoader, LoadedDocuments};
pub use parser::FileParser;
pub use pipeline::{IngestPipeline, IngestReport};
