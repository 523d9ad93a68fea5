//! Vector index and query-time retrieval

mod index;
mod retriever;

pub use index::{IndexEntry, SearchHit, VectorIndex, DB_FILE, MANIFEST_FILE};
pub use retriever::{RetrievedChunk, RetrievedContext, Retriever};
