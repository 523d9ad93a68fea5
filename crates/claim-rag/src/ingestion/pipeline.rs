//! Ingestion pipeline orchestration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DistanceMetric, RagConfig};
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::{IndexEntry, VectorIndex};

use super::chunker::TextChunker;
use super::loader::DocumentLoader;

/// Summary of one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Documents with extracted text
    pub documents: usize,
    /// Chunks embedded into the index
    pub chunks: usize,
    /// Files skipped for an unsupported extension
    pub skipped: Vec<String>,
    /// Files that failed to parse, with the reason
    pub failed: Vec<(String, String)>,
    /// Written snapshot directory; `None` when there was nothing to index
    pub snapshot: Option<PathBuf>,
}

/// Load, chunk, embed and persist a documents directory
pub struct IngestPipeline {
    loader: DocumentLoader,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    metric: DistanceMetric,
}

impl IngestPipeline {
    pub fn new(chunker: TextChunker, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            loader: DocumentLoader::new(),
            chunker,
            embedder,
            batch_size: 32,
            metric: DistanceMetric::default(),
        }
    }

    pub fn from_config(config: &RagConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        Ok(Self::new(TextChunker::from_config(&config.chunking)?, embedder)
            .with_batch_size(config.embeddings.batch_size)
            .with_metric(config.vector_db.metric))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Full ingestion: load + chunk + embed + save
    pub async fn run(&self, docs_dir: &Path, index_dir: &Path) -> Result<IngestReport> {
        self.run_with_progress(docs_dir, index_dir, &|_, _| {}).await
    }

    /// Like [`run`](Self::run), reporting `(embedded, total)` chunk counts after each batch
    pub async fn run_with_progress(
        &self,
        docs_dir: &Path,
        index_dir: &Path,
        progress: &(dyn Fn(usize, usize) + Send + Sync),
    ) -> Result<IngestReport> {
        let loaded = self.loader.load_dir(docs_dir)?;

        let mut report = IngestReport {
            documents: loaded.units.len(),
            skipped: loaded.skipped.clone(),
            failed: loaded.failed.clone(),
            ..IngestReport::default()
        };

        if loaded.is_empty() {
            tracing::warn!("No documents found in {}; nothing to ingest", docs_dir.display());
            return Ok(report);
        }

        let chunks = self.chunker.chunk_units(&loaded.units);
        if chunks.is_empty() {
            tracing::warn!("Documents in {} contain no text; nothing to ingest", docs_dir.display());
            return Ok(report);
        }

        tracing::info!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            report.documents,
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.overlap()
        );

        let total = chunks.len();
        let mut entries = Vec::with_capacity(total);

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }

            entries.extend(batch.iter().zip(vectors).map(|(chunk, vector)| IndexEntry {
                vector,
                text: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
            }));
            progress(entries.len(), total);
        }

        let index = VectorIndex::build(self.embedder.model(), self.metric, entries)?;
        index.save(index_dir)?;

        report.chunks = total;
        report.snapshot = Some(index_dir.to_path_buf());

        tracing::info!(
            "Ingested {} documents ({} chunks) into {}",
            report.documents,
            report.chunks,
            index_dir.display()
        );

        Ok(report)
    }
}
