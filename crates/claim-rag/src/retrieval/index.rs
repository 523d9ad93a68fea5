//! Vector index backed by ruvector-core with a small manifest sidecar

use ruvector_core::types::DbOptions;
use ruvector_core::{DistanceMetric as CoreMetric, SearchQuery as CoreSearchQuery, VectorDB, VectorEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::ChunkMetadata;

/// Vector storage file inside the index directory, owned by ruvector-core
pub const DB_FILE: &str = "vectors.db";

/// Manifest recording which embedding model built the index
pub const MANIFEST_FILE: &str = "index.json";

/// A chunk with its embedding, ready to be indexed
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A query match, nearest first
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    model: String,
    dimensions: usize,
    metric: DistanceMetric,
    count: usize,
    created_at: String,
}

/// Exact nearest-neighbour index over chunk embeddings
///
/// Vectors and chunk payloads live in a ruvector-core database opened
/// without HNSW, so searches are exhaustive. A freshly built index is backed
/// by a scratch file that is removed on drop; `save` copies it into place.
pub struct VectorIndex {
    db: VectorDB,
    manifest: Manifest,
    path: PathBuf,
    scratch: bool,
}

impl VectorIndex {
    /// Build an index; every vector must share the first vector's length
    pub fn build(
        model: impl Into<String>,
        metric: DistanceMetric,
        entries: Vec<IndexEntry>,
    ) -> Result<Self> {
        let dimensions = entries
            .first()
            .map(|e| e.vector.len())
            .ok_or_else(|| Error::vector_index("cannot build an index from zero entries"))?;

        if dimensions == 0 {
            return Err(Error::vector_index("embedding vectors are empty"));
        }
        if let Some((i, bad)) = entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.vector.len() != dimensions)
        {
            return Err(Error::vector_index(format!(
                "entry {} has {} dimensions, expected {}",
                i,
                bad.vector.len(),
                dimensions
            )));
        }

        let manifest = Manifest {
            model: model.into(),
            dimensions,
            metric,
            count: entries.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let path = std::env::temp_dir().join(format!("claim-rag-{}.db", Uuid::new_v4()));
        let db = open_db(&path, &manifest)?;
        let index = Self {
            db,
            manifest,
            path,
            scratch: true,
        };

        for (position, entry) in entries.into_iter().enumerate() {
            index.db.insert(VectorEntry {
                id: Some(position.to_string()),
                vector: entry.vector,
                metadata: Some(to_payload(position, &entry.text, &entry.metadata)),
            })?;
        }

        tracing::debug!(
            "Built vector index with {} entries ({} dims, {:?})",
            index.manifest.count,
            dimensions,
            metric
        );
        Ok(index)
    }

    /// Write the index into `dir`, replacing any previous one
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        // Stage both files, then rename them over the previous index
        let staged_db = staging_path(dir, DB_FILE);
        std::fs::copy(&self.path, &staged_db)?;
        let staged_manifest = staging_path(dir, MANIFEST_FILE);
        std::fs::write(&staged_manifest, serde_json::to_vec_pretty(&self.manifest)?)?;

        std::fs::rename(&staged_db, dir.join(DB_FILE))?;
        std::fs::rename(&staged_manifest, dir.join(MANIFEST_FILE))?;

        tracing::info!(
            "Saved vector index with {} entries to {}",
            self.manifest.count,
            dir.display()
        );
        Ok(())
    }

    /// Open the index previously saved to `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let db_path = dir.join(DB_FILE);
        if !manifest_path.is_file() || !db_path.is_file() {
            return Err(Error::IndexNotFound(dir.to_path_buf()));
        }

        let manifest: Manifest = serde_json::from_slice(&std::fs::read(&manifest_path)?)
            .map_err(|e| {
                Error::vector_index(format!("corrupt manifest {}: {}", manifest_path.display(), e))
            })?;

        let db = open_db(&db_path, &manifest)?;
        let stored = db.len()?;
        if stored != manifest.count {
            return Err(Error::vector_index(format!(
                "index {} holds {} vectors but its manifest lists {}",
                dir.display(),
                stored,
                manifest.count
            )));
        }

        tracing::info!(
            "Loaded vector index: {} entries, model {}, {} dims, built {}",
            manifest.count,
            manifest.model,
            manifest.dimensions,
            manifest.created_at
        );

        Ok(Self {
            db,
            manifest,
            path: db_path,
            scratch: false,
        })
    }

    pub fn model(&self) -> &str {
        &self.manifest.model
    }

    pub fn dimensions(&self) -> usize {
        self.manifest.dimensions
    }

    pub fn metric(&self) -> DistanceMetric {
        self.manifest.metric
    }

    pub fn len(&self) -> usize {
        self.manifest.count
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.count == 0
    }

    /// Return up to `k` entries nearest to `vector`
    ///
    /// Equal distances keep insertion order.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if vector.len() != self.manifest.dimensions {
            return Err(Error::vector_index(format!(
                "query has {} dimensions, index has {}",
                vector.len(),
                self.manifest.dimensions
            )));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        // Over-fetch; ties at the cut-off are ranked by position below
        let candidates = self.db.search(CoreSearchQuery {
            vector: vector.to_vec(),
            k: k.saturating_mul(2).min(self.manifest.count),
            filter: None,
            ef_search: None,
        })?;

        let mut ranked = Vec::with_capacity(candidates.len());
        for result in candidates {
            let payload = result.metadata.as_ref().ok_or_else(|| {
                Error::vector_index(format!("stored vector {} has no chunk payload", result.id))
            })?;
            let (position, hit) = from_payload(payload, result.score)
                .ok_or_else(|| Error::vector_index(format!("stored vector {} has a malformed payload", result.id)))?;
            ranked.push((position, hit));
        }

        ranked.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
    }
}

impl Drop for VectorIndex {
    fn drop(&mut self) {
        if self.scratch {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::debug!("Could not remove scratch index {}: {}", self.path.display(), e);
            }
        }
    }
}

fn staging_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(format!("{}.tmp", file))
}

fn open_db(path: &Path, manifest: &Manifest) -> Result<VectorDB> {
    let mut options = DbOptions::default();
    options.dimensions = manifest.dimensions;
    options.distance_metric = match manifest.metric {
        DistanceMetric::Euclidean => CoreMetric::Euclidean,
        DistanceMetric::Cosine => CoreMetric::Cosine,
    };
    options.storage_path = path.to_string_lossy().to_string();
    options.hnsw_config = None;
    options.quantization = None;

    Ok(VectorDB::new(options)?)
}

fn to_payload(position: usize, text: &str, metadata: &ChunkMetadata) -> HashMap<String, Value> {
    let mut payload = HashMap::new();
    payload.insert("position".to_string(), Value::from(position as u64));
    payload.insert("text".to_string(), Value::from(text));
    payload.insert("source".to_string(), Value::from(metadata.source.as_str()));
    payload.insert("chunk_index".to_string(), Value::from(metadata.chunk_index));
    payload.insert("start".to_string(), Value::from(metadata.start as u64));
    payload.insert("end".to_string(), Value::from(metadata.end as u64));
    payload
}

fn from_payload(payload: &HashMap<String, Value>, distance: f32) -> Option<(usize, SearchHit)> {
    let number = |key: &str| payload.get(key).and_then(Value::as_u64);
    let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);

    let position = number("position")? as usize;
    let hit = SearchHit {
        text: text("text")?,
        metadata: ChunkMetadata {
            source: text("source")?,
            chunk_index: u32::try_from(number("chunk_index")?).ok()?,
            start: number("start")? as usize,
            end: number("end")? as usize,
        },
        distance,
    };
    Some((position, hit))
}
