//! ONNX-based embedding generation
//!
//! Uses all-MiniLM-L6-v2 for 384-dimensional sentence embeddings with mean
//! pooling over the attention mask followed by L2 normalization.

use async_trait::async_trait;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimensions: usize,
    max_length: usize,
}

/// ONNX Runtime text embedder
pub struct OnnxEmbedder {
    model: Arc<OnnxModel>,
    model_name: String,
    batch_size: usize,
}

impl OnnxEmbedder {
    /// Load the model, downloading it into the cache directory on first use
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        tracing::info!("Initializing ONNX embedder with model: {}", config.model);

        let model_dir = config.cache_dir.join(&config.model);
        std::fs::create_dir_all(&model_dir)
            .map_err(|e| Error::Config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            download(&config.model, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download(&config.model, "tokenizer.json", &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::embedding(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::embedding(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::embedding(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!("ONNX embedder initialized ({} dims)", config.dimensions);

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                dimensions: config.dimensions,
                max_length: config.max_length,
            }),
            model_name: config.model.clone(),
            batch_size: config.batch_size.max(1),
        })
    }
}

impl OnnxModel {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch_size = texts.len();

        let encodings = self
            .tokenizer
            .encode_batch(texts.iter().map(String::as_str).collect::<Vec<_>>(), true)
            .map_err(|e| Error::embedding(format!("Tokenization failed: {}", e)))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.max_length);

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();

            for j in 0..ids.len().min(max_len) {
                input_ids[i * max_len + j] = ids[j] as i64;
                attention_mask[i * max_len + j] = mask[j] as i64;
                token_type_ids[i * max_len + j] = types[j] as i64;
            }
        }

        let shape = vec![batch_size, max_len];
        let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))
            .map_err(|e| Error::embedding(format!("Input tensor creation failed: {}", e)))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("Attention mask tensor failed: {}", e)))?;
        let token_type_ids_tensor =
            Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
                .map_err(|e| Error::embedding(format!("Token type tensor failed: {}", e)))?;

        let inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
            ("token_type_ids", token_type_ids_tensor.into_dyn()),
        ];

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::embedding(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "last_hidden_state")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::embedding("No output tensor"))?;

        let (tensor_shape, tensor_data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::embedding(format!("Failed to extract tensor: {}", e)))?;

        let dims: Vec<usize> = tensor_shape.iter().map(|&d| d as usize).collect();
        let hidden_size = dims.get(2).copied().unwrap_or(self.dimensions);
        if hidden_size != self.dimensions {
            return Err(Error::embedding(format!(
                "Model produced {}-dimensional output, expected {}",
                hidden_size, self.dimensions
            )));
        }

        // Mean pooling over attended tokens
        let mut embeddings = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let mut sum = vec![0.0f32; hidden_size];
            let mut count = 0.0f32;

            for j in 0..max_len {
                let mask_val = attention_mask[i * max_len + j] as f32;
                if mask_val > 0.0 {
                    let offset = i * max_len * hidden_size + j * hidden_size;
                    for (k, val) in sum.iter_mut().enumerate() {
                        if let Some(x) = tensor_data.get(offset + k) {
                            *val += x * mask_val;
                        }
                    }
                    count += mask_val;
                }
            }

            if count > 0.0 {
                for val in &mut sum {
                    *val /= count;
                }
            }

            super::l2_normalize(&mut sum);
            embeddings.push(sum);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("Empty embedding result"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let model = Arc::clone(&self.model);
            let batch = batch.to_vec();
            let embeddings = tokio::task::spawn_blocking(move || model.embed_batch(&batch))
                .await
                .map_err(|e| Error::internal(format!("Embedding task failed: {}", e)))??;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.model.dimensions
    }

    fn model(&self) -> &str {
        &self.model_name
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Fetch a file from the sentence-transformers repository on Hugging Face
async fn download(model_name: &str, file: &str, path: &Path) -> Result<()> {
    let url = format!(
        "https://huggingface.co/sentence-transformers/{}/resolve/main/{}",
        model_name, file
    );

    tracing::info!("Downloading {} from: {}", file, url);

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::embedding(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(Error::embedding(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::embedding(format!("Failed to read {}: {}", file, e)))?;

    // Only complete downloads reach the cached path
    let partial = path.with_extension("partial");
    std::fs::write(&partial, &bytes)?;
    std::fs::rename(&partial, path)?;

    tracing::info!("Downloaded {} ({} bytes)", file, bytes.len());

    Ok(())
}
