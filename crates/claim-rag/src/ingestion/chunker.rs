//! Size-based text chunking with overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkMetadata, TextUnit};

/// Sliding-window chunker measured in grapheme clusters
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
    /// Pull the window end back to the last whitespace when possible
    respect_word_boundaries: bool,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
            respect_word_boundaries: true,
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Ok(Self::new(config.chunk_size, config.chunk_overlap)?
            .with_word_boundaries(config.respect_word_boundaries))
    }

    pub fn with_word_boundaries(mut self, enabled: bool) -> Self {
        self.respect_word_boundaries = enabled;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every unit, grouped by document then position
    pub fn chunk_units(&self, units: &[TextUnit]) -> Vec<Chunk> {
        units
            .iter()
            .flat_map(|unit| self.chunk_text(&unit.source, &unit.content))
            .collect()
    }

    /// Chunk a single document's text
    pub fn chunk_text(&self, source: &str, text: &str) -> Vec<Chunk> {
        // bounds[g] is the byte offset of grapheme g; the last entry is text.len()
        let bounds: Vec<usize> = text
            .grapheme_indices(true)
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let mut start = 0usize;
        let mut chunk_index = 0u32;

        loop {
            let hard_end = (start + self.chunk_size).min(total);
            let end = if hard_end < total && self.respect_word_boundaries {
                self.soft_end(text, &bounds, start, hard_end)
            } else {
                hard_end
            };

            chunks.push(Chunk {
                content: text[bounds[start]..bounds[end]].to_string(),
                metadata: ChunkMetadata {
                    source: source.to_string(),
                    chunk_index,
                    start: bounds[start],
                    end: bounds[end],
                },
            });
            chunk_index += 1;

            if end == total {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }

    /// Latest window end that follows whitespace and still advances past the overlap
    fn soft_end(&self, text: &str, bounds: &[usize], start: usize, hard_end: usize) -> usize {
        let floor = start + self.overlap + 1;
        (floor..=hard_end)
            .rev()
            .find(|&g| text[bounds[g - 1]..bounds[g]].chars().all(char::is_whitespace))
            .unwrap_or(hard_end)
    }
}
