//! Source document, text unit and chunk types

use serde::{Deserialize, Serialize};

/// Supported file types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document, extracted page by page
    Pdf,
    /// Microsoft Word document (.docx), extracted paragraph by paragraph
    Docx,
    /// Anything else
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

}

/// Full extracted text of one source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextUnit {
    /// Originating file name (no directory)
    pub source: String,
    /// Detected file type
    pub file_type: FileType,
    /// Extracted plain text
    pub content: String,
    /// Number of pages for page-structured formats
    pub page_count: Option<u32>,
}

impl TextUnit {
    pub fn new(source: impl Into<String>, file_type: FileType, content: String) -> Self {
        Self {
            source: source.into(),
            file_type,
            content,
            page_count: None,
        }
    }

    /// Attach a page count
    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Originating file name
    pub source: String,
    /// Position of the chunk within its document
    pub chunk_index: u32,
    /// Byte offset of the chunk start in the text unit
    pub start: usize,
    /// Byte offset of the chunk end (exclusive)
    pub end: usize,
}

/// A bounded slice of a text unit, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_filename("policy.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_filename("Policy.PDF"), FileType::Pdf);
        assert_eq!(FileType::from_filename("terms.docx"), FileType::Docx);
        assert_eq!(FileType::from_filename("notes.txt"), FileType::Unknown);
        assert_eq!(FileType::from_filename("README"), FileType::Unknown);
        assert!(!FileType::from_filename("old.doc").is_supported());
    }
}
