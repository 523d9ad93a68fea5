//! Directory loader producing one text unit per supported file

use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{FileType, TextUnit};

use super::parser::FileParser;

/// Result of loading a documents directory
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    /// Extracted documents, sorted by file name
    pub units: Vec<TextUnit>,
    /// Files with unrecognized extensions
    pub skipped: Vec<String>,
    /// Recognized files that failed to parse, with the reason
    pub failed: Vec<(String, String)>,
}

impl LoadedDocuments {
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Reads PDF and DOCX files from a single directory
#[derive(Debug, Default, Clone)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every supported file directly inside `dir`
    pub fn load_dir(&self, dir: &Path) -> Result<LoadedDocuments> {
        if !dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("documents directory not found: {}", dir.display()),
            )));
        }

        tracing::info!("Loading documents from {}", dir.display());

        let mut loaded = LoadedDocuments::default();

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Dangling links and unreadable entries fail the stat
                    let filename = e
                        .path()
                        .and_then(Path::file_name)
                        .map(|name| name.to_string_lossy().to_string());
                    match filename {
                        Some(filename) if FileType::from_filename(&filename).is_supported() => {
                            tracing::warn!("Cannot access {}: {}", filename, e);
                            loaded.failed.push((filename, e.to_string()));
                        }
                        _ => tracing::debug!("Skipping unreadable entry: {}", e),
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().to_string();

            if !FileType::from_filename(&filename).is_supported() {
                tracing::debug!("Skipping unsupported file: {}", filename);
                loaded.skipped.push(filename);
                continue;
            }

            let data = match std::fs::read(entry.path()) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", filename, e);
                    loaded.failed.push((filename, e.to_string()));
                    continue;
                }
            };
            match FileParser::parse(&filename, &data) {
                Ok(unit) => {
                    tracing::info!("  Loaded {} ({} bytes of text)", filename, unit.content.len());
                    loaded.units.push(unit);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", filename, e);
                    loaded.failed.push((filename, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Loaded {} documents from {} ({} skipped, {} failed)",
            loaded.units.len(),
            dir.display(),
            loaded.skipped.len(),
            loaded.failed.len()
        );

        Ok(loaded)
    }
}
