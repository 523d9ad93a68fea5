//! PDF and DOCX text extraction

use crate::error::{Error, Result};
use crate::types::{FileType, TextUnit};

/// Per-format text extractor
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<TextUnit> {
        match FileType::from_filename(filename) {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Unknown => Err(Error::UnsupportedFileType(filename.to_string())),
        }
    }

    /// Parse a PDF, concatenating page text in page order
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<TextUnit> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("lopdf could not load '{}': {}, trying pdf-extract", filename, e);
                return Self::parse_pdf_fallback(filename, data);
            }
        };

        // get_pages is keyed by 1-based page number, already in page order
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;
        let mut content = String::new();

        for page_number in pages.keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => content.push_str(&text),
                Err(e) => {
                    tracing::debug!("No text on page {} of '{}': {}", page_number, filename, e);
                }
            }
        }

        let content = content.replace('\0', "");
        if content.trim().is_empty() && page_count > 0 {
            tracing::warn!(
                "'{}' has {} pages but no extractable text (scanned or image-based?)",
                filename,
                page_count
            );
        }

        Ok(TextUnit::new(filename, FileType::Pdf, content).with_page_count(page_count))
    }

    /// Whole-document extraction for PDFs lopdf cannot open
    fn parse_pdf_fallback(filename: &str, data: &[u8]) -> Result<TextUnit> {
        let content = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        Ok(TextUnit::new(filename, FileType::Pdf, content.replace('\0', "")))
    }

    /// Parse a DOCX, joining paragraph text with newlines
    fn parse_docx(filename: &str, data: &[u8]) -> Result<TextUnit> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::file_parse(filename, e.to_string()))?;

        let mut paragraphs = Vec::new();

        // Tables are not part of the paragraph sequence
        for child in &doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                let mut text = String::new();
                for child in &p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in &run.children {
                            match child {
                                docx_rs::RunChild::Text(t) => text.push_str(&t.text),
                                docx_rs::RunChild::Tab(_) => text.push('\t'),
                                _ => {}
                            }
                        }
                    }
                }
                paragraphs.push(text);
            }
        }

        Ok(TextUnit::new(filename, FileType::Docx, paragraphs.join("\n")))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory documents for parser and loader tests

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a DOCX with one paragraph per entry
    pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = docx_rs::Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(
                docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
            );
        }
        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    /// Build a PDF with one line of text per page
    pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
