//! Text extraction from uploaded files.
//!
//! Extraction dispatches on the declared file kind. Plain text is decoded
//! in-process; PDFs are delegated to an external page reader and stitched
//! together with `[Page N]` markers so citations can point back into the
//! document.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// Declared type of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    PlainText,
    Pdf,
}

/// An uploaded file as handed to the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name, e.g. `notes.pdf`.
    pub name: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, kind: FileKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// File extension from the original name, or a kind-derived fallback.
    pub fn extension(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => match self.kind {
                FileKind::PlainText => "txt",
                FileKind::Pdf => "pdf",
            },
        }
    }
}

/// External collaborator that turns PDF bytes into per-page text.
#[async_trait]
pub trait PdfPageReader: Send + Sync {
    async fn read_pages(&self, bytes: &[u8]) -> Result<Vec<String>, RagError>;
}

/// Dispatches extraction by file kind.
pub struct TextExtractor {
    pdf_reader: Option<Arc<dyn PdfPageReader>>,
}

impl TextExtractor {
    /// Extractor that handles plain text only.
    pub fn new() -> Self {
        Self { pdf_reader: None }
    }

    /// Extractor that additionally handles PDFs through `reader`.
    pub fn with_pdf_reader(reader: Arc<dyn PdfPageReader>) -> Self {
        Self {
            pdf_reader: Some(reader),
        }
    }

    pub async fn extract(&self, file: &UploadedFile) -> Result<String, RagError> {
        match file.kind {
            FileKind::PlainText => String::from_utf8(file.bytes.clone())
                .map_err(|e| RagError::extraction(format!("file is not valid UTF-8: {e}"))),
            FileKind::Pdf => {
                let reader = self.pdf_reader.as_ref().ok_or_else(|| {
                    RagError::Extraction("no PDF reader configured".to_string())
                })?;
                let pages = reader.read_pages(&file.bytes).await?;
                let mut text = String::new();
                for (i, page) in pages.iter().enumerate() {
                    text.push_str(&format!("[Page {}]\n{}\n\n", i + 1, page));
                }
                Ok(text)
            }
        }
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}
