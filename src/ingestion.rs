//! Loading study material from uploaded files.
//!
//! Only PDF documents are accepted. Text is pulled out page by page with
//! [`pdf_extract`]; a document that fails anywhere yields no text at all.

use crate::error::{Result, StudyAssistantError};
use async_trait::async_trait;
use log::{debug, warn};
use std::path::Path;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file picked by the user, with the media type it was declared as.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StudyAssistantError::Extraction("Invalid file name".to_string()))?
            .to_string();

        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }

    pub fn is_pdf(&self) -> bool {
        is_pdf_media_type(&self.media_type)
    }
}

pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String>;
}

/// Joins per-page text: runs of whitespace inside a page collapse to a single
/// space and every page ends with a newline.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::new();
    for page in pages {
        let items: Vec<&str> = page.as_ref().split_whitespace().collect();
        text.push_str(&items.join(" "));
        text.push('\n');
    }
    text
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String> {
        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| StudyAssistantError::Extraction(format!("Extraction task failed: {}", e)))??;

        debug!("Extracted {} PDF pages", pages.len());
        Ok(join_pages(&pages))
    }
}

#[cfg(feature = "pdf")]
fn extract_pages(data: &[u8]) -> Result<Vec<String>> {
    use std::panic::{self, AssertUnwindSafe};

    // pdf_extract panics on some malformed documents
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {}", e);
            Err(StudyAssistantError::Extraction(e.to_string()))
        }
        Err(_) => {
            warn!("PDF extraction panicked on a malformed document");
            Err(StudyAssistantError::Extraction(
                "malformed PDF document".to_string(),
            ))
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn extract_pages(_data: &[u8]) -> Result<Vec<String>> {
    warn!("PDF extraction requested but the `pdf` feature is disabled");
    Err(StudyAssistantError::Extraction(
        "PDF support is not enabled in this build".to_string(),
    ))
}
